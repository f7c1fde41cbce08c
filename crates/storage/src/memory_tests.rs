// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use fleet_core::{AgentBuilder, BotBuilder, LogLevel, RunBuilder, RunEventId, RunLogId};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap()
}

fn agent(id: &str, heartbeat: DateTime<Utc>) -> Agent {
    AgentBuilder::default().agent_id(id).last_heartbeat(heartbeat).build()
}

#[tokio::test]
async fn bot_crud_round_trip() {
    let store = MemoryStore::new();
    let bot = BotBuilder::default().build();
    store.insert_bot(bot.clone()).await.unwrap();
    assert_eq!(store.get_bot(&bot.id).await.unwrap(), Some(bot.clone()));

    let mut renamed = bot.clone();
    renamed.name = "renamed".to_string();
    store.update_bot(renamed.clone()).await.unwrap();
    assert_eq!(store.get_bot(&bot.id).await.unwrap().unwrap().name, "renamed");

    assert!(store.delete_bot(&bot.id).await.unwrap());
    assert!(!store.delete_bot(&bot.id).await.unwrap());
    assert_eq!(store.get_bot(&bot.id).await.unwrap(), None);
}

#[tokio::test]
async fn update_bot_rejects_unknown_id() {
    let store = MemoryStore::new();
    let bot = BotBuilder::default().build();
    let err = store.update_bot(bot).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: "bot", .. }));
}

#[tokio::test]
async fn list_scheduled_bots_filters_on_schedule() {
    let store = MemoryStore::new();
    store.insert_bot(BotBuilder::default().build()).await.unwrap();
    let cron = BotBuilder::default().schedule("* * * * *").build();
    store.insert_bot(cron.clone()).await.unwrap();
    let scheduled = store.list_scheduled_bots().await.unwrap();
    assert_eq!(scheduled, vec![cron]);
}

#[tokio::test]
async fn heartbeat_never_moves_backwards() {
    let store = MemoryStore::new();
    let a = agent("a1", at(100));
    store.upsert_agent(a.clone()).await.unwrap();

    store.record_heartbeat(&a.agent_id, at(200)).await.unwrap();
    let stale = store.record_heartbeat(&a.agent_id, at(150)).await.unwrap().unwrap();
    assert_eq!(stale.last_heartbeat, at(200));
}

#[tokio::test]
async fn heartbeat_stores_the_maximum_of_any_delivery_order() {
    // Interleavings of heartbeat deliveries always leave the max behind.
    let times = [5_i64, 900, 42, 900, 17, 350];
    let store = MemoryStore::new();
    let a = agent("a1", at(0));
    store.upsert_agent(a.clone()).await.unwrap();
    for t in times {
        store.record_heartbeat(&a.agent_id, at(t)).await.unwrap();
    }
    let stored = store.get_agent(&a.agent_id).await.unwrap().unwrap();
    assert_eq!(stored.last_heartbeat, at(900));
}

#[tokio::test]
async fn heartbeat_for_unknown_agent_returns_none() {
    let store = MemoryStore::new();
    let missing = store.record_heartbeat(&AgentId::new("ghost"), at(1)).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn cas_succeeds_only_from_the_expected_status() {
    let store = MemoryStore::new();
    let a = agent("a1", at(0));
    store.upsert_agent(a.clone()).await.unwrap();

    let won = store
        .cas_agent_status(&a.agent_id, AgentStatus::Available, AgentStatus::Busy)
        .await
        .unwrap();
    assert_eq!(won.unwrap().status, AgentStatus::Busy);

    // Second claim loses: the agent is no longer available.
    let lost = store
        .cas_agent_status(&a.agent_id, AgentStatus::Available, AgentStatus::Busy)
        .await
        .unwrap();
    assert!(lost.is_none());
    assert_eq!(store.get_agent(&a.agent_id).await.unwrap().unwrap().status, AgentStatus::Busy);
}

#[tokio::test]
async fn sweep_demotes_only_stale_non_offline_agents() {
    let store = MemoryStore::new();
    store.upsert_agent(agent("fresh", at(100))).await.unwrap();
    store.upsert_agent(agent("stale", at(10))).await.unwrap();
    let mut already_offline = agent("gone", at(5));
    already_offline.status = AgentStatus::Offline;
    store.upsert_agent(already_offline).await.unwrap();

    let changed = store.sweep_stale_agents(at(50)).await.unwrap();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].agent_id, "stale");
    assert_eq!(changed[0].status, AgentStatus::Offline);

    // Re-running the sweep on the same state changes nothing.
    assert!(store.sweep_stale_agents(at(50)).await.unwrap().is_empty());
    let fresh = store.get_agent(&AgentId::new("fresh")).await.unwrap().unwrap();
    assert_eq!(fresh.status, AgentStatus::Available);
}

#[tokio::test]
async fn queued_runs_come_back_oldest_first_with_id_tiebreak() {
    let store = MemoryStore::new();
    let late = RunBuilder::default().id("run-b".into()).start_time(Some(at(300))).build();
    let early = RunBuilder::default().id("run-z".into()).start_time(Some(at(100))).build();
    let tie = RunBuilder::default().id("run-a".into()).start_time(Some(at(300))).build();
    for run in [&late, &early, &tie] {
        store.insert_run(run.clone()).await.unwrap();
    }

    let order: Vec<&str> =
        store.list_queued().await.unwrap().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(order, vec!["run-z", "run-a", "run-b"]);
}

#[tokio::test]
async fn due_scheduled_excludes_future_firings() {
    let store = MemoryStore::new();
    let due = RunBuilder::default()
        .status(RunStatus::Scheduled)
        .start_time(Some(at(100)))
        .build();
    let future = RunBuilder::default()
        .status(RunStatus::Scheduled)
        .start_time(Some(at(900)))
        .build();
    store.insert_run(due.clone()).await.unwrap();
    store.insert_run(future).await.unwrap();

    let found = store.list_due_scheduled(at(100)).await.unwrap();
    assert_eq!(found, vec![due]);
}

#[tokio::test]
async fn find_scheduled_run_matches_exact_start_time() {
    let store = MemoryStore::new();
    let run = RunBuilder::default()
        .status(RunStatus::Scheduled)
        .start_time(Some(at(500)))
        .build();
    store.insert_run(run.clone()).await.unwrap();

    assert_eq!(store.find_scheduled_run(&run.bot_id, at(500)).await.unwrap(), Some(run.clone()));
    assert_eq!(store.find_scheduled_run(&run.bot_id, at(501)).await.unwrap(), None);
}

#[tokio::test]
async fn stuck_runs_are_old_starting_or_running() {
    let store = MemoryStore::new();
    let stuck = RunBuilder::default()
        .status(RunStatus::Running)
        .start_time(Some(at(10)))
        .build();
    let recent = RunBuilder::default()
        .status(RunStatus::Running)
        .start_time(Some(at(990)))
        .build();
    let finished = RunBuilder::default()
        .status(RunStatus::Completed)
        .start_time(Some(at(10)))
        .build();
    for run in [&stuck, &recent, &finished] {
        store.insert_run(run.clone()).await.unwrap();
    }

    let found = store.list_stuck(at(500)).await.unwrap();
    assert_eq!(found, vec![stuck]);
}

#[tokio::test]
async fn appends_require_an_existing_run() {
    let store = MemoryStore::new();
    let run = RunBuilder::default().build();
    store.insert_run(run.clone()).await.unwrap();

    let event = RunEvent {
        id: RunEventId::generate(),
        run_id: run.id.clone(),
        event_type: "step".to_string(),
        message: "clicked".to_string(),
        payload: None,
        screenshot: None,
        timestamp: at(1),
    };
    store.append_run_event(event.clone()).await.unwrap();
    assert_eq!(store.list_run_events(&run.id).await.unwrap(), vec![event]);

    let orphan = RunLog {
        id: RunLogId::generate(),
        run_id: "run-missing".into(),
        level: LogLevel::Info,
        message: "lost".to_string(),
        payload: None,
        timestamp: at(1),
    };
    let err = store.append_run_log(orphan).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: "run", .. }));
}

#[tokio::test]
async fn run_logs_filter_by_run() {
    let store = MemoryStore::new();
    let run_a = RunBuilder::default().build();
    let run_b = RunBuilder::default().build();
    store.insert_run(run_a.clone()).await.unwrap();
    store.insert_run(run_b.clone()).await.unwrap();

    for (run, msg) in [(&run_a, "one"), (&run_b, "two"), (&run_a, "three")] {
        store
            .append_run_log(RunLog {
                id: RunLogId::generate(),
                run_id: run.id.clone(),
                level: LogLevel::Debug,
                message: msg.to_string(),
                payload: None,
                timestamp: at(1),
            })
            .await
            .unwrap();
    }

    let messages: Vec<String> = store
        .list_run_logs(&run_a.id)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.message)
        .collect();
    assert_eq!(messages, vec!["one", "three"]);
}
