// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios driving the whole control plane: registries, loops,
//! and router wired exactly as the daemon wires them, with a frozen clock
//! and a recording transport standing in for real agents.

use fleet_core::{AgentStatus, RunStatus};
use fleet_daemon::test_support::{harness, harness_with_heartbeat, Harness};
use fleet_wire::AgentMessage;
use serde_json::Map;
use std::time::Duration;

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

async fn register_agent(h: &Harness, id: &str) {
    h.app
        .agents
        .register(
            id.into(),
            AgentStatus::Available,
            Map::new(),
            format!("http://{id}:9000"),
        )
        .await
        .unwrap();
}

async fn report(h: &Harness, run_id: &fleet_core::RunId, status: RunStatus) {
    h.app
        .router
        .handle(AgentMessage::RunStatus { run_id: run_id.clone(), status })
        .await
        .unwrap();
}

#[tokio::test]
async fn agent_liveness_follows_heartbeats() {
    let h = harness_with_heartbeat(secs(1));
    register_agent(&h, "a1").await;

    for _ in 0..2 {
        h.clock.advance(secs(1));
        h.app.agents.heartbeat(&"a1".into()).await.unwrap();
    }

    // Long silence: the janitor demotes the agent.
    h.clock.advance(secs(6));
    h.janitor.tick().await.unwrap();
    assert_eq!(
        h.app.agents.get(&"a1".into()).await.unwrap().status,
        AgentStatus::Offline
    );

    // One heartbeat brings it back.
    h.clock.advance(secs(1));
    h.app.agents.heartbeat(&"a1".into()).await.unwrap();
    assert_eq!(
        h.app.agents.get(&"a1".into()).await.unwrap().status,
        AgentStatus::Available
    );
}

#[tokio::test]
async fn a_run_travels_from_queue_to_completion() {
    let h = harness();
    let bot = h
        .app
        .bots
        .create("google".to_string(), "google_bot".to_string(), None)
        .await
        .unwrap();
    register_agent(&h, "a1").await;

    let run = h.app.runs.create(bot.id.clone()).await.unwrap();
    h.dispatcher.tick().await.unwrap();

    let starting = h.app.runs.get(&run.id).await.unwrap();
    assert_eq!(starting.status, RunStatus::Starting);
    assert_eq!(starting.agent_id, Some("a1".into()));

    let calls = h.transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "http://a1:9000");
    assert_eq!(calls[0].1.bot_id, bot.id);
    assert_eq!(calls[0].1.script, "google_bot");
    assert_eq!(calls[0].1.run_id, run.id);

    // The agent simulator reports progress over the socket path.
    report(&h, &run.id, RunStatus::Running).await;
    report(&h, &run.id, RunStatus::Completed).await;

    let done = h.app.runs.get(&run.id).await.unwrap();
    assert_eq!(done.status, RunStatus::Completed);
    assert_eq!(done.bot_id, bot.id);
    assert!(done.end_time.is_some());
    assert_eq!(
        h.app.agents.get(&"a1".into()).await.unwrap().status,
        AgentStatus::Available
    );
}

#[tokio::test]
async fn one_agent_works_through_a_contended_queue() {
    let h = harness();
    register_agent(&h, "a1").await;
    let mut run_ids = Vec::new();
    for name in ["b1", "b2", "b3"] {
        let bot = h
            .app
            .bots
            .create(name.to_string(), format!("{name}_bot"), None)
            .await
            .unwrap();
        run_ids.push(h.app.runs.create(bot.id).await.unwrap().id);
        h.clock.advance(secs(1));
    }

    h.dispatcher.tick().await.unwrap();
    let mut statuses = Vec::new();
    for id in &run_ids {
        statuses.push(h.app.runs.get(id).await.unwrap().status);
    }
    assert_eq!(
        statuses,
        vec![RunStatus::Starting, RunStatus::Queued, RunStatus::Queued]
    );

    report(&h, &run_ids[0], RunStatus::Running).await;
    report(&h, &run_ids[0], RunStatus::Completed).await;
    h.dispatcher.tick().await.unwrap();

    assert_eq!(
        h.app.runs.get(&run_ids[1]).await.unwrap().status,
        RunStatus::Starting
    );
    assert_eq!(
        h.app.runs.get(&run_ids[2]).await.unwrap().status,
        RunStatus::Queued
    );
}

#[tokio::test]
async fn cron_bots_fire_on_schedule() {
    let h = harness();
    h.clock.set("2024-01-01T00:00:10Z".parse().unwrap());
    let bot = h
        .app
        .bots
        .create(
            "nightly".to_string(),
            "nightly_bot".to_string(),
            Some("*/5 * * * *".to_string()),
        )
        .await
        .unwrap();
    register_agent(&h, "a1").await;

    h.scheduler.tick().await.unwrap();
    let runs = h.app.runs.list_by_bot(&bot.id).await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Scheduled);
    assert_eq!(
        runs[0].start_time,
        Some("2024-01-01T00:05:00Z".parse().unwrap())
    );

    // A later scheduler pass finds the firing already materialized.
    h.clock.set("2024-01-01T00:01:00Z".parse().unwrap());
    h.scheduler.tick().await.unwrap();
    assert_eq!(h.app.runs.list_by_bot(&bot.id).await.unwrap().len(), 1);

    // Once due, the dispatcher promotes and dispatches it.
    h.clock.set("2024-01-01T00:05:01Z".parse().unwrap());
    h.dispatcher.tick().await.unwrap();
    let run = &h.app.runs.list_by_bot(&bot.id).await.unwrap()[0];
    assert_eq!(run.status, RunStatus::Starting);
    assert_eq!(h.transport.calls().len(), 1);
}

#[tokio::test]
async fn a_refusing_agent_fails_the_run_and_the_queue_moves_on() {
    let h = harness();
    register_agent(&h, "a1").await;
    register_agent(&h, "a2").await;
    h.transport.fail_url("http://a1:9000", 503);

    let b1 = h
        .app
        .bots
        .create("b1".to_string(), "b1_bot".to_string(), None)
        .await
        .unwrap();
    let b2 = h
        .app
        .bots
        .create("b2".to_string(), "b2_bot".to_string(), None)
        .await
        .unwrap();
    let r1 = h.app.runs.create(b1.id).await.unwrap();
    h.clock.advance(secs(1));
    let r2 = h.app.runs.create(b2.id).await.unwrap();

    h.dispatcher.tick().await.unwrap();

    let failed = h.app.runs.get(&r1.id).await.unwrap();
    assert_eq!(failed.status, RunStatus::Error);
    assert!(failed.end_time.is_some());
    assert_eq!(
        h.app.agents.get(&"a1".into()).await.unwrap().status,
        AgentStatus::Available
    );

    let dispatched = h.app.runs.get(&r2.id).await.unwrap();
    assert_eq!(dispatched.status, RunStatus::Starting);
    assert_eq!(dispatched.agent_id, Some("a2".into()));
}

#[tokio::test]
async fn stuck_runs_are_recovered_by_the_janitor() {
    let h = harness();
    register_agent(&h, "a1").await;
    let bot = h
        .app
        .bots
        .create("hang".to_string(), "hang_bot".to_string(), None)
        .await
        .unwrap();
    let run = h.app.runs.create(bot.id).await.unwrap();

    h.dispatcher.tick().await.unwrap();
    report(&h, &run.id, RunStatus::Running).await;

    // Two hours pass with no completion; the agent keeps heartbeating.
    for _ in 0..720 {
        h.clock.advance(secs(10));
        h.app.agents.heartbeat(&"a1".into()).await.unwrap();
    }
    h.janitor.tick().await.unwrap();

    let failed = h.app.runs.get(&run.id).await.unwrap();
    assert_eq!(failed.status, RunStatus::Error);
    assert!(failed.end_time.is_some());
    assert_eq!(
        h.app.agents.get(&"a1".into()).await.unwrap().status,
        AgentStatus::Available
    );

    // Running the janitor again on the settled state changes nothing.
    let before = h.app.runs.list().await.unwrap();
    h.janitor.tick().await.unwrap();
    assert_eq!(h.app.runs.list().await.unwrap(), before);
}

#[tokio::test]
async fn observers_see_the_whole_run_lifecycle() {
    let h = harness();
    let mut observer = h.app.bus.subscribe();
    register_agent(&h, "a1").await;
    let bot = h
        .app
        .bots
        .create("probe".to_string(), "probe_bot".to_string(), None)
        .await
        .unwrap();
    let run = h.app.runs.create(bot.id).await.unwrap();

    h.dispatcher.tick().await.unwrap();
    report(&h, &run.id, RunStatus::Running).await;
    report(&h, &run.id, RunStatus::Completed).await;

    let mut run_statuses = Vec::new();
    while let Some(event) = observer.try_recv() {
        if let fleet_core::BusEvent::RunUpdated { run: updated } = event {
            if updated.id == run.id {
                run_statuses.push(updated.status);
            }
        }
    }
    assert_eq!(
        run_statuses,
        vec![RunStatus::Starting, RunStatus::Running, RunStatus::Completed]
    );
}
