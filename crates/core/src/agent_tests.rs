// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

const INTERVAL: Duration = Duration::from_secs(10);

fn agent_with_age(age_secs: i64) -> (Agent, DateTime<Utc>) {
    let heartbeat = "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
    let now = heartbeat + chrono::Duration::seconds(age_secs);
    (AgentBuilder::default().last_heartbeat(heartbeat).build(), now)
}

#[parameterized(
    fresh = { 0, true },
    within_two_intervals = { 20, true },
    just_over = { 21, false },
    long_gone = { 120, false },
)]
fn liveness_uses_two_interval_cutoff(age_secs: i64, live: bool) {
    let (agent, now) = agent_with_age(age_secs);
    assert_eq!(agent.is_live(now, INTERVAL), live);
}

#[parameterized(
    fresh = { 0, false },
    at_five_intervals = { 50, false },
    just_over = { 51, true },
)]
fn staleness_uses_five_interval_cutoff(age_secs: i64, stale: bool) {
    let (agent, now) = agent_with_age(age_secs);
    assert_eq!(agent.is_stale(now, INTERVAL), stale);
}

#[test]
fn heartbeat_from_the_future_counts_as_live() {
    let (agent, now) = agent_with_age(-5);
    assert!(agent.is_live(now, INTERVAL));
    assert!(!agent.is_stale(now, INTERVAL));
}

#[test]
fn status_serializes_as_snake_case() {
    let json = serde_json::to_value(AgentStatus::Available).unwrap();
    assert_eq!(json, "available");
    let back: AgentStatus = serde_json::from_value(serde_json::json!("offline")).unwrap();
    assert_eq!(back, AgentStatus::Offline);
}

#[test]
fn agent_round_trips_through_json() {
    let mut resources = Map::new();
    resources.insert("memory_mb".to_string(), serde_json::json!(2048));
    let agent = AgentBuilder::default().resources(resources).build();
    let json = serde_json::to_string(&agent).unwrap();
    let back: Agent = serde_json::from_str(&json).unwrap();
    assert_eq!(back, agent);
}
