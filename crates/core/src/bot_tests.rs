// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;

#[test]
fn new_bot_gets_prefixed_id_and_creation_time() {
    let clock = FakeClock::new();
    let bot = Bot::new("checkout-probe", "checkout_bot", None, &clock);
    assert!(bot.id.as_str().starts_with(BotId::PREFIX));
    assert_eq!(bot.created_at, clock.now());
    assert_eq!(bot.schedule, None);
}

#[test]
fn schedule_is_omitted_from_json_when_absent() {
    let bot = BotBuilder::default().build();
    let json = serde_json::to_value(&bot).unwrap();
    assert!(json.get("schedule").is_none());
    assert_eq!(json["name"], "test-bot");
}

#[test]
fn bot_round_trips_through_json() {
    let bot = BotBuilder::default().schedule("*/5 * * * *").build();
    let json = serde_json::to_string(&bot).unwrap();
    let back: Bot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, bot);
}
