// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fleet_core::BotId;

fn deleted(n: usize) -> BusEvent {
    BusEvent::BotDeleted { bot_id: BotId::new(format!("bot-{n}")) }
}

#[tokio::test]
async fn every_subscriber_sees_every_event() {
    let bus = EventBus::new();
    let mut a = bus.subscribe();
    let mut b = bus.subscribe();

    bus.publish(deleted(1));
    bus.publish(deleted(2));

    for sub in [&mut a, &mut b] {
        assert_eq!(sub.recv().await, Some(deleted(1)));
        assert_eq!(sub.recv().await, Some(deleted(2)));
    }
}

#[tokio::test]
async fn publishing_without_subscribers_is_fine() {
    let bus = EventBus::new();
    bus.publish(deleted(1));
    assert_eq!(bus.dropped_total(), 0);
}

#[tokio::test]
async fn slow_subscriber_loses_oldest_and_is_counted() {
    let bus = EventBus::with_capacity(2);
    let mut slow = bus.subscribe();

    for n in 0..5 {
        bus.publish(deleted(n));
    }

    // Only the newest two fit; three were dropped.
    assert_eq!(slow.recv().await, Some(deleted(3)));
    assert_eq!(slow.recv().await, Some(deleted(4)));
    assert_eq!(bus.dropped_total(), 3);
}

#[tokio::test]
async fn lag_on_one_subscriber_does_not_affect_another() {
    let bus = EventBus::with_capacity(2);
    let mut slow = bus.subscribe();

    bus.publish(deleted(0));
    bus.publish(deleted(1));

    // A fresh subscriber only sees what is published after it joins.
    let mut fresh = bus.subscribe();
    bus.publish(deleted(2));
    bus.publish(deleted(3));

    assert_eq!(fresh.recv().await, Some(deleted(2)));
    assert_eq!(fresh.recv().await, Some(deleted(3)));

    // The slow one lost the oldest two of its four.
    assert_eq!(slow.recv().await, Some(deleted(2)));
    assert_eq!(slow.recv().await, Some(deleted(3)));
    assert_eq!(bus.dropped_total(), 2);
}
