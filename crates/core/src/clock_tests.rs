// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_returns_increasing_time() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(Duration::from_millis(1));
    let t2 = clock.now();
    assert!(t2 > t1);
}

#[test]
fn epoch_ms_tracks_now() {
    let clock = FakeClock::at(DateTime::UNIX_EPOCH);
    assert_eq!(clock.epoch_ms(), 0);
    clock.advance(Duration::from_secs(2));
    assert_eq!(clock.epoch_ms(), 2_000);
}

#[test]
fn fake_clock_can_be_advanced() {
    let clock = FakeClock::new();
    let t1 = clock.now();
    clock.advance(Duration::from_secs(60));
    let t2 = clock.now();
    assert_eq!(t2 - t1, chrono::Duration::seconds(60));
}

#[test]
fn fake_clock_is_cloneable_and_shared() {
    let clock1 = FakeClock::new();
    let clock2 = clock1.clone();
    let t1 = clock1.now();
    clock2.advance(Duration::from_secs(30));
    assert_eq!(clock1.now() - t1, chrono::Duration::seconds(30));
}

#[test]
fn fake_clock_set() {
    let clock = FakeClock::new();
    let target = "2024-01-01T00:00:10Z".parse::<DateTime<Utc>>().unwrap();
    clock.set(target);
    assert_eq!(clock.now(), target);
}
