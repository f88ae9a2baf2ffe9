//! Tests for the sliding-window quota tracker.

use std::sync::Arc;
use std::time::Duration;
use tollgate_core::ManualClock;
use tollgate_error::QuotaErrorKind;
use tollgate_rate_limit::{QuotaConfig, QuotaTracker};

fn tracker(rpm: u32, tpm: u64) -> (QuotaTracker, ManualClock) {
    let clock = ManualClock::new();
    let tracker = QuotaTracker::with_clock(QuotaConfig::new(rpm, tpm), Arc::new(clock.clone()));
    (tracker, clock)
}

#[test]
fn test_rpm_limit_denies_third_call_until_window_slides() {
    let (tracker, clock) = tracker(2, 1_000);

    tracker.reserve(10).unwrap();
    tracker.reserve(10).unwrap();

    let denied = tracker.reserve(10).unwrap_err();
    assert_eq!(
        denied.kind(),
        &QuotaErrorKind::RequestsPerMinute { limit: 2 }
    );

    clock.advance(Duration::from_secs(61));
    tracker.reserve(10).unwrap();
}

#[test]
fn test_tpm_limit_is_inclusive() {
    let (tracker, _clock) = tracker(100, 150);

    tracker.reserve(100).unwrap();

    let denied = tracker.reserve(60).unwrap_err();
    assert_eq!(
        denied.kind(),
        &QuotaErrorKind::TokensPerMinute {
            limit: 150,
            used: 100,
            requested: 60,
        }
    );

    tracker.reserve(50).unwrap();
    assert_eq!(tracker.status().tokens_in_window, 150);
}

#[test]
fn test_entries_at_exactly_sixty_seconds_still_count() {
    let (tracker, clock) = tracker(1, 1_000);

    tracker.reserve(1).unwrap();

    clock.advance(Duration::from_secs(60));
    assert!(tracker.reserve(1).unwrap_err().is_requests_per_minute());

    clock.advance(Duration::from_millis(1));
    tracker.reserve(1).unwrap();
}

#[test]
fn test_denial_leaves_window_unchanged() {
    let (tracker, _clock) = tracker(3, 100);

    tracker.reserve(90).unwrap();
    let before = tracker.status();

    for _ in 0..5 {
        assert!(tracker.reserve(20).unwrap_err().is_tokens_per_minute());
    }

    assert_eq!(tracker.status(), before);
    assert_eq!(before.requests_in_window, 1);
    assert_eq!(before.tokens_in_window, 90);
}

#[test]
fn test_rpm_denial_does_not_consume_tokens() {
    let (tracker, _clock) = tracker(1, 1_000);

    tracker.reserve(100).unwrap();
    assert!(tracker.reserve(500).is_err());

    assert_eq!(tracker.status().tokens_in_window, 100);
}

#[test]
fn test_tokens_slide_out_independently() {
    let (tracker, clock) = tracker(10, 100);

    tracker.reserve(60).unwrap();
    clock.advance(Duration::from_secs(30));
    tracker.reserve(40).unwrap();

    assert!(tracker.reserve(1).unwrap_err().is_tokens_per_minute());

    // The first reservation is now 61s old, the second 31s.
    clock.advance(Duration::from_secs(31));
    tracker.reserve(60).unwrap();

    let status = tracker.status();
    assert_eq!(status.tokens_in_window, 100);
    assert_eq!(status.requests_in_window, 2);
}

#[test]
fn test_reconcile_charges_tokens_without_counting_a_call() {
    let (tracker, clock) = tracker(2, 100);

    tracker.reserve(10).unwrap();
    tracker.reconcile(80);

    let status = tracker.status();
    assert_eq!(status.requests_in_window, 1);
    assert_eq!(status.tokens_in_window, 90);
    assert_eq!(status.tokens_remaining(), 10);

    assert!(tracker.reserve(20).unwrap_err().is_tokens_per_minute());
    tracker.reserve(10).unwrap();

    clock.advance(Duration::from_secs(61));
    assert_eq!(tracker.status().tokens_in_window, 0);
}

#[test]
fn test_reconcile_may_overshoot_limit() {
    let (tracker, clock) = tracker(5, 100);

    tracker.reserve(0).unwrap();
    tracker.reconcile(250);

    let status = tracker.status();
    assert_eq!(status.tokens_in_window, 250);
    assert_eq!(status.tokens_remaining(), 0);

    // Over the limit, even an empty reservation is denied.
    let err = tracker.reserve(0).unwrap_err();
    assert_eq!(
        *err.kind(),
        QuotaErrorKind::TokensPerMinute {
            limit: 100,
            used: 250,
            requested: 0
        }
    );
    assert!(tracker.reserve(1).is_err());

    clock.advance(Duration::from_secs(61));
    assert!(tracker.reserve(0).is_ok());
}

#[test]
fn test_concurrent_reservations_never_exceed_rpm() {
    let (tracker, _clock) = tracker(50, 1_000_000);
    let tracker = Arc::new(tracker);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            std::thread::spawn(move || (0..20).filter(|_| tracker.reserve(5).is_ok()).count())
        })
        .collect();

    let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(admitted, 50);
    assert_eq!(tracker.status().requests_in_window, 50);
    assert_eq!(tracker.status().tokens_in_window, 250);
}

#[test]
fn test_concurrent_reservations_never_exceed_tpm() {
    let (tracker, _clock) = tracker(1_000, 1_000);
    let tracker = Arc::new(tracker);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            std::thread::spawn(move || (0..50).filter(|_| tracker.reserve(7).is_ok()).count())
        })
        .collect();

    let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    // 142 * 7 = 994; one more would reach 1001.
    assert_eq!(admitted, 142);
    let status = tracker.status();
    assert_eq!(status.tokens_in_window, 994);
    assert_eq!(status.requests_in_window, 142);
}
