//! Cancellation and failure-relay contract against the mock service.

mod common;

use common::{bind, recording_increment, recording_reveal, recording_unlock, test_backend};
use gpgs_achievement::{Achievement, AchievementError, UnlockResult};

#[test]
fn unlock_supersedes_pending_reveal() {
    let backend = test_backend();
    let achievement = bind(&backend, "ach_first_blood");

    let (reveal_callback, reveal_rx) = recording_reveal();
    achievement.reveal(Some(reveal_callback));

    let (unlock_callback, unlock_rx) = recording_unlock();
    achievement.unlock(Some(unlock_callback));
    backend.flush();

    let reveal = reveal_rx.try_recv().expect("superseded reveal still completes");
    assert!(
        matches!(reveal, Err(AchievementError::Cancelled)),
        "reveal must never succeed once an unlock supersedes it: {reveal:?}"
    );
    assert_eq!(
        unlock_rx
            .try_recv()
            .expect("unlock completion")
            .expect("unlock succeeds"),
        UnlockResult {
            newly_unlocked: true
        }
    );
    assert!(
        reveal_rx.try_recv().is_err(),
        "exactly one reveal completion"
    );
}

#[test]
fn native_failures_are_relayed_unchanged() {
    let backend = test_backend();
    backend.fail_next("ach_first_blood", 7, "server rejected the request");
    let achievement = bind(&backend, "ach_first_blood");

    let (callback, rx) = recording_unlock();
    achievement.unlock(Some(callback));
    backend.flush();

    match rx.try_recv().expect("completion") {
        Err(AchievementError::Native { code, description }) => {
            assert_eq!(code, 7);
            assert_eq!(description, "server rejected the request");
        }
        other => panic!("expected relayed native failure, got {other:?}"),
    }
    // a failed request must not change service state
    assert!(!backend.is_unlocked("ach_first_blood"));
}

#[test]
fn failed_increment_leaves_steps_untouched() {
    let backend = test_backend();
    backend.fail_next("ach_001", 9, "temporarily unavailable");
    let achievement = bind(&backend, "ach_001");

    let (callback, rx) = recording_increment();
    achievement.increment(4, Some(callback));
    backend.flush();

    assert!(rx.try_recv().expect("completion").is_err());
    assert_eq!(backend.current_steps("ach_001"), 0);
}

#[test]
fn binding_an_empty_id_fails() {
    let backend = test_backend();
    let err = Achievement::with_backend("", &backend).expect_err("empty id must not bind");
    assert!(matches!(err, AchievementError::Binding { .. }));
}

#[cfg(not(any(target_os = "macos", target_os = "ios")))]
#[test]
fn platform_default_backend_is_unavailable_here() {
    let err = Achievement::new("ach_001").expect_err("no native SDK on this platform");
    assert!(matches!(err, AchievementError::Binding { .. }));
}
