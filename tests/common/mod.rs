//! Shared test utilities: a scripted mock service and recording callbacks.

use std::sync::mpsc::{self, Receiver};

use gpgs_achievement::native::mock::MockBackend;
use gpgs_achievement::{
    Achievement, AchievementError, IncrementHandler, IncrementResult, RevealHandler, RevealResult,
    UnlockHandler, UnlockResult,
};

/// Backend with one standard and one incremental achievement registered.
pub fn test_backend() -> MockBackend {
    let backend = MockBackend::new();
    backend.define_standard("ach_first_blood");
    backend.define_incremental("ach_001", 10);
    backend
}

/// Binds a handle against the mock backend.
pub fn bind(backend: &MockBackend, id: &str) -> Achievement {
    Achievement::with_backend(id, backend).expect("bind achievement")
}

/// Unlock callback that records every invocation on a channel.
pub fn recording_unlock() -> (
    UnlockHandler,
    Receiver<Result<UnlockResult, AchievementError>>,
) {
    let (tx, rx) = mpsc::channel();
    (
        Box::new(move |result| tx.send(result).expect("record unlock result")),
        rx,
    )
}

/// Reveal callback that records every invocation on a channel.
pub fn recording_reveal() -> (
    RevealHandler,
    Receiver<Result<RevealResult, AchievementError>>,
) {
    let (tx, rx) = mpsc::channel();
    (
        Box::new(move |result| tx.send(result).expect("record reveal result")),
        rx,
    )
}

/// Increment callback that records every invocation on a channel.
pub fn recording_increment() -> (
    IncrementHandler,
    Receiver<Result<IncrementResult, AchievementError>>,
) {
    let (tx, rx) = mpsc::channel();
    (
        Box::new(move |result| tx.send(result).expect("record increment result")),
        rx,
    )
}
