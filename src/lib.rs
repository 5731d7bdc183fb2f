//! Rust bindings to the Google Play Games achievement service.
//!
//! The SDK's achievement class is exposed as [`Achievement`]: a handle
//! bound to one native achievement object, identified by an achievement ID
//! string. The handle forwards unlock, reveal, and increment requests to
//! the native layer and relays each completion callback back into Rust.
//!
//! All real behavior (notification display, offline queuing and later
//! sync, server communication) lives inside the SDK; the handle owns no
//! achievement state.
//!
//! ## Backends
//!
//! Requests reach the SDK through the [`native`] seam:
//!
//! 1. **Objective-C** (Apple targets): binds the real `GPGAchievement`
//!    class through the runtime.
//!
//! 2. **Mock**: an in-process stand-in ([`native::mock::MockBackend`]) for
//!    contract tests, yours included.
//!
//! ```rust
//! use gpgs_achievement::native::mock::MockBackend;
//! use gpgs_achievement::Achievement;
//!
//! let backend = MockBackend::new();
//! backend.define_incremental("ach_001", 10);
//!
//! let achievement = Achievement::with_backend("ach_001", &backend).unwrap();
//! achievement.increment(3, Some(Box::new(|result| {
//!     let result = result.unwrap();
//!     assert_eq!(result.current_steps, 3);
//! })));
//! backend.flush();
//! ```

pub mod achievement;
pub mod error;
pub mod native;
pub mod types;

pub use achievement::Achievement;
pub use error::AchievementError;
pub use types::{
    AchievementState, IncrementHandler, IncrementResult, RevealHandler, RevealResult,
    UnlockHandler, UnlockResult,
};
