//! Completion payloads relayed from the native achievement service.
//!
//! These types mirror the three completion-handler block signatures of the
//! SDK's achievement class: unlock reports a newly-unlocked flag, reveal
//! reports the resulting state, increment reports the flag plus the
//! cumulative step count.

use crate::error::AchievementError;

/// State of an achievement as reported by a reveal completion.
///
/// Mirrors the SDK's `NSInteger`-backed state enum, including its raw
/// representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(isize)]
pub enum AchievementState {
    /// Not yet visible to the player.
    Hidden = 0,
    /// Visible but not completed.
    Revealed = 1,
    /// Completed.
    Unlocked = 2,
}

impl AchievementState {
    /// Maps a raw `NSInteger` value from the native layer, `None` for
    /// values outside the SDK's documented set.
    pub fn from_raw(raw: isize) -> Option<Self> {
        match raw {
            0 => Some(Self::Hidden),
            1 => Some(Self::Revealed),
            2 => Some(Self::Unlocked),
            _ => None,
        }
    }

    /// The raw `NSInteger` value crossing the FFI boundary.
    pub fn as_raw(self) -> isize {
        self as isize
    }
}

/// Outcome of an unlock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockResult {
    /// Whether the achievement was newly unlocked by this request. `false`
    /// when it had already been unlocked before.
    pub newly_unlocked: bool,
}

/// Outcome of a reveal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealResult {
    /// The achievement's state after the request.
    pub state: AchievementState,
}

/// Outcome of an increment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncrementResult {
    /// Whether this increment pushed the achievement over its step target.
    pub newly_unlocked: bool,
    /// Cumulative step count after the request.
    pub current_steps: i32,
}

/// Completion handler for [`crate::Achievement::unlock`].
///
/// Invoked exactly once by the native layer, on a thread of the SDK's
/// choosing. `Send` because the delivery thread is never the caller's.
pub type UnlockHandler = Box<dyn FnOnce(Result<UnlockResult, AchievementError>) + Send + 'static>;

/// Completion handler for [`crate::Achievement::reveal`].
pub type RevealHandler = Box<dyn FnOnce(Result<RevealResult, AchievementError>) + Send + 'static>;

/// Completion handler for [`crate::Achievement::increment`].
pub type IncrementHandler =
    Box<dyn FnOnce(Result<IncrementResult, AchievementError>) + Send + 'static>;
