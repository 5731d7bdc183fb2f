//! Error type for the achievement binding.

/// Error type for binding achievements and relaying native request failures
#[derive(Debug, thiserror::Error)]
pub enum AchievementError {
    /// The native initializer could not produce a peer object.
    #[error("failed to bind achievement: {reason}")]
    Binding { reason: String },

    /// The native layer reported a request failure. Code and description
    /// are relayed from the SDK's error object unchanged.
    #[error("achievement request failed (code {code}): {description}")]
    Native { code: i64, description: String },

    /// `increment` was called with a non-positive step count.
    #[error("step count must be positive, got {0}")]
    InvalidStepCount(i32),

    /// A reveal request was superseded by an unlock on the same handle.
    #[error("reveal superseded by unlock")]
    Cancelled,
}
