//! Native seam between the achievement handle and the game-services SDK.
//!
//! The handle talks only to [`NativePeer`]; the Objective-C implementation
//! ([`gpgs`], Apple targets) and the in-process mock ([`mock`]) both live
//! behind it. Real achievement state (locked/revealed/unlocked, progress,
//! offline queues) stays on the other side of this seam.

#[cfg(any(target_os = "macos", target_os = "ios"))]
pub mod gpgs;
pub mod mock;

use std::sync::Arc;

use crate::error::AchievementError;
use crate::types::{IncrementHandler, RevealHandler, UnlockHandler};

/// One bound native achievement object.
///
/// Implementations forward each request to the service and invoke the
/// supplied completion exactly once, asynchronously, on a thread of the
/// service's choosing. A `None` completion is legal: the request is still
/// issued and the result discarded.
pub trait NativePeer: Send + Sync {
    /// Identifier the peer was initialized with.
    fn achievement_id(&self) -> String;

    /// Whether the service shows a completion notification on unlock.
    fn shows_completion_notification(&self) -> bool;

    /// Sets the completion-notification flag on the peer.
    fn set_shows_completion_notification(&self, shows: bool);

    /// Forward an unlock request.
    fn unlock(&self, completion: Option<UnlockHandler>);

    /// Forward a reveal request.
    fn reveal(&self, completion: Option<RevealHandler>);

    /// Forward an increment request. Step validation happens in the handle;
    /// peers receive positive counts only.
    fn increment(&self, steps: i32, completion: Option<IncrementHandler>);
}

/// Factory for bound peers.
pub trait AchievementBackend: Send + Sync {
    /// Bind a native achievement object for the given identifier.
    ///
    /// Identifier validation against the registered achievement set is the
    /// service's job, not this layer's.
    fn bind(&self, achievement_id: &str) -> Result<Arc<dyn NativePeer>, AchievementError>;
}

/// Bind via the platform's default backend.
pub(crate) fn bind_default(achievement_id: &str) -> Result<Arc<dyn NativePeer>, AchievementError> {
    #[cfg(any(target_os = "macos", target_os = "ios"))]
    {
        gpgs::GpgsBackend::new().bind(achievement_id)
    }
    #[cfg(not(any(target_os = "macos", target_os = "ios")))]
    {
        Err(AchievementError::Binding {
            reason: format!(
                "no native game-services SDK on this platform (achievement {achievement_id:?})"
            ),
        })
    }
}
