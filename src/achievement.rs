//! The achievement handle: a Rust proxy bound to one native achievement
//! object.

use std::fmt;
use std::sync::Arc;

use crate::error::AchievementError;
use crate::native::{self, AchievementBackend, NativePeer};
use crate::types::{IncrementHandler, RevealHandler, UnlockHandler};

/// A proxy for one native achievement object, created with an achievement
/// identifier.
///
/// The handle forwards every operation to the peer it is bound to and
/// relays each completion callback back into Rust. It holds no achievement
/// state itself; locked/revealed/unlocked transitions, progress steps,
/// offline queuing, and sync all live in the SDK and, transitively, the
/// game-services backend.
///
/// Operations return immediately; completions arrive later on a thread of
/// the SDK's choosing. The handle performs no internal synchronization
/// beyond what the peer provides, so mutating the notification flag from
/// several threads at once needs an external lock.
pub struct Achievement {
    achievement_id: String,
    peer: Arc<dyn NativePeer>,
}

impl Achievement {
    /// Binds a new handle via the platform's native SDK.
    ///
    /// Fails when the native initializer cannot produce a peer object (and
    /// on platforms without the SDK). Whether the identifier names a
    /// registered achievement is validated by the service, not here.
    pub fn new(achievement_id: impl Into<String>) -> Result<Self, AchievementError> {
        let achievement_id = achievement_id.into();
        let peer = native::bind_default(&achievement_id)?;
        Ok(Self {
            achievement_id,
            peer,
        })
    }

    /// Binds a new handle against an explicit backend.
    ///
    /// This is how tests bind to [`crate::native::mock::MockBackend`].
    pub fn with_backend(
        achievement_id: impl Into<String>,
        backend: &dyn AchievementBackend,
    ) -> Result<Self, AchievementError> {
        let achievement_id = achievement_id.into();
        let peer = backend.bind(&achievement_id)?;
        Ok(Self {
            achievement_id,
            peer,
        })
    }

    /// The identifier this handle was constructed with.
    pub fn achievement_id(&self) -> &str {
        &self.achievement_id
    }

    /// Whether the SDK shows a completion notification when the
    /// achievement is unlocked.
    ///
    /// Reads pass through to the peer; the default value is the SDK's.
    pub fn shows_completion_notification(&self) -> bool {
        self.peer.shows_completion_notification()
    }

    /// Sets the completion-notification flag on the peer.
    pub fn set_shows_completion_notification(&self, shows: bool) {
        self.peer.set_shows_completion_notification(shows);
    }

    /// Requests that the achievement be marked unlocked.
    ///
    /// If the notification flag is set and the achievement was not
    /// previously unlocked, the SDK shows a completion notification.
    /// Unlocking implicitly reveals the achievement and cancels an
    /// in-flight reveal on this handle. When the device is offline the SDK
    /// queues the change for later sync and still reports success.
    ///
    /// The completion, if supplied, is invoked exactly once. On failure its
    /// error arm carries the relayed native error and the newly-unlocked
    /// flag is unspecified.
    pub fn unlock(&self, completion: Option<UnlockHandler>) {
        tracing::debug!(achievement_id = %self.achievement_id, "forwarding unlock request");
        self.peer.unlock(completion);
    }

    /// Requests that the achievement be revealed without unlocking it.
    ///
    /// Same asynchronous and offline semantics as [`unlock`](Self::unlock);
    /// the completion reports the resulting state or an error.
    pub fn reveal(&self, completion: Option<RevealHandler>) {
        tracing::debug!(achievement_id = %self.achievement_id, "forwarding reveal request");
        self.peer.reveal(completion);
    }

    /// Advances a partial achievement by `steps`.
    ///
    /// `steps` must be positive; non-positive counts are rejected here and
    /// reported through the completion rather than forwarded as a silent
    /// no-op. The step cap and saturation behavior are the SDK's. The
    /// completion reports the unlocked flag and cumulative step count, or
    /// an error.
    pub fn increment(&self, steps: i32, completion: Option<IncrementHandler>) {
        if steps <= 0 {
            tracing::warn!(
                achievement_id = %self.achievement_id,
                steps,
                "rejecting increment with non-positive step count"
            );
            if let Some(completion) = completion {
                completion(Err(AchievementError::InvalidStepCount(steps)));
            }
            return;
        }
        tracing::debug!(
            achievement_id = %self.achievement_id,
            steps,
            "forwarding increment request"
        );
        self.peer.increment(steps, completion);
    }
}

impl fmt::Debug for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Achievement")
            .field("achievement_id", &self.achievement_id)
            .finish_non_exhaustive()
    }
}
