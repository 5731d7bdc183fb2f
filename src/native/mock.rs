//! In-process mock of the native achievement service.
//!
//! Contract tests run against this backend instead of the Objective-C SDK.
//! Operations apply their state transition immediately but queue the
//! completion; [`MockBackend::flush`] delivers everything pending exactly
//! once, on a freshly spawned thread, matching the SDK's contract that
//! completion handlers never run on the calling thread.
//!
//! Peers bound to the same identifier share service-side state, while
//! pending completions are tracked per peer: an unlock cancels a pending
//! reveal on its own handle only.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use super::{AchievementBackend, NativePeer};
use crate::error::AchievementError;
use crate::types::{
    AchievementState, IncrementHandler, IncrementResult, RevealHandler, RevealResult,
    UnlockHandler, UnlockResult,
};

/// Error code the mock uses for identifiers no achievement is registered
/// under, standing in for the service's server-side rejection.
pub const UNKNOWN_ACHIEVEMENT_CODE: i64 = 404;

/// Error code the mock uses when incrementing a non-incremental
/// achievement.
pub const NOT_INCREMENTAL_CODE: i64 = 405;

#[derive(Debug, Clone)]
struct Definition {
    /// Step target for incremental achievements, `None` for standard ones.
    step_target: Option<i32>,
}

/// Service-side state for one achievement identifier.
#[derive(Debug, Default)]
struct Record {
    revealed: bool,
    unlocked: bool,
    steps: i32,
}

/// A completion awaiting delivery. Outcomes are computed when the request
/// is issued; reveals stay mutable until then so a later unlock on the
/// same peer can supersede them.
enum Pending {
    Unlock(
        Option<UnlockHandler>,
        Result<UnlockResult, AchievementError>,
    ),
    Reveal {
        peer: u64,
        completion: Option<RevealHandler>,
        outcome: Result<RevealResult, AchievementError>,
    },
    Increment(
        Option<IncrementHandler>,
        Result<IncrementResult, AchievementError>,
    ),
}

#[derive(Default)]
struct ServiceState {
    definitions: HashMap<String, Definition>,
    records: HashMap<String, Record>,
    scripted_failures: HashMap<String, (i64, String)>,
    pending: Vec<Pending>,
    next_peer_serial: u64,
}

impl ServiceState {
    fn take_failure(&mut self, id: &str) -> Option<(i64, String)> {
        self.scripted_failures.remove(id)
    }

    fn record_mut(&mut self, id: &str) -> Result<&mut Record, AchievementError> {
        if !self.definitions.contains_key(id) {
            return Err(AchievementError::Native {
                code: UNKNOWN_ACHIEVEMENT_CODE,
                description: format!("unknown achievement {id:?}"),
            });
        }
        Ok(self.records.entry(id.to_string()).or_default())
    }
}

/// Scriptable stand-in for the game-services SDK.
pub struct MockBackend {
    state: Arc<Mutex<ServiceState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ServiceState::default())),
        }
    }

    /// Register a standard (non-incremental) achievement.
    pub fn define_standard(&self, id: &str) {
        let mut state = self.state.lock().expect("lock");
        state
            .definitions
            .insert(id.to_string(), Definition { step_target: None });
    }

    /// Register an incremental achievement that unlocks at `step_target`.
    pub fn define_incremental(&self, id: &str, step_target: i32) {
        let mut state = self.state.lock().expect("lock");
        state.definitions.insert(
            id.to_string(),
            Definition {
                step_target: Some(step_target),
            },
        );
    }

    /// Make the next operation on `id` fail with the given code and
    /// description, leaving service state untouched.
    pub fn fail_next(&self, id: &str, code: i64, description: &str) {
        let mut state = self.state.lock().expect("lock");
        state
            .scripted_failures
            .insert(id.to_string(), (code, description.to_string()));
    }

    /// Deliver every pending completion exactly once.
    ///
    /// Delivery happens on a spawned thread (joined before returning), so
    /// tests stay deterministic while still observing that completions do
    /// not run on the calling thread.
    pub fn flush(&self) {
        let pending = {
            let mut state = self.state.lock().expect("lock");
            std::mem::take(&mut state.pending)
        };
        if pending.is_empty() {
            return;
        }
        tracing::debug!(count = pending.len(), "delivering queued completions");
        let delivery = thread::spawn(move || {
            for entry in pending {
                match entry {
                    Pending::Unlock(completion, outcome) => {
                        if let Some(completion) = completion {
                            completion(outcome);
                        }
                    }
                    Pending::Reveal {
                        completion, outcome, ..
                    } => {
                        if let Some(completion) = completion {
                            completion(outcome);
                        }
                    }
                    Pending::Increment(completion, outcome) => {
                        if let Some(completion) = completion {
                            completion(outcome);
                        }
                    }
                }
            }
        });
        delivery.join().expect("completion delivery thread panicked");
    }

    /// Number of completions awaiting delivery.
    pub fn pending_count(&self) -> usize {
        self.state.lock().expect("lock").pending.len()
    }

    /// Service-side view of the revealed flag, for assertions.
    pub fn is_revealed(&self, id: &str) -> bool {
        self.state
            .lock()
            .expect("lock")
            .records
            .get(id)
            .map(|r| r.revealed)
            .unwrap_or(false)
    }

    /// Service-side view of the unlocked flag, for assertions.
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.state
            .lock()
            .expect("lock")
            .records
            .get(id)
            .map(|r| r.unlocked)
            .unwrap_or(false)
    }

    /// Service-side view of the step count, for assertions.
    pub fn current_steps(&self, id: &str) -> i32 {
        self.state
            .lock()
            .expect("lock")
            .records
            .get(id)
            .map(|r| r.steps)
            .unwrap_or(0)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AchievementBackend for MockBackend {
    fn bind(&self, achievement_id: &str) -> Result<Arc<dyn NativePeer>, AchievementError> {
        // stands in for the native initializer rejecting a malformed id
        if achievement_id.is_empty() {
            return Err(AchievementError::Binding {
                reason: "empty achievement id".into(),
            });
        }
        let mut state = self.state.lock().expect("lock");
        let serial = state.next_peer_serial;
        state.next_peer_serial += 1;
        Ok(Arc::new(MockPeer {
            achievement_id: achievement_id.to_string(),
            serial,
            // The SDK's actual default is not contractual; `true` here only
            // makes flag pass-through observable in tests.
            shows_completion_notification: AtomicBool::new(true),
            state: Arc::clone(&self.state),
        }))
    }
}

/// One peer bound through [`MockBackend`].
pub struct MockPeer {
    achievement_id: String,
    serial: u64,
    shows_completion_notification: AtomicBool,
    state: Arc<Mutex<ServiceState>>,
}

impl NativePeer for MockPeer {
    fn achievement_id(&self) -> String {
        self.achievement_id.clone()
    }

    fn shows_completion_notification(&self) -> bool {
        self.shows_completion_notification.load(Ordering::SeqCst)
    }

    fn set_shows_completion_notification(&self, shows: bool) {
        self.shows_completion_notification
            .store(shows, Ordering::SeqCst);
    }

    fn unlock(&self, completion: Option<UnlockHandler>) {
        let mut state = self.state.lock().expect("lock");
        // unlock supersedes any reveal still pending on this handle
        for entry in state.pending.iter_mut() {
            if let Pending::Reveal { peer, outcome, .. } = entry {
                if *peer == self.serial {
                    *outcome = Err(AchievementError::Cancelled);
                }
            }
        }
        let outcome = match state.take_failure(&self.achievement_id) {
            Some((code, description)) => Err(AchievementError::Native { code, description }),
            None => state.record_mut(&self.achievement_id).map(|record| {
                let newly_unlocked = !record.unlocked;
                record.unlocked = true;
                record.revealed = true;
                UnlockResult { newly_unlocked }
            }),
        };
        state.pending.push(Pending::Unlock(completion, outcome));
    }

    fn reveal(&self, completion: Option<RevealHandler>) {
        let mut state = self.state.lock().expect("lock");
        let outcome = match state.take_failure(&self.achievement_id) {
            Some((code, description)) => Err(AchievementError::Native { code, description }),
            None => state.record_mut(&self.achievement_id).map(|record| {
                let resulting = if record.unlocked {
                    AchievementState::Unlocked
                } else {
                    record.revealed = true;
                    AchievementState::Revealed
                };
                RevealResult { state: resulting }
            }),
        };
        state.pending.push(Pending::Reveal {
            peer: self.serial,
            completion,
            outcome,
        });
    }

    fn increment(&self, steps: i32, completion: Option<IncrementHandler>) {
        let mut state = self.state.lock().expect("lock");
        let outcome = match state.take_failure(&self.achievement_id) {
            Some((code, description)) => Err(AchievementError::Native { code, description }),
            None => {
                let definition = state.definitions.get(&self.achievement_id).cloned();
                match definition {
                    None => Err(AchievementError::Native {
                        code: UNKNOWN_ACHIEVEMENT_CODE,
                        description: format!("unknown achievement {:?}", self.achievement_id),
                    }),
                    Some(Definition { step_target: None }) => Err(AchievementError::Native {
                        code: NOT_INCREMENTAL_CODE,
                        description: format!(
                            "achievement {:?} is not incremental",
                            self.achievement_id
                        ),
                    }),
                    Some(Definition {
                        step_target: Some(target),
                    }) => {
                        let record = state
                            .records
                            .entry(self.achievement_id.clone())
                            .or_default();
                        // steps saturate at the target, like the service caps
                        // currentSteps at the achievement's total
                        record.steps = record.steps.saturating_add(steps).min(target);
                        let newly_unlocked = !record.unlocked && record.steps >= target;
                        if record.steps >= target {
                            record.unlocked = true;
                            record.revealed = true;
                        }
                        Ok(IncrementResult {
                            newly_unlocked,
                            current_steps: record.steps,
                        })
                    }
                }
            }
        };
        state.pending.push(Pending::Increment(completion, outcome));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    fn backend_with(id: &str, target: Option<i32>) -> MockBackend {
        let backend = MockBackend::new();
        match target {
            Some(target) => backend.define_incremental(id, target),
            None => backend.define_standard(id),
        }
        backend
    }

    #[test]
    fn increment_accumulates_and_unlocks_at_target() {
        let backend = backend_with("ach_steps", Some(5));
        let peer = backend.bind("ach_steps").unwrap();
        let (tx, rx) = mpsc::channel();
        let first_tx = tx.clone();
        peer.increment(3, Some(Box::new(move |r| first_tx.send(r).unwrap())));
        peer.increment(4, Some(Box::new(move |r| tx.send(r).unwrap())));
        backend.flush();

        let first = rx.recv().unwrap().unwrap();
        assert_eq!(
            first,
            IncrementResult {
                newly_unlocked: false,
                current_steps: 3
            }
        );
        let second = rx.recv().unwrap().unwrap();
        assert_eq!(
            second,
            IncrementResult {
                newly_unlocked: true,
                current_steps: 5
            }
        );
        assert!(backend.is_unlocked("ach_steps"));
    }

    #[test]
    fn standard_achievements_reject_increment() {
        let backend = backend_with("ach_plain", None);
        let peer = backend.bind("ach_plain").unwrap();
        let (tx, rx) = mpsc::channel();
        peer.increment(1, Some(Box::new(move |r| tx.send(r).unwrap())));
        backend.flush();

        match rx.recv().unwrap() {
            Err(AchievementError::Native { code, .. }) => assert_eq!(code, NOT_INCREMENTAL_CODE),
            other => panic!("expected not-incremental error, got {other:?}"),
        }
    }

    #[test]
    fn undefined_identifiers_fail_operations_not_binding() {
        let backend = MockBackend::new();
        let peer = backend.bind("ach_nowhere").unwrap();
        let (tx, rx) = mpsc::channel();
        peer.unlock(Some(Box::new(move |r| tx.send(r).unwrap())));
        backend.flush();

        match rx.recv().unwrap() {
            Err(AchievementError::Native { code, .. }) => {
                assert_eq!(code, UNKNOWN_ACHIEVEMENT_CODE);
            }
            other => panic!("expected unknown-achievement error, got {other:?}"),
        }
        assert!(!backend.is_unlocked("ach_nowhere"));
    }

    #[test]
    fn reveal_reports_unlocked_once_unlocked() {
        let backend = backend_with("ach_plain", None);
        let peer = backend.bind("ach_plain").unwrap();
        peer.unlock(None);
        backend.flush();

        let (tx, rx) = mpsc::channel();
        peer.reveal(Some(Box::new(move |r| tx.send(r).unwrap())));
        backend.flush();
        assert_eq!(
            rx.recv().unwrap().unwrap(),
            RevealResult {
                state: AchievementState::Unlocked
            }
        );
    }

    #[test]
    fn notification_flag_is_per_peer() {
        let backend = backend_with("ach_plain", None);
        let a = backend.bind("ach_plain").unwrap();
        let b = backend.bind("ach_plain").unwrap();
        a.set_shows_completion_notification(false);
        assert!(!a.shows_completion_notification());
        assert!(b.shows_completion_notification());
        assert_eq!(a.achievement_id(), "ach_plain");
    }
}
