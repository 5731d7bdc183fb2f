//! Objective-C backend binding the SDK's `GPGAchievement` class.
//!
//! Selector surface, per the SDK headers: `initWithAchievementId:`,
//! `unlockAchievementWithCompletionHandler:`,
//! `revealAchievementWithCompletionHandler:`,
//! `incrementAchievementNumSteps:completionHandler:`, plus the
//! `achievementId` and `showsCompletionNotification` properties. Rust
//! callbacks are wrapped in Objective-C blocks; an omitted callback is
//! forwarded as a nil block.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};
use std::sync::{Arc, Mutex};

use block::{Block, ConcreteBlock};
use objc::runtime::{Class, Object, BOOL, NO, YES};
use objc::{msg_send, sel, sel_impl};
use once_cell::sync::OnceCell;

use super::{AchievementBackend, NativePeer};
use crate::error::AchievementError;
use crate::types::{
    AchievementState, IncrementHandler, IncrementResult, RevealHandler, RevealResult,
    UnlockHandler, UnlockResult,
};

#[link(name = "Foundation", kind = "framework")]
unsafe extern "C" {}

/// `NSUTF8StringEncoding`
const UTF8_ENCODING: usize = 4;

type UnlockBlock = Block<(BOOL, *mut Object), ()>;
type RevealBlock = Block<(isize, *mut Object), ()>;
type IncrementBlock = Block<(BOOL, c_int, *mut Object), ()>;

// Objective-C classes are immortal, so the resolved class is cached as a
// raw address.
static ACHIEVEMENT_CLASS: OnceCell<usize> = OnceCell::new();

fn achievement_class() -> Result<&'static Class, AchievementError> {
    let addr = ACHIEVEMENT_CLASS.get_or_try_init(|| {
        Class::get("GPGAchievement")
            .map(|cls| cls as *const Class as usize)
            .ok_or_else(|| AchievementError::Binding {
                reason: "GPGAchievement class is not registered with the Objective-C runtime"
                    .into(),
            })
    })?;
    Ok(unsafe { &*(*addr as *const Class) })
}

unsafe fn nsstring(s: &str) -> Result<*mut Object, AchievementError> {
    let cls = Class::get("NSString").ok_or_else(|| AchievementError::Binding {
        reason: "NSString class is not registered with the Objective-C runtime".into(),
    })?;
    let obj: *mut Object = unsafe {
        let obj: *mut Object = msg_send![cls, alloc];
        msg_send![obj,
            initWithBytes: s.as_ptr() as *const c_void
            length: s.len()
            encoding: UTF8_ENCODING
        ]
    };
    if obj.is_null() {
        return Err(AchievementError::Binding {
            reason: "NSString allocation failed".into(),
        });
    }
    Ok(obj)
}

unsafe fn string_from_nsstring(obj: *mut Object) -> String {
    if obj.is_null() {
        return String::new();
    }
    unsafe {
        let utf8: *const c_char = msg_send![obj, UTF8String];
        if utf8.is_null() {
            return String::new();
        }
        CStr::from_ptr(utf8).to_string_lossy().into_owned()
    }
}

unsafe fn error_from_nserror(err: *mut Object) -> AchievementError {
    unsafe {
        let code: isize = msg_send![err, code];
        let description: *mut Object = msg_send![err, localizedDescription];
        AchievementError::Native {
            code: code as i64,
            description: string_from_nsstring(description),
        }
    }
}

/// Retained pointer to one `GPGAchievement` instance. The SDK's achievement
/// objects accept messages from any thread; completion handlers arrive on
/// SDK-owned queues.
struct PeerRef(*mut Object);

unsafe impl Send for PeerRef {}
unsafe impl Sync for PeerRef {}

impl Drop for PeerRef {
    fn drop(&mut self) {
        unsafe {
            let _: () = msg_send![self.0, release];
        }
    }
}

/// Backend that binds peers through the Objective-C runtime.
pub struct GpgsBackend;

impl GpgsBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GpgsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AchievementBackend for GpgsBackend {
    fn bind(&self, achievement_id: &str) -> Result<Arc<dyn NativePeer>, AchievementError> {
        let cls = achievement_class()?;
        unsafe {
            let id_string = nsstring(achievement_id)?;
            let obj: *mut Object = msg_send![cls, alloc];
            let obj: *mut Object = msg_send![obj, initWithAchievementId: id_string];
            let _: () = msg_send![id_string, release];
            if obj.is_null() {
                return Err(AchievementError::Binding {
                    reason: format!("initWithAchievementId: returned nil for {achievement_id:?}"),
                });
            }
            Ok(Arc::new(GpgsPeer {
                obj: PeerRef(obj),
            }))
        }
    }
}

/// One bound `GPGAchievement` object.
pub struct GpgsPeer {
    obj: PeerRef,
}

impl NativePeer for GpgsPeer {
    fn achievement_id(&self) -> String {
        unsafe {
            let s: *mut Object = msg_send![self.obj.0, achievementId];
            string_from_nsstring(s)
        }
    }

    fn shows_completion_notification(&self) -> bool {
        unsafe {
            let flag: BOOL = msg_send![self.obj.0, showsCompletionNotification];
            flag != NO
        }
    }

    fn set_shows_completion_notification(&self, shows: bool) {
        let flag: BOOL = if shows { YES } else { NO };
        unsafe {
            let _: () = msg_send![self.obj.0, setShowsCompletionNotification: flag];
        }
    }

    fn unlock(&self, completion: Option<UnlockHandler>) {
        match completion {
            Some(completion) => {
                // FnOnce behind a Fn block: the slot is emptied on first
                // invocation, and the SDK invokes the handler exactly once.
                let slot = Mutex::new(Some(completion));
                let block = ConcreteBlock::new(move |newly_unlocked: BOOL, error: *mut Object| {
                    if let Some(completion) = slot.lock().expect("completion slot").take() {
                        if error.is_null() {
                            completion(Ok(UnlockResult {
                                newly_unlocked: newly_unlocked != NO,
                            }));
                        } else {
                            completion(Err(unsafe { error_from_nserror(error) }));
                        }
                    }
                });
                let block = block.copy();
                unsafe {
                    let _: () =
                        msg_send![self.obj.0, unlockAchievementWithCompletionHandler: &*block];
                }
            }
            None => unsafe {
                let nil_block: *const UnlockBlock = std::ptr::null();
                let _: () =
                    msg_send![self.obj.0, unlockAchievementWithCompletionHandler: nil_block];
            },
        }
    }

    fn reveal(&self, completion: Option<RevealHandler>) {
        match completion {
            Some(completion) => {
                let slot = Mutex::new(Some(completion));
                let block = ConcreteBlock::new(move |state: isize, error: *mut Object| {
                    if let Some(completion) = slot.lock().expect("completion slot").take() {
                        if !error.is_null() {
                            completion(Err(unsafe { error_from_nserror(error) }));
                        } else {
                            match AchievementState::from_raw(state) {
                                Some(state) => completion(Ok(RevealResult { state })),
                                None => completion(Err(AchievementError::Native {
                                    code: state as i64,
                                    description: format!(
                                        "reveal reported unknown achievement state {state}"
                                    ),
                                })),
                            }
                        }
                    }
                });
                let block = block.copy();
                unsafe {
                    let _: () =
                        msg_send![self.obj.0, revealAchievementWithCompletionHandler: &*block];
                }
            }
            None => unsafe {
                let nil_block: *const RevealBlock = std::ptr::null();
                let _: () =
                    msg_send![self.obj.0, revealAchievementWithCompletionHandler: nil_block];
            },
        }
    }

    fn increment(&self, steps: i32, completion: Option<IncrementHandler>) {
        // the SDK method takes a C int step count
        let steps: c_int = steps;
        match completion {
            Some(completion) => {
                let slot = Mutex::new(Some(completion));
                let block = ConcreteBlock::new(
                    move |newly_unlocked: BOOL, current_steps: c_int, error: *mut Object| {
                        if let Some(completion) = slot.lock().expect("completion slot").take() {
                            if error.is_null() {
                                completion(Ok(IncrementResult {
                                    newly_unlocked: newly_unlocked != NO,
                                    current_steps,
                                }));
                            } else {
                                completion(Err(unsafe { error_from_nserror(error) }));
                            }
                        }
                    },
                );
                let block = block.copy();
                unsafe {
                    let _: () = msg_send![
                        self.obj.0,
                        incrementAchievementNumSteps: steps
                        completionHandler: &*block
                    ];
                }
            }
            None => unsafe {
                let nil_block: *const IncrementBlock = std::ptr::null();
                let _: () = msg_send![
                    self.obj.0,
                    incrementAchievementNumSteps: steps
                    completionHandler: nil_block
                ];
            },
        }
    }
}
