//! Fatal runtime errors.

use std::cell::RefCell;
use std::fmt;
use std::panic;

/// Panic payload for fatal runtime conditions.
///
/// Raised with `panic_any` so unwinding releases every live array on the
/// way out; [`run_guarded`] catches it at the entry point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeFatal {
    pub message: String,
}

impl fmt::Display for RuntimeFatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fatal error: {}", self.message)
    }
}

impl std::error::Error for RuntimeFatal {}

// ── Thread-local panic state ─────────────────────────────────────────────

thread_local! {
    static PANIC_OCCURRED: RefCell<bool> = const { RefCell::new(false) };
    static PANIC_MESSAGE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Whether a fatal error was raised on this thread since the last reset.
#[must_use]
pub fn did_panic() -> bool {
    PANIC_OCCURRED.with(|p| *p.borrow())
}

/// Message of the last fatal error on this thread.
#[must_use]
pub fn panic_message() -> Option<String> {
    PANIC_MESSAGE.with(|m| m.borrow().clone())
}

pub fn reset_panic_state() {
    PANIC_OCCURRED.with(|p| *p.borrow_mut() = false);
    PANIC_MESSAGE.with(|m| *m.borrow_mut() = None);
}

/// Abort the current request with a fatal error.
#[cold]
#[inline(never)]
pub fn fatal(message: impl Into<String>) -> ! {
    let message = message.into();
    PANIC_OCCURRED.with(|p| *p.borrow_mut() = true);
    PANIC_MESSAGE.with(|m| *m.borrow_mut() = Some(message.clone()));
    tracing::error!(%message, "runtime fatal error");
    panic::panic_any(RuntimeFatal { message })
}

/// Run `f`, converting a [`fatal`] unwind into `Err`.
///
/// Panics that did not come from [`fatal`] are resumed untouched.
pub fn run_guarded<R>(f: impl FnOnce() -> R) -> Result<R, RuntimeFatal> {
    match panic::catch_unwind(panic::AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) => match payload.downcast::<RuntimeFatal>() {
            Ok(fatal) => Err(*fatal),
            Err(other) => panic::resume_unwind(other),
        },
    }
}
