//! Proof that an error was reported.

use std::fmt;

/// Zero-sized proof that at least one error diagnostic reached a sink.
///
/// Only obtainable from an error count, so a `Result<_, ErrorGuaranteed>`
/// can never fail silently.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    /// Produce a guarantee when `count` errors were emitted, `None` for zero.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then_some(ErrorGuaranteed(()))
    }

    /// Only the sink mints guarantees directly, right after recording an error.
    pub(crate) fn new_emitted() -> Self {
        ErrorGuaranteed(())
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}

impl std::error::Error for ErrorGuaranteed {}
