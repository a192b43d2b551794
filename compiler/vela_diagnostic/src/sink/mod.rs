//! Thread-safe diagnostic sink shared by every code generation task.
//!
//! Tasks run on a worker pool and may report errors concurrently. The sink
//! keeps them behind a `parking_lot::Mutex`, drops exact duplicates (several
//! tasks can trip over the same broken class), and raises a sticky failed
//! flag on the first error. Nothing is ever unwound across task boundaries:
//! callers report, return a usability `bool`, and the driver consults
//! [`DiagnosticSink::checkpoint`] at phase boundaries.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::{Diagnostic, ErrorGuaranteed, Severity};

#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    failed: AtomicBool,
    error_count: AtomicUsize,
    warning_count: AtomicUsize,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic. Returns `false` if an identical one was already
    /// recorded.
    pub fn emit(&self, diagnostic: Diagnostic) -> bool {
        let mut diagnostics = self.diagnostics.lock();
        if diagnostics.contains(&diagnostic) {
            tracing::trace!(code = %diagnostic.code, "duplicate diagnostic dropped");
            return false;
        }
        match diagnostic.severity {
            Severity::Error => {
                self.error_count.fetch_add(1, Ordering::Relaxed);
                self.failed.store(true, Ordering::Release);
                tracing::debug!(code = %diagnostic.code, message = %diagnostic.message, "error reported");
            }
            Severity::Warning => {
                self.warning_count.fetch_add(1, Ordering::Relaxed);
            }
            Severity::Note => {}
        }
        diagnostics.push(diagnostic);
        true
    }

    /// Record an error and hand back proof that it was recorded.
    pub fn emit_error(&self, diagnostic: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diagnostic.is_error());
        self.emit(diagnostic);
        self.failed.store(true, Ordering::Release);
        ErrorGuaranteed::new_emitted()
    }

    /// The "compilation has failed" flag.
    pub fn has_errors(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count.load(Ordering::Relaxed)
    }

    /// `Err` once any error was recorded.
    pub fn checkpoint(&self) -> Result<(), ErrorGuaranteed> {
        if self.has_errors() {
            Err(ErrorGuaranteed::new_emitted())
        } else {
            Ok(())
        }
    }

    /// Snapshot of everything recorded so far, in report order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Drain recorded diagnostics, sorted by code then message so that
    /// output does not depend on task scheduling. The failed flag stays set.
    pub fn take_sorted(&self) -> Vec<Diagnostic> {
        let mut drained = std::mem::take(&mut *self.diagnostics.lock());
        drained.sort_by(|a, b| a.code.cmp(&b.code).then_with(|| a.message.cmp(&b.message)));
        drained
    }
}
