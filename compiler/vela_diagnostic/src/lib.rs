//! Diagnostic system for the Vela code generator.
//!
//! Every compile-time problem found after inference (incompatible overrides,
//! missing implementations, absent TL schema, non-deterministic generation)
//! is reported as a [`Diagnostic`] into a shared [`DiagnosticSink`]. The sink
//! doubles as the "compilation has failed" flag that the driver consults
//! before generation starts and before any output is written.
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] is type-level proof that at least one error reached
//! the sink:
//!
//! ```text
//! sink.emit(diagnostic);
//! sink.checkpoint()?; // Err(ErrorGuaranteed) once anything failed
//! ```

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod errors;
mod guarantee;
pub mod sink;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use errors::ErrorDocs;
pub use guarantee::ErrorGuaranteed;
pub use sink::DiagnosticSink;
