//! Virtual method dispatch for the Vela code generator.
//!
//! After inference, every abstract or overridden method still has a single
//! declaration but many possible implementations. This crate:
//!
//! - validates each override against the method it implements (arity,
//!   covariant return, contravariant parameters), see [`OverrideChecker`];
//! - replaces the body of each virtual method with a [`DispatchTable`]
//!   keyed by the receiver's class hash, see [`synthesize_virtual_methods`].
//!
//! Problems are reported into a [`DiagnosticSink`]; synthesis keeps going
//! past them so one run surfaces every error.
//!
//! [`DispatchTable`]: vela_ir::DispatchTable
//! [`DiagnosticSink`]: vela_diagnostic::DiagnosticSink

mod overrides;
mod synth;
mod variance;

#[cfg(test)]
mod test_helpers;

pub use overrides::{arity_compatible, OverrideChecker};
pub use synth::{
    is_dispatch_point, synthesize_virtual_methods, Synthesis, SynthesisSummary,
    VirtualMethodSynthesizer,
};
pub use variance::{param_hints_compatible, return_hints_compatible};
