//! Vela runtime library.
//!
//! The centerpiece is [`Array`], the associative array every generated
//! program leans on: a value-semantic handle over reference-counted,
//! copy-on-write storage that is either a dense vector (keys `0..n`) or an
//! insertion-ordered hash map with chained buckets.
//!
//! Runtime failures that the source language treats as fatal (popping an
//! empty array, overflowing a hash table) go through [`fatal`], which
//! records the message in thread-local panic state and unwinds with a
//! [`RuntimeFatal`] payload that [`run_guarded`] turns back into a value.
//!
//! Arrays use non-atomic reference counts and are therefore `!Send`.

mod array;
mod key;
mod mixed;
mod panic;
mod value;

pub use array::{Array, ArraySize, Iter, OverwriteElement};
pub use key::{ArrayKey, IntoArrayKey, KeyRef, NormalizedKey};
pub use mixed::Mixed;
pub use panic::{did_panic, fatal, panic_message, reset_panic_state, run_guarded, RuntimeFatal};
pub use value::RuntimeValue;
