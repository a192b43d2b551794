//! Translation unit generation for Vela.
//!
//! Turns a prepared program graph into a tree of headers and sources:
//!
//! - [`prepare`]: assigns file placement once, single-threaded
//! - [`commands`]: root commands, each writing a fixed set of files
//! - [`includes`]: per-unit include and forward declaration collection
//! - [`task`] and [`scheduler`]: commands as units of parallel work
//! - [`output`]: the shared sink of [`WriterData`] records
//! - [`files`]: writing contents and the hash manifest to disk
//! - [`driver`]: the whole pipeline
//!
//! Generation is idempotent: compiling a command twice against fresh
//! generators yields identical units.

pub mod commands;
pub mod driver;
pub mod files;
pub mod generator;
pub mod includes;
pub mod output;
pub mod prepare;
pub mod scheduler;
pub mod task;

#[cfg(test)]
mod test_helpers;

pub use commands::CodeGenRootCmd;
pub use driver::{compile_program, regenerate_for_diff, root_commands, start_codegen, Generated};
pub use files::{HashManifest, WriteError};
pub use generator::CodeGenerator;
pub use includes::{CompiledIncludes, IncludesCollector};
pub use output::{GenMode, OutputSink, Payload, UnitKind, WriterData};
pub use prepare::{prepare_for_codegen, should_gen_function};
pub use scheduler::{RayonScheduler, Scheduler, SequentialScheduler, Task};
pub use task::{run_command, CodeGenTask};
