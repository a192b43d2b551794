//! Command handlers for the velac CLI.
//!
//! Each submodule implements one command. Loading a program and rendering
//! the diagnostic sink are shared and live here.

use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use vela_codegen::WriteError;
use vela_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use vela_diagnostic::{DiagnosticSink, ErrorGuaranteed};
use vela_ir::{LoadError, ProgramGraph};

mod check;
mod explain;
pub mod gen;

pub use check::{check_file, check_program, CheckReport};
pub use explain::explain_error;
pub use gen::{gen_file, gen_program, parse_gen_options, GenOptions, GenReport};

/// Why a command stopped. Compiler diagnostics are already in the sink
/// when this is `Compile`.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("cannot read `{path}`: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot load `{path}`: {source}")]
    Load { path: PathBuf, source: LoadError },
    #[error("compilation failed")]
    Compile(#[from] ErrorGuaranteed),
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Read and link a program graph from its JSON form.
pub fn load_program(path: &Path) -> Result<ProgramGraph, CommandError> {
    let text = fs::read_to_string(path).map_err(|source| CommandError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ProgramGraph::from_json(&text).map_err(|source| CommandError::Load {
        path: path.to_path_buf(),
        source,
    })
}

/// Print everything the sink holds, sorted, followed by a summary.
pub(crate) fn report_diagnostics(diagnostics: &DiagnosticSink) {
    let errors = diagnostics.error_count();
    let warnings = diagnostics.warning_count();
    let reported = diagnostics.take_sorted();
    if reported.is_empty() {
        return;
    }
    let is_tty = io::stderr().is_terminal();
    let mut emitter = TerminalEmitter::stderr(ColorMode::Auto, is_tty);
    emitter.emit_all(&reported);
    emitter.emit_summary(errors, warnings);
    emitter.flush();
}

/// Report a failed command and exit non-zero.
pub(crate) fn fail(diagnostics: &DiagnosticSink, err: &CommandError) -> ! {
    report_diagnostics(diagnostics);
    if !matches!(err, CommandError::Compile(_)) {
        eprintln!("error: {err}");
    }
    std::process::exit(1);
}
