//! A root command packaged as a schedulable unit of work.
//!
//! Running a command has no effect outside the units it returns, so a task
//! may run on any worker in any order. With idempotence checking enabled
//! the command runs twice against fresh generators and both results must
//! match.

use std::sync::Arc;

use vela_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use vela_ir::CompilationContext;

use crate::commands::CodeGenRootCmd;
use crate::generator::CodeGenerator;
use crate::output::{GenMode, OutputSink, WriterData};
use crate::scheduler::Task;

/// Run `command` once against a fresh generator.
pub fn run_command(
    context: &CompilationContext,
    diagnostics: &DiagnosticSink,
    command: &dyn CodeGenRootCmd,
    mode: GenMode,
) -> Vec<WriterData> {
    let mut gen = CodeGenerator::new(context, diagnostics, mode);
    command.compile(&mut gen);
    gen.finish()
}

pub struct CodeGenTask {
    context: Arc<CompilationContext>,
    diagnostics: Arc<DiagnosticSink>,
    output: Arc<OutputSink>,
    command: Arc<dyn CodeGenRootCmd>,
    mode: GenMode,
}

impl CodeGenTask {
    pub fn new(
        context: Arc<CompilationContext>,
        diagnostics: Arc<DiagnosticSink>,
        output: Arc<OutputSink>,
        command: Arc<dyn CodeGenRootCmd>,
    ) -> Self {
        CodeGenTask {
            context,
            diagnostics,
            output,
            command,
            mode: GenMode::Hashes,
        }
    }

    /// Re-run of an already generated command in contents mode, for files
    /// whose hash changed since the previous build.
    pub fn for_diff(
        context: Arc<CompilationContext>,
        diagnostics: Arc<DiagnosticSink>,
        output: Arc<OutputSink>,
        command: Arc<dyn CodeGenRootCmd>,
    ) -> Self {
        CodeGenTask {
            mode: GenMode::Contents,
            ..Self::new(context, diagnostics, output, command)
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: GenMode) -> Self {
        self.mode = mode;
        self
    }

    fn verify_idempotence(&self, first: &[WriterData]) {
        let second = run_command(&self.context, &self.diagnostics, &*self.command, self.mode);
        if first == second.as_slice() {
            return;
        }
        let differing = first
            .iter()
            .zip(&second)
            .find(|(a, b)| a != b)
            .map(|(a, _)| a.path())
            .or_else(|| first.get(second.len()).or_else(|| second.get(first.len())).map(WriterData::path))
            .unwrap_or_default();
        self.diagnostics.emit(
            Diagnostic::error(ErrorCode::E9002)
                .with_message(format!(
                    "code generation of {} is not idempotent",
                    self.command.description()
                ))
                .with_label(differing, "differs between two runs")
                .with_note(format!("first run: {} units, second run: {} units", first.len(), second.len())),
        );
    }
}

impl Task for CodeGenTask {
    fn description(&self) -> String {
        self.command.description()
    }

    fn execute(self: Box<Self>) {
        let units = run_command(&self.context, &self.diagnostics, &*self.command, self.mode);
        if self.context.settings().verify_idempotence {
            self.verify_idempotence(&units);
        }
        tracing::trace!(
            command = %self.command.description(),
            units = units.len(),
            mode = ?self.mode,
            "command compiled"
        );
        self.output.extend(&self.command, units);
    }
}

#[cfg(test)]
mod tests;
