use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use vela_diagnostic::{DiagnosticSink, ErrorCode};
use vela_ir::{CompilationContext, ProgramGraph, Settings};

use super::*;
use crate::commands::CppMainFile;
use crate::output::Payload;

/// Writes a different file body on every run.
#[derive(Debug, Default)]
struct Counter {
    runs: AtomicUsize,
}

impl CodeGenRootCmd for Counter {
    fn description(&self) -> String {
        "Counter".to_string()
    }

    fn compile(&self, gen: &mut CodeGenerator<'_>) {
        let run = self.runs.fetch_add(1, Ordering::SeqCst);
        gen.open_file("", "counter.txt");
        gen.writeln(&run.to_string());
        gen.close_file();
    }
}

fn context(settings: Settings) -> Arc<CompilationContext> {
    CompilationContext::freeze(ProgramGraph::new(), settings)
}

fn execute(
    context: Arc<CompilationContext>,
    command: Arc<dyn CodeGenRootCmd>,
    diff: bool,
) -> (Arc<OutputSink>, Arc<DiagnosticSink>) {
    let diagnostics = Arc::new(DiagnosticSink::new());
    let output = OutputSink::new();
    let task = if diff {
        CodeGenTask::for_diff(context, Arc::clone(&diagnostics), Arc::clone(&output), command)
    } else {
        CodeGenTask::new(context, Arc::clone(&diagnostics), Arc::clone(&output), command)
    };
    Box::new(task).execute();
    (output, diagnostics)
}

#[test]
fn task_extends_the_output_with_hashes() {
    let (output, diagnostics) = execute(context(Settings::default()), Arc::new(CppMainFile), false);
    assert!(!diagnostics.has_errors());
    let units = output.drain_sorted();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].path(), "main.cpp");
    assert!(matches!(units[0].payload, Payload::Hash(_)));
}

#[test]
fn diff_task_keeps_contents() {
    let (output, _) = execute(context(Settings::default()), Arc::new(CppMainFile), true);
    let units = output.drain_sorted();
    assert!(units[0].text().is_some_and(|t| t.contains("run_main")));
}

#[test]
fn deterministic_command_passes_idempotence_check() {
    let settings = Settings::default().with_verify_idempotence(true);
    let (output, diagnostics) = execute(context(settings), Arc::new(CppMainFile), false);
    assert!(!diagnostics.has_errors());
    assert_eq!(output.len(), 1);
}

#[test]
fn unstable_command_is_reported() {
    let settings = Settings::default().with_verify_idempotence(true);
    let (output, diagnostics) = execute(context(settings), Arc::new(Counter::default()), false);

    let reported = diagnostics.diagnostics();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].code, ErrorCode::E9002);
    assert_eq!(reported[0].message, "code generation of Counter is not idempotent");
    // the first run's units are still recorded
    assert_eq!(output.len(), 1);
}

#[test]
fn check_is_off_by_default() {
    let (_, diagnostics) = execute(context(Settings::default()), Arc::new(Counter::default()), false);
    assert!(!diagnostics.has_errors());
}

#[test]
fn run_command_honors_mode() {
    let context = context(Settings::default());
    let sink = DiagnosticSink::new();
    let hashed = run_command(&context, &sink, &CppMainFile, GenMode::Hashes);
    let contents = run_command(&context, &sink, &CppMainFile, GenMode::Contents);
    assert_eq!(hashed[0].content_hash(), contents[0].content_hash());
    assert_eq!(hashed[0].text(), None);
}
