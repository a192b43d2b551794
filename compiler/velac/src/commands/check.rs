//! The `check` command: dispatch synthesis and override validation without
//! writing anything.

use std::path::Path;

use vela_diagnostic::DiagnosticSink;
use vela_dispatch::{synthesize_virtual_methods, SynthesisSummary};

use super::{fail, load_program, report_diagnostics, CommandError};

#[derive(Debug)]
pub struct CheckReport {
    pub classes: usize,
    pub functions: usize,
    pub synthesis: SynthesisSummary,
}

pub fn check_program(path: &Path, diagnostics: &DiagnosticSink) -> Result<CheckReport, CommandError> {
    let _span = tracing::info_span!("check", path = %path.display()).entered();
    let mut graph = load_program(path)?;
    let synthesis = synthesize_virtual_methods(&mut graph, diagnostics);
    diagnostics.checkpoint()?;
    Ok(CheckReport {
        classes: graph.class_ids().count(),
        functions: graph.function_ids().count(),
        synthesis,
    })
}

pub fn check_file(path: &str) {
    let diagnostics = DiagnosticSink::new();
    match check_program(Path::new(path), &diagnostics) {
        Ok(report) => {
            // warnings only
            report_diagnostics(&diagnostics);
            println!(
                "OK: {path} ({} classes, {} functions, {} dispatch tables)",
                report.classes, report.functions, report.synthesis.dispatch_tables
            );
        }
        Err(err) => fail(&diagnostics, &err),
    }
}
