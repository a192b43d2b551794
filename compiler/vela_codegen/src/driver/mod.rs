//! Whole-program generation.
//!
//! ```text
//! ProgramGraph
//!     ↓  synthesize_virtual_methods   (dispatch tables)
//!     ↓  prepare_for_codegen          (files, dedup)
//!     ↓  CompilationContext::freeze
//!     ↓  root_commands → CodeGenTask → Scheduler
//! OutputSink → Vec<WriterData>
//! ```
//!
//! The diagnostic sink is consulted before generation starts and once all
//! tasks finished; nothing is returned for output if it recorded an error.

use std::sync::Arc;

use vela_diagnostic::{DiagnosticSink, ErrorGuaranteed};
use vela_dispatch::{synthesize_virtual_methods, SynthesisSummary};
use vela_ir::{CompilationContext, ProgramGraph, Settings};

use crate::commands::{
    ClassDeclaration, CodeGenRootCmd, CppMainFile, FunctionCpp, FunctionH, GlobalVarsMemoryStats,
    GlobalVarsReset, InitScriptsCpp, InterfaceDeclaration, LibHeaderH, LibHeaderTxt,
    LibVersionHFile, StaticLibraryRunGlobalHeaderH, VarsCpp,
};
use crate::output::{GenMode, OutputSink, WriterData};
use crate::prepare::{prepare_for_codegen, should_gen_function};
use crate::scheduler::{scheduler_for_jobs, Scheduler};
use crate::task::CodeGenTask;

/// Every root command for a prepared program, in a fixed order.
pub fn root_commands(context: &CompilationContext) -> Vec<Arc<dyn CodeGenRootCmd>> {
    let graph = context.graph();
    let settings = context.settings();
    let mut commands: Vec<Arc<dyn CodeGenRootCmd>> = Vec::new();

    let generated: Vec<_> = graph
        .function_ids()
        .filter(|&id| should_gen_function(graph.function(id)))
        .collect();
    let mut exported = Vec::new();
    for &function in &generated {
        commands.push(Arc::new(FunctionH { function }));
        commands.push(Arc::new(FunctionCpp { function }));
        if settings.static_lib_mode && graph.function(function).lib_export {
            exported.push(function);
        }
    }

    for class in graph.class_ids() {
        let data = graph.class(class);
        if data.is_builtin {
            continue;
        }
        if data.is_interface() {
            commands.push(Arc::new(InterfaceDeclaration { interface: class }));
        } else {
            commands.push(Arc::new(ClassDeclaration { class }));
        }
    }

    let globals: Vec<_> = graph.global_storage_vars().collect();
    commands.push(Arc::new(GlobalVarsReset { vars: globals.clone() }));
    if settings.enable_global_vars_memory_stats {
        commands.push(Arc::new(GlobalVarsMemoryStats { vars: globals.clone() }));
    }
    commands.push(Arc::new(InitScriptsCpp {
        main: graph.main_function(),
    }));
    commands.push(Arc::new(VarsCpp::new(globals, settings.globals_split_count)));

    if settings.static_lib_mode {
        for &function in &exported {
            commands.push(Arc::new(LibHeaderH { function }));
        }
        commands.push(Arc::new(LibHeaderTxt { exports: exported }));
        commands.push(Arc::new(StaticLibraryRunGlobalHeaderH));
    }
    commands.push(Arc::new(LibVersionHFile));
    if !settings.static_lib_mode {
        commands.push(Arc::new(CppMainFile));
    }

    tracing::debug!(
        commands = commands.len(),
        functions = generated.len(),
        "root commands built"
    );
    commands
}

/// Submit every root command and wait for all of them.
pub fn start_codegen(
    context: &Arc<CompilationContext>,
    diagnostics: &Arc<DiagnosticSink>,
    scheduler: &mut dyn Scheduler,
    mode: GenMode,
) -> Result<Arc<OutputSink>, ErrorGuaranteed> {
    let _span = tracing::info_span!("start_codegen", mode = ?mode).entered();
    diagnostics.checkpoint()?;

    let output = OutputSink::new();
    for command in root_commands(context) {
        let task = CodeGenTask::new(
            Arc::clone(context),
            Arc::clone(diagnostics),
            Arc::clone(&output),
            command,
        )
        .with_mode(mode);
        scheduler.submit(Box::new(task));
    }
    scheduler.execute();

    diagnostics.checkpoint()?;
    tracing::debug!(units = output.len(), "code generation finished");
    Ok(output)
}

/// Regenerate, in contents mode, the commands behind `changed` paths of a
/// previous hash-mode run. Only units at `changed` paths are returned.
pub fn regenerate_for_diff(
    context: &Arc<CompilationContext>,
    diagnostics: &Arc<DiagnosticSink>,
    scheduler: &mut dyn Scheduler,
    previous: &OutputSink,
    changed: &[String],
) -> Result<Vec<WriterData>, ErrorGuaranteed> {
    let _span = tracing::info_span!("regenerate_for_diff", changed = changed.len()).entered();
    let output = OutputSink::new();
    for command in previous.commands_for(changed.iter().map(String::as_str)) {
        let task = CodeGenTask::for_diff(
            Arc::clone(context),
            Arc::clone(diagnostics),
            Arc::clone(&output),
            command,
        );
        scheduler.submit(Box::new(task));
    }
    scheduler.execute();
    diagnostics.checkpoint()?;

    let mut units = output.drain_sorted();
    units.retain(|unit| changed.contains(&unit.path()));
    Ok(units)
}

/// Result of [`compile_program`].
#[derive(Debug)]
pub struct Generated {
    pub context: Arc<CompilationContext>,
    /// Sink of the run, kept for a later diff re-run.
    pub output: Arc<OutputSink>,
    /// Every unit, sorted by path.
    pub units: Vec<WriterData>,
    pub synthesis: SynthesisSummary,
}

/// Synthesize dispatch, prepare, freeze and generate every unit.
pub fn compile_program(
    mut graph: ProgramGraph,
    settings: Settings,
    diagnostics: &Arc<DiagnosticSink>,
    mode: GenMode,
) -> Result<Generated, ErrorGuaranteed> {
    let synthesis = synthesize_virtual_methods(&mut graph, diagnostics);
    diagnostics.checkpoint()?;
    prepare_for_codegen(&mut graph);

    let mut scheduler = scheduler_for_jobs(settings.jobs);
    let context = CompilationContext::freeze(graph, settings);
    let output = start_codegen(&context, diagnostics, scheduler.as_mut(), mode)?;
    let units = output.drain_sorted();
    Ok(Generated {
        context,
        output,
        units,
        synthesis,
    })
}

#[cfg(test)]
mod tests;
