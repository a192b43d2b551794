#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::{ClassId, FunctionBody, PrimitiveType, TypeData, TypeHint, VarKind};

use super::*;
use crate::prepare::subdir_for;
use crate::scheduler::SequentialScheduler;
use crate::test_helpers::Program;

fn descriptions(context: &CompilationContext) -> Vec<String> {
    root_commands(context).iter().map(|c| c.description()).collect()
}

fn small_program() -> Program {
    let mut p = Program::new();
    p.interface("Pet");
    p.class("Dog", None, &[]);
    p.function("helper", |f| f.lib_export = true);
    p.main(|_| {});
    p.var("counter", VarKind::Global, TypeData::primitive(PrimitiveType::Int));
    p
}

#[test]
fn executable_commands_in_order() {
    let context = small_program().prepared(Settings::default());
    assert_eq!(
        descriptions(&context),
        vec![
            "FunctionH(0)",
            "FunctionCpp(0)",
            "FunctionH(1)",
            "FunctionCpp(1)",
            "InterfaceDeclaration(0)",
            "ClassDeclaration(1)",
            "GlobalVarsReset",
            "InitScriptsCpp",
            "VarsCpp(1 parts)",
            "LibVersionHFile",
            "CppMainFile",
        ]
    );
}

#[test]
fn static_library_commands() {
    let settings = Settings::default()
        .with_static_lib("pets")
        .with_global_vars_memory_stats(true);
    let context = small_program().prepared(settings);
    let commands = descriptions(&context);

    assert_eq!(
        commands[6..].to_vec(),
        vec![
            "GlobalVarsReset",
            "GlobalVarsMemoryStats",
            "InitScriptsCpp",
            "VarsCpp(1 parts)",
            "LibHeaderH(0)",
            "LibHeaderTxt",
            "StaticLibraryRunGlobalHeaderH",
            "LibVersionHFile",
        ]
    );
}

/// `Animal::speak` is abstract and three classes implement it.
fn zoo() -> (ProgramGraph, ClassId) {
    let mut p = Program::new();
    let animal = p.class("Animal", None, &[]);
    p.graph.class_mut(animal).is_abstract = true;
    p.method(animal, "speak", |f| {
        f.is_abstract = true;
        f.is_virtual_method = true;
        f.body = FunctionBody::Empty;
    });
    for name in ["Dog", "Cat", "Cow"] {
        let class = p.class(name, Some(animal), &[]);
        p.method(class, "speak", |_| {});
    }
    p.main(|_| {});
    (p.graph, animal)
}

#[test]
fn whole_program_gets_a_dispatcher() {
    let (graph, _) = zoo();
    let diagnostics = Arc::new(DiagnosticSink::new());
    let generated = compile_program(graph, Settings::default(), &diagnostics, GenMode::Contents).unwrap();

    assert!(!diagnostics.has_errors());
    assert_eq!(generated.synthesis.dispatch_tables, 1);
    assert_eq!(generated.synthesis.cases, 3);

    let dispatcher = format!("{}/Animal@@speak.cpp", subdir_for("zoo.php"));
    let text = generated
        .units
        .iter()
        .find(|u| u.path() == dispatcher)
        .and_then(WriterData::text)
        .unwrap();
    assert_eq!(text.matches("    case static_cast<int32_t>(").count(), 3);
    assert!(text.contains("return f$Cow$$speak(instance_cast<C$Cow>(v$this));"));

    let paths: Vec<_> = generated.units.iter().map(WriterData::path).collect();
    for expected in ["main.cpp", "init_scripts.cpp", "globals/vars.h", "globals/vars0.cpp"] {
        assert!(paths.contains(&expected.to_string()), "missing {expected}");
    }
    let mut sorted = paths.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted, paths);
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let run = |jobs| {
        let (graph, _) = zoo();
        let diagnostics = Arc::new(DiagnosticSink::new());
        let settings = Settings::default().with_jobs(jobs).with_verify_idempotence(true);
        compile_program(graph, settings, &diagnostics, GenMode::Hashes).unwrap().units
    };
    assert_eq!(run(1), run(4));
}

#[test]
fn synthesis_errors_stop_generation() {
    let mut p = Program::new();
    let shape = p.interface("Shape");
    p.method(shape, "area", |f| {
        f.is_abstract = true;
        f.is_virtual_method = true;
        f.body = FunctionBody::Empty;
        f.return_type_hint = Some(TypeHint::Primitive(PrimitiveType::Float));
    });
    let square = p.class("Square", None, &[shape]);
    p.method(square, "area", |f| {
        f.return_type_hint = Some(TypeHint::Primitive(PrimitiveType::String));
    });

    let diagnostics = Arc::new(DiagnosticSink::new());
    let result = compile_program(p.graph, Settings::default(), &diagnostics, GenMode::Hashes);
    assert!(result.is_err());
    assert!(diagnostics
        .diagnostics()
        .iter()
        .any(|d| d.code == ErrorCode::E3001));
}

#[test]
fn unimplemented_interface_method_is_still_callable() {
    let mut p = Program::new();
    let shape = p.interface("Shape");
    let area = p.method(shape, "area", |f| {
        f.is_abstract = true;
        f.is_virtual_method = true;
        f.body = FunctionBody::Empty;
    });
    p.main(|f| f.dep = vec![area]);

    let diagnostics = Arc::new(DiagnosticSink::new());
    let generated = compile_program(p.graph, Settings::default(), &diagnostics, GenMode::Contents).unwrap();
    assert!(!diagnostics.has_errors());
    assert_eq!(generated.synthesis.dispatch_tables, 0);

    let header = format!("{}/Shape@@area.h", subdir_for("zoo.php"));
    let paths: Vec<_> = generated.units.iter().map(WriterData::path).collect();
    assert!(paths.contains(&header));
    assert!(paths.contains(&format!("{}/Shape@@area.cpp", subdir_for("zoo.php"))));

    let main_source = format!("{}/main.cpp", subdir_for("index.php"));
    let text = generated
        .units
        .iter()
        .find(|u| u.path() == main_source)
        .and_then(WriterData::text)
        .unwrap();
    assert!(text.contains(&format!("#include \"{header}\"")));
}

#[test]
fn start_refuses_after_earlier_errors() {
    let context = small_program().prepared(Settings::default());
    let diagnostics = Arc::new(DiagnosticSink::new());
    let _guaranteed = diagnostics.emit_error(Diagnostic::error(ErrorCode::E9001).with_message("earlier failure"));
    let mut scheduler = SequentialScheduler::new();

    assert!(start_codegen(&context, &diagnostics, &mut scheduler, GenMode::Hashes).is_err());
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn diff_rerun_returns_only_changed_units() {
    let (graph, _) = zoo();
    let diagnostics = Arc::new(DiagnosticSink::new());
    let generated = compile_program(graph, Settings::default(), &diagnostics, GenMode::Hashes).unwrap();

    let changed = vec!["main.cpp".to_string(), "globals/vars0.cpp".to_string()];
    let mut scheduler = SequentialScheduler::new();
    let units = regenerate_for_diff(
        &generated.context,
        &diagnostics,
        &mut scheduler,
        &generated.output,
        &changed,
    )
    .unwrap();

    let paths: Vec<_> = units.iter().map(WriterData::path).collect();
    assert_eq!(paths, vec!["globals/vars0.cpp", "main.cpp"]);
    for unit in &units {
        let hashed = generated.units.iter().find(|u| u.path() == unit.path()).unwrap();
        assert!(unit.text().is_some());
        assert_eq!(unit.content_hash(), hashed.content_hash());
    }
}
