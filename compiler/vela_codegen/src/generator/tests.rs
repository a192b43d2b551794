use pretty_assertions::assert_eq;
use vela_diagnostic::DiagnosticSink;
use vela_ir::{stable_hash, CompilationContext, ProgramGraph, Settings};

use super::*;

fn context() -> std::sync::Arc<CompilationContext> {
    CompilationContext::freeze(ProgramGraph::new(), Settings::default())
}

fn write_sample(gen: &mut CodeGenerator<'_>) {
    gen.open_file("o_1", "sample.cpp");
    gen.include_runtime();
    gen.newline();
    gen.open_block("void f()");
    gen.writeln("return;");
    gen.close_block("");
    gen.comment("Does nothing.");
    gen.close_file();
}

const SAMPLE: &str = "#include \"runtime-headers.h\"\n\nvoid f() {\n  return;\n}\n";

#[test]
fn contents_mode_keeps_text_and_comments() {
    let context = context();
    let sink = DiagnosticSink::new();
    let mut gen = CodeGenerator::new(&context, &sink, GenMode::Contents);
    write_sample(&mut gen);
    let units = gen.finish();

    assert_eq!(units.len(), 1);
    assert_eq!(units[0].path(), "o_1/sample.cpp");
    assert_eq!(units[0].kind, UnitKind::Source);
    assert_eq!(
        units[0].payload,
        Payload::Contents {
            text: SAMPLE.to_string(),
            comments: vec!["Does nothing.".to_string()],
        }
    );
}

#[test]
fn hash_mode_records_hash_of_the_same_text() {
    let context = context();
    let sink = DiagnosticSink::new();
    let mut gen = CodeGenerator::new(&context, &sink, GenMode::Hashes);
    write_sample(&mut gen);
    let units = gen.finish();

    assert_eq!(units[0].payload, Payload::Hash(stable_hash(SAMPLE.as_bytes())));
    assert_eq!(units[0].text(), None);
}

#[test]
fn includes_are_recorded_per_file() {
    let context = context();
    let sink = DiagnosticSink::new();
    let mut gen = CodeGenerator::new(&context, &sink, GenMode::Contents);
    gen.open_file("", "unit.h");
    gen.write_includes(&CompiledIncludes {
        lib_headers: vec!["geo/dist.h".to_string()],
        class_headers: vec!["o_3/C@Dog.h".to_string()],
        forward_declarations: vec!["C$Cat".to_string()],
        internal_headers: vec!["o_4/f.h".to_string()],
    });
    let units = gen.finish();

    let unit = &units[0];
    assert_eq!(unit.kind, UnitKind::Header);
    assert_eq!(unit.lib_includes, vec!["geo/dist.h".to_string()]);
    assert_eq!(unit.includes, vec!["o_3/C@Dog.h".to_string(), "o_4/f.h".to_string()]);
    assert_eq!(unit.forward_declarations, vec!["C$Cat".to_string()]);
    assert_eq!(
        unit.text(),
        Some(
            "#include \"geo/dist.h\"\n#include \"o_3/C@Dog.h\"\nstruct C$Cat;\n#include \"o_4/f.h\"\n"
        )
    );
}

#[test]
fn opening_a_file_closes_the_previous_one() {
    let context = context();
    let sink = DiagnosticSink::new();
    let mut gen = CodeGenerator::new(&context, &sink, GenMode::Contents);
    gen.open_file("", "a.h");
    gen.indent();
    gen.open_file("", "b.txt");
    gen.writeln("flat");
    let units = gen.finish();

    assert_eq!(units.len(), 2);
    assert_eq!(units[1].kind, UnitKind::Text);
    assert_eq!(units[1].text(), Some("flat\n"));
}

#[test]
fn writes_without_open_file_are_dropped() {
    let context = context();
    let sink = DiagnosticSink::new();
    let mut gen = CodeGenerator::new(&context, &sink, GenMode::Contents);
    gen.writeln("lost");
    assert!(gen.finish().is_empty());
}
