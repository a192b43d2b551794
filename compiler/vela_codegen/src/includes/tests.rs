use pretty_assertions::assert_eq;
use vela_diagnostic::{DiagnosticSink, ErrorCode};
use vela_ir::{LibData, Settings, TypeData, VarKind};

use super::*;
use crate::prepare::subdir_for;
use crate::test_helpers::Program;

fn class_header(name: &str) -> String {
    format!("{}/C@{name}.h", subdir_for("zoo.php"))
}

fn fn_header(stem: &str) -> String {
    format!("{}/{stem}.h", subdir_for("lib.php"))
}

#[test]
fn body_depends_collects_callees_classes_and_var_types() {
    let mut p = Program::new();
    let dog = p.class("Dog", None, &[]);
    let bowl = p.class("Bowl", None, &[]);
    let helper = p.function("helper", |_| {});
    let native = p.extern_function("strlen");
    let local = p.var("pet", VarKind::Local, TypeData::array(TypeData::instance(bowl)));
    let caller = p.function("caller", |f| {
        f.dep = vec![helper, native];
        f.class_dep = vec![dog];
        f.local_vars = vec![local];
    });
    let context = p.prepared(Settings::default());

    let sink = DiagnosticSink::new();
    let mut collector = IncludesCollector::new(context.graph(), context.settings(), &sink);
    collector.add_function_body_depends(caller);
    let compiled = collector.compile();

    assert!(!sink.has_errors());
    assert_eq!(compiled.lib_headers, Vec::<String>::new());
    assert_eq!(compiled.class_headers, vec![class_header("Bowl"), class_header("Dog")]);
    assert_eq!(compiled.internal_headers, vec![fn_header("helper")]);
}

#[test]
fn recursion_does_not_include_itself() {
    let mut p = Program::new();
    let fact = p.function("fact", |_| {});
    p.graph.function_mut(fact).dep = vec![fact];
    let context = p.prepared(Settings::default());

    let sink = DiagnosticSink::new();
    let mut collector = IncludesCollector::new(context.graph(), context.settings(), &sink);
    collector.add_function_body_depends(fact);
    assert!(collector.compile().is_empty());
}

#[test]
fn imported_callee_goes_to_lib_headers() {
    let mut p = Program::new();
    let lib = p.graph.add_lib(LibData {
        name: "geo".to_string(),
        headers_dir: "libs/geo/headers/".to_string(),
    });
    let distance = p.function("geo_distance", |f| f.imported_from_lib = Some(lib));
    let caller = p.function("caller", |f| f.dep = vec![distance]);
    let context = p.prepared(Settings::default());

    let sink = DiagnosticSink::new();
    let mut collector = IncludesCollector::new(context.graph(), context.settings(), &sink);
    collector.add_function_body_depends(caller);
    let compiled = collector.compile();
    assert_eq!(compiled.lib_headers, vec!["libs/geo/headers/geo_distance.h".to_string()]);
    assert!(compiled.internal_headers.is_empty());
}

#[test]
fn compile_orders_lib_class_forward_internal() {
    let mut p = Program::new();
    let zebra = p.class("Zebra", None, &[]);
    let ant = p.class("Ant", None, &[]);
    let owl = p.class("Owl", None, &[]);
    let context = p.prepared(Settings::default());

    let sink = DiagnosticSink::new();
    let mut collector = IncludesCollector::new(context.graph(), context.settings(), &sink);
    collector.add_raw_filename_include("z/internal.h");
    collector.add_raw_filename_include("a/internal.h");
    collector.add_class_include(zebra);
    collector.add_class_include(ant);
    collector.add_class_forward_declaration(owl);
    collector.lib_headers.insert("lib/x.h".to_string());

    assert_eq!(
        collector.compile(),
        CompiledIncludes {
            lib_headers: vec!["lib/x.h".to_string()],
            class_headers: vec![class_header("Ant"), class_header("Zebra")],
            forward_declarations: vec!["C$Owl".to_string()],
            internal_headers: vec!["a/internal.h".to_string(), "z/internal.h".to_string()],
        }
    );
}

#[test]
fn builtin_classes_are_never_included() {
    let mut p = Program::new();
    let exception = p.class("Exception", None, &[]);
    p.graph.class_mut(exception).is_builtin = true;
    let context = p.prepared(Settings::default());

    let sink = DiagnosticSink::new();
    let mut collector = IncludesCollector::new(context.graph(), context.settings(), &sink);
    collector.add_class_include(exception);
    assert!(collector.compile().class_headers.is_empty());
}

#[test]
fn base_classes_are_parent_and_interfaces() {
    let mut p = Program::new();
    let pet = p.interface("Pet");
    let animal = p.class("Animal", None, &[]);
    let dog = p.class("Dog", Some(animal), &[pet]);
    let context = p.prepared(Settings::default());

    let sink = DiagnosticSink::new();
    let mut collector = IncludesCollector::new(context.graph(), context.settings(), &sink);
    collector.add_base_classes_include(dog);
    assert_eq!(
        collector.compile().class_headers,
        vec![class_header("Animal"), class_header("Pet")]
    );
}

#[test]
fn next_block_suppresses_everything_already_emitted() {
    let mut p = Program::new();
    let dog = p.class("Dog", None, &[]);
    let cat = p.class("Cat", None, &[]);
    let context = p.prepared(Settings::default());

    let sink = DiagnosticSink::new();
    let mut collector = IncludesCollector::new(context.graph(), context.settings(), &sink);
    collector.add_class_include(dog);
    collector.add_raw_filename_include("first.h");
    collector.add_class_forward_declaration(cat);
    let first = collector.compile();
    assert_eq!(first.class_headers.len(), 1);
    collector.start_next_block();

    collector.add_class_include(dog);
    collector.add_raw_filename_include("first.h");
    collector.add_class_forward_declaration(cat);
    collector.add_raw_filename_include("second.h");
    let second = collector.compile();
    assert!(second.class_headers.is_empty());
    assert!(second.forward_declarations.is_empty());
    assert_eq!(second.internal_headers, vec!["second.h".to_string()]);
    collector.start_next_block();

    // a class included earlier needs no forward declaration later
    collector.add_class_forward_declaration(dog);
    collector.add_raw_filename_include("second.h");
    assert!(collector.compile().is_empty());
}

#[test]
fn tl_common_header_requires_schema() {
    let mut p = Program::new();
    let rpc = p.function("rpc_call", |f| f.needs_tl_common_h = true);
    let context = p.prepared(Settings::default());

    let sink = DiagnosticSink::new();
    let mut collector = IncludesCollector::new(context.graph(), context.settings(), &sink);
    collector.add_function_body_depends(rpc);
    let diagnostics = sink.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, ErrorCode::E5001);
    assert_eq!(diagnostics[0].message, "tl schema not given as -T option for compilation");
    assert_eq!(collector.compile().internal_headers, vec![TL_COMMON_HEADER.to_string()]);
}

#[test]
fn tl_common_header_with_schema() {
    let mut p = Program::new();
    let rpc = p.function("rpc_call", |f| f.needs_tl_common_h = true);
    let context = p.prepared(Settings::default().with_tl_schema_file("schema.tlo"));

    let sink = DiagnosticSink::new();
    let mut collector = IncludesCollector::new(context.graph(), context.settings(), &sink);
    collector.add_function_body_depends(rpc);
    assert!(!sink.has_errors());
    assert_eq!(collector.compile().internal_headers, vec![TL_COMMON_HEADER.to_string()]);
}

#[test]
fn callee_without_files_is_reported() {
    let mut p = Program::new();
    // declared only, so preparation assigns no header
    let declared = p.function("declared", |f| f.body = vela_ir::FunctionBody::Empty);
    let caller = p.function("caller", |f| f.dep = vec![declared]);
    let context = p.prepared(Settings::default());

    let sink = DiagnosticSink::new();
    let mut collector = IncludesCollector::new(context.graph(), context.settings(), &sink);
    collector.add_function_body_depends(caller);
    assert_eq!(
        sink.diagnostics().into_iter().map(|d| d.code).collect::<Vec<_>>(),
        vec![ErrorCode::E5002]
    );
    assert!(collector.compile().internal_headers.is_empty());
}

#[test]
fn signature_depends_cover_params_and_return() {
    let mut p = Program::new();
    let dog = p.class("Dog", None, &[]);
    let bone = p.class("Bone", None, &[]);
    let feed = p.function("feed", |f| {
        f.params.push(vela_ir::Param::new("dog").with_hint(vela_ir::TypeHint::Instance(dog)));
        f.return_type = TypeData::instance(bone).or_null();
    });
    let context = p.prepared(Settings::default());

    let sink = DiagnosticSink::new();
    let mut collector = IncludesCollector::new(context.graph(), context.settings(), &sink);
    collector.add_function_signature_depends(feed);
    assert_eq!(
        collector.compile().class_headers,
        vec![class_header("Bone"), class_header("Dog")]
    );
}
