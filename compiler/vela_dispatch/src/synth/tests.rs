use pretty_assertions::assert_eq;
use vela_diagnostic::{DiagnosticSink, ErrorCode};
use vela_ir::{ClassHash, FunctionBody, Param, PrimitiveType, TypeHint};

use super::*;
use crate::test_helpers::{codes, messages, Hierarchy};

fn table(synthesis: Synthesis) -> DispatchTable {
    match synthesis {
        Synthesis::Dispatch(table) => table,
        other => panic!("expected a dispatch table, got {other:?}"),
    }
}

#[test]
fn abstract_method_with_three_implementations() {
    let mut h = Hierarchy::new();
    let animal = h.abstract_class("Animal", None, &[]);
    let speak = h.abstract_method(animal, "speak");
    let mut expected = Vec::new();
    for name in ["Dog", "Cat", "Cow"] {
        let class = h.class(name, Some(animal), &[]);
        let method = h.method(class, "speak");
        expected.push((ClassHash::of_name(name), class, method));
    }

    let sink = DiagnosticSink::new();
    let table = table(VirtualMethodSynthesizer::new(&h.graph, &sink).synthesize(speak));

    assert!(!sink.has_errors());
    let got: Vec<_> = table
        .cases
        .iter()
        .map(|c| (c.class_hash, c.class, c.target))
        .collect();
    assert_eq!(got, expected);
    assert_eq!(table.default_message, "call method(Animal::speak) on null object");
}

#[test]
fn tables_are_installed_into_the_graph() {
    let mut h = Hierarchy::new();
    let animal = h.abstract_class("Animal", None, &[]);
    let speak = h.abstract_method(animal, "speak");
    for name in ["Dog", "Cat"] {
        let class = h.class(name, Some(animal), &[]);
        h.method(class, "speak");
    }
    let lonely = h.interface("Lonely", &[]);
    h.abstract_method(lonely, "wait");

    let sink = DiagnosticSink::new();
    let summary = synthesize_virtual_methods(&mut h.graph, &sink);

    assert_eq!(
        summary,
        SynthesisSummary {
            dispatch_tables: 1,
            cases: 2,
            empty: 0,
            checked_only: 0,
        }
    );
    let function = h.graph.function(speak);
    assert_eq!(function.kind, FunctionKind::Local);
    let FunctionBody::Dispatch(table) = &function.body else {
        panic!("body was not replaced");
    };
    let dog_hash = ClassHash::of_name("Dog");
    assert_eq!(
        table.lookup(dog_hash).map(|c| h.graph.class(c.class).name.as_str()),
        Some("Dog")
    );
    assert!(table.lookup(ClassHash::of_name("Animal")).is_none());
    assert_eq!(function.dep.len(), 2);
    assert_eq!(function.class_dep.len(), 2);
}

#[test]
fn no_inheritors_leaves_method_alone() {
    let mut h = Hierarchy::new();
    let iface = h.interface("I", &[]);
    let run = h.abstract_method(iface, "run");

    let sink = DiagnosticSink::new();
    let result = VirtualMethodSynthesizer::new(&h.graph, &sink).synthesize(run);
    assert_eq!(result, Synthesis::NoInheritors);
}

#[test]
fn interface_without_concrete_implementations_is_empty() {
    let mut h = Hierarchy::new();
    let iface = h.interface("I", &[]);
    let run = h.abstract_method(iface, "run");
    h.abstract_class("Partial", None, &[iface]);

    let sink = DiagnosticSink::new();
    let result = VirtualMethodSynthesizer::new(&h.graph, &sink).synthesize(run);
    assert_eq!(result, Synthesis::Empty);
    assert!(!sink.has_errors());
}

#[test]
fn concrete_class_missing_abstract_method_is_reported() {
    let mut h = Hierarchy::new();
    let iface = h.interface("I", &[]);
    let run = h.abstract_method(iface, "run");
    let busy = h.class("Busy", None, &[iface]);
    h.method(busy, "run");
    h.class("Lazy", None, &[iface]);

    let sink = DiagnosticSink::new();
    let table = table(VirtualMethodSynthesizer::new(&h.graph, &sink).synthesize(run));

    assert_eq!(table.cases.len(), 1);
    assert_eq!(table.cases[0].class, busy);
    assert_eq!(
        messages(&sink),
        vec!["You should override abstract method: `I::run` in class: `Lazy`"]
    );
}

#[test]
fn inherited_implementation_serves_subclasses() {
    let mut h = Hierarchy::new();
    let iface = h.interface("I", &[]);
    let run = h.abstract_method(iface, "run");
    let base = h.class("Base", None, &[iface]);
    let base_run = h.method(base, "run");
    let child = h.class("Child", Some(base), &[]);

    let sink = DiagnosticSink::new();
    let table = table(VirtualMethodSynthesizer::new(&h.graph, &sink).synthesize(run));

    let got: Vec<_> = table.cases.iter().map(|c| (c.class, c.target)).collect();
    assert_eq!(got, vec![(base, base_run), (child, base_run)]);
    assert_ne!(table.cases[0].class_hash, table.cases[1].class_hash);
}

#[test]
fn diamond_is_reported_once_and_emitted_once() {
    let mut h = Hierarchy::new();
    let root = h.interface("Root", &[]);
    let speak = h.abstract_method(root, "speak");
    let left = h.interface("Left", &[root]);
    let right = h.interface("Right", &[root]);
    let both = h.class("Both", None, &[left, right]);
    h.method(both, "speak");

    let sink = DiagnosticSink::new();
    let table = table(VirtualMethodSynthesizer::new(&h.graph, &sink).synthesize(speak));

    assert_eq!(table.cases.len(), 1);
    assert_eq!(codes(&sink), vec![ErrorCode::E3005]);
    assert_eq!(
        messages(&sink),
        vec!["duplicated class: Both in hierarchy from class: Root"]
    );
}

#[test]
fn concrete_virtual_method_dispatches_to_self_bodies() {
    let mut h = Hierarchy::new();
    let animal = h.class("Animal", None, &[]);
    let speak = h.method_with(animal, "speak", |f| f.is_virtual_method = true);
    let animal_self = h.method(animal, "speak$$self");
    let dog = h.class("Dog", Some(animal), &[]);
    h.method_with(dog, "speak", |f| f.is_virtual_method = true);
    let dog_self = h.method(dog, "speak$$self");
    let puppy = h.class("Puppy", Some(dog), &[]);
    let puppy_speak = h.method(puppy, "speak");

    let sink = DiagnosticSink::new();
    let table = table(VirtualMethodSynthesizer::new(&h.graph, &sink).synthesize(speak));

    assert!(!sink.has_errors());
    let got: Vec<_> = table.cases.iter().map(|c| (c.class, c.target)).collect();
    assert_eq!(
        got,
        vec![(animal, animal_self), (dog, dog_self), (puppy, puppy_speak)]
    );
}

#[test]
fn virtual_method_without_self_body_fails() {
    let mut h = Hierarchy::new();
    let animal = h.class("Animal", None, &[]);
    let speak = h.method_with(animal, "speak", |f| f.is_virtual_method = true);
    let dog = h.class("Dog", Some(animal), &[]);
    h.method(dog, "speak");

    let sink = DiagnosticSink::new();
    let result = VirtualMethodSynthesizer::new(&h.graph, &sink).synthesize(speak);
    assert_eq!(result, Synthesis::Failed);
    assert_eq!(codes(&sink), vec![ErrorCode::E9001]);
}

#[test]
fn abstract_cannot_hide_concrete_parent_method() {
    let mut h = Hierarchy::new();
    let base = h.class("Base", None, &[]);
    h.method(base, "run");
    let mid = h.abstract_class("Mid", Some(base), &[]);
    let mid_run = h.abstract_method(mid, "run");
    let leaf = h.class("Leaf", Some(mid), &[]);
    h.method(leaf, "run");

    let sink = DiagnosticSink::new();
    VirtualMethodSynthesizer::new(&h.graph, &sink).synthesize(mid_run);

    assert_eq!(
        messages(&sink),
        vec!["Cannot make non abstract method Mid::run abstract in class Base"]
    );
}

#[test]
fn static_methods_are_checked_without_body() {
    let mut h = Hierarchy::new();
    let base = h.abstract_class("Factory", None, &[]);
    let create = h.method_with(base, "create", |f| {
        f.is_static = true;
        f.is_abstract = true;
        f.params = vec![Param::new("kind")];
    });
    let bad = h.class("BadFactory", Some(base), &[]);
    h.method_with(bad, "create", |f| {
        f.is_static = true;
        f.params = Vec::new();
    });

    let sink = DiagnosticSink::new();
    let result = VirtualMethodSynthesizer::new(&h.graph, &sink).synthesize(create);

    assert_eq!(result, Synthesis::SignaturesChecked);
    assert_eq!(codes(&sink), vec![ErrorCode::E3003]);
}

#[test]
fn abstract_constructor_checks_derived_constructors() {
    let mut h = Hierarchy::new();
    let base = h.abstract_class("Shape", None, &[]);
    let ctor = h.method_with(base, "__construct", |f| f.is_virtual_method = true);
    let circle = h.class("Circle", Some(base), &[]);
    h.graph.class_mut(circle).has_custom_constructor = true;
    h.method_with(circle, "__construct", |f| f.params.push(Param::new("radius")));

    let sink = DiagnosticSink::new();
    let result = VirtualMethodSynthesizer::new(&h.graph, &sink).synthesize(ctor);

    assert_eq!(result, Synthesis::SignaturesChecked);
    assert_eq!(codes(&sink), vec![ErrorCode::E3003]);
}

#[test]
fn builtin_implementations_are_omitted() {
    let mut h = Hierarchy::new();
    let iface = h.interface("Countable", &[]);
    let count = h.abstract_method(iface, "count");
    let native = h.class("NativeList", None, &[iface]);
    h.graph.class_mut(native).is_builtin = true;
    h.method(native, "count");
    let user = h.class("UserList", None, &[iface]);
    h.method(user, "count");

    let sink = DiagnosticSink::new();
    let table = table(VirtualMethodSynthesizer::new(&h.graph, &sink).synthesize(count));
    assert_eq!(table.cases.len(), 1);
    assert_eq!(table.cases[0].class, user);
}

#[test]
fn incompatible_override_is_reported_and_left_out() {
    let mut h = Hierarchy::new();
    let iface = h.interface("Sized", &[]);
    let size = h.method_with(iface, "size", |f| {
        f.is_abstract = true;
        f.is_virtual_method = true;
        f.return_type_hint = Some(TypeHint::Primitive(PrimitiveType::Float));
    });
    let good = h.class("Good", None, &[iface]);
    h.returning(good, "size", TypeHint::Primitive(PrimitiveType::Float));
    let bad = h.class("Bad", None, &[iface]);
    h.returning(bad, "size", TypeHint::Primitive(PrimitiveType::Int));

    let sink = DiagnosticSink::new();
    let table = table(VirtualMethodSynthesizer::new(&h.graph, &sink).synthesize(size));

    assert_eq!(table.cases.len(), 1);
    assert_eq!(table.cases[0].class, good);
    assert_eq!(
        messages(&sink),
        vec!["Declaration of Bad::size() must be compatible with Sized::size()"]
    );
}
