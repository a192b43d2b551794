//! Dispatch body synthesis for virtual methods.
//!
//! A virtual method's body becomes a table keyed by the receiver's runtime
//! class hash: one case per concrete inheritor, calling the most-derived
//! implementation, and a fatal default for a receiver no case matches.
//!
//! ```text
//! switch (hash_of_class($this)) {
//!   case 0x1a2b3c4d: return instance_cast<Dog>($this)->speak(...);
//!   case 0x5e6f7a8b: return instance_cast<Cat>($this)->speak(...);
//!   default: critical_error("call method(Animal::speak) on null object");
//! }
//! ```
//!
//! Tables are computed against the read-only graph and written back in a
//! separate pass, so no function is mutated while the hierarchy is walked.

use rustc_hash::FxHashSet;
use vela_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use vela_ir::{
    ClassId, DispatchCase, DispatchTable, FunctionBody, FunctionId, FunctionKind, ProgramGraph,
};

use crate::overrides::{is_abstract_class, OverrideChecker};

/// What synthesis decided for one virtual method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Synthesis {
    /// Nothing derives from the owning class.
    NoInheritors,
    /// Static or constructor: overrides were validated, no body is built.
    SignaturesChecked,
    /// No concrete implementation exists; the body stays empty.
    Empty,
    /// The method could not be synthesized; an error was reported.
    Failed,
    Dispatch(DispatchTable),
}

/// Counters for one [`synthesize_virtual_methods`] run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SynthesisSummary {
    pub dispatch_tables: usize,
    pub cases: usize,
    pub empty: usize,
    pub checked_only: usize,
}

/// Methods that need a dispatch body: class members that are virtual or
/// abstract.
pub fn is_dispatch_point(graph: &ProgramGraph, function: FunctionId) -> bool {
    let f = graph.function(function);
    f.class_id.is_some() && (f.is_virtual_method || f.is_abstract)
}

pub struct VirtualMethodSynthesizer<'a> {
    graph: &'a ProgramGraph,
    sink: &'a DiagnosticSink,
    checker: OverrideChecker<'a>,
}

impl<'a> VirtualMethodSynthesizer<'a> {
    pub fn new(graph: &'a ProgramGraph, sink: &'a DiagnosticSink) -> Self {
        VirtualMethodSynthesizer {
            graph,
            sink,
            checker: OverrideChecker::new(graph, sink),
        }
    }

    /// Validate the overrides of `function` and build its dispatch table.
    pub fn synthesize(&self, function: FunctionId) -> Synthesis {
        let graph = self.graph;
        let virtual_fn = graph.function(function);
        let Some(class_id) = virtual_fn.class_id else {
            return Synthesis::NoInheritors;
        };
        let class = graph.class(class_id);
        if class.derived.is_empty() {
            return Synthesis::NoInheritors;
        }

        if virtual_fn.is_abstract {
            self.check_no_concrete_ancestor(function, class_id);
        }

        if virtual_fn.is_static {
            for &derived in &class.derived {
                let own = graph.class(derived).own_method(&virtual_fn.local_name, true);
                self.checker.check(function, derived, own);
            }
            return Synthesis::SignaturesChecked;
        }

        if class.construct_function == Some(function) {
            for &derived in &class.derived {
                let own = graph.class(derived).own_method("__construct", false);
                self.checker.check(function, derived, own);
            }
            return Synthesis::SignaturesChecked;
        }

        if !virtual_fn.is_abstract && !self.has_self_implementation(function, class_id) {
            return Synthesis::Failed;
        }

        let mut cases = Vec::new();
        let mut visited = FxHashSet::default();
        let mut with_case = FxHashSet::default();
        let mut duplicate_reported = false;
        // the owning class first: a concrete virtual method dispatches to
        // its own `$$self` body for exact instances
        for inheritor in std::iter::once(class_id).chain(graph.all_inheritors(class_id)) {
            if !visited.insert(inheritor) {
                if with_case.contains(&inheritor) && !duplicate_reported {
                    duplicate_reported = true;
                    self.sink.emit(
                        Diagnostic::error(ErrorCode::E3005)
                            .with_message(format!(
                                "duplicated class: {} in hierarchy from class: {}",
                                graph.class(inheritor).name,
                                class.name
                            ))
                            .with_label(&graph.class(inheritor).name, "reached along more than one path"),
                    );
                }
                continue;
            }
            if let Some(case) = self.case_for(inheritor, function) {
                with_case.insert(inheritor);
                cases.push(case);
            }
        }

        tracing::debug!(
            function = %graph.human_readable_name(function),
            cases = cases.len(),
            "virtual method synthesized"
        );
        if cases.is_empty() {
            return Synthesis::Empty;
        }
        Synthesis::Dispatch(DispatchTable {
            cases,
            default_message: format!(
                "call method({}) on null object",
                graph.human_readable_name(function)
            ),
        })
    }

    /// An abstract method may not re-abstract a concrete method inherited
    /// from a parent class.
    fn check_no_concrete_ancestor(&self, function: FunctionId, class: ClassId) {
        let graph = self.graph;
        let virtual_fn = graph.function(function);
        for parent in graph.parent_chain(class) {
            let parent_class = graph.class(parent);
            let Some(method) = parent_class.own_method(&virtual_fn.local_name, virtual_fn.is_static)
            else {
                continue;
            };
            if !graph.function(method).is_abstract {
                self.sink.emit(
                    Diagnostic::error(ErrorCode::E3004)
                        .with_message(format!(
                            "Cannot make non abstract method {} abstract in class {}",
                            graph.human_readable_name(function),
                            parent_class.name
                        ))
                        .with_label(graph.human_readable_name(function), "declared abstract here")
                        .with_secondary_label(graph.human_readable_name(method), "concrete method"),
                );
            }
        }
    }

    /// A concrete virtual method keeps its own code in a `$$self` sibling
    /// and has its body replaced by the dispatch table.
    fn has_self_implementation(&self, function: FunctionId, class: ClassId) -> bool {
        let graph = self.graph;
        let virtual_fn = graph.function(function);
        let has_self = graph
            .class(class)
            .own_method(&virtual_fn.self_method_name(), false)
            .is_some();
        if has_self && virtual_fn.body.is_empty() {
            return true;
        }
        self.sink.emit(
            Diagnostic::error(ErrorCode::E9001)
                .with_message(format!(
                    "virtual method {} is not split into a dispatcher and `{}`",
                    graph.human_readable_name(function),
                    virtual_fn.self_method_name()
                ))
                .with_label(graph.human_readable_name(function), "expected an empty body"),
        );
        false
    }

    /// The case dispatching `function` for receivers of class `derived`.
    fn case_for(&self, derived: ClassId, function: FunctionId) -> Option<DispatchCase> {
        let graph = self.graph;
        let virtual_fn = graph.function(function);
        let derived_class = graph.class(derived);

        let mut concrete = match derived_class.own_method(&virtual_fn.local_name, false) {
            Some(own) => own,
            None => {
                let inherited = graph.resolve_method(derived, &virtual_fn.local_name, false);
                let overridden = inherited.is_some_and(|m| !graph.function(m).is_abstract);
                if virtual_fn.is_abstract && !is_abstract_class(derived_class) && !overridden {
                    self.sink.emit(
                        Diagnostic::error(ErrorCode::E3002)
                            .with_message(format!(
                                "You should override abstract method: `{}` in class: `{}`",
                                graph.human_readable_name(function),
                                derived_class.name
                            ))
                            .with_label(&derived_class.name, "no implementation in class or ancestors"),
                    );
                    return None;
                }
                inherited?
            }
        };

        let method = graph.function(concrete);
        if method.is_abstract {
            return None;
        }
        let owner = method.class_id?;
        if method.is_extern() || graph.class(owner).is_builtin {
            return None;
        }
        if method.is_virtual_method {
            concrete = graph
                .class(owner)
                .own_method(&virtual_fn.self_method_name(), false)?;
        }

        let found = graph.class(owner).own_method(&virtual_fn.local_name, false);
        if !self.checker.check(function, owner, found) {
            return None;
        }

        Some(DispatchCase {
            class_hash: derived_class.hash(),
            class: derived,
            target: concrete,
        })
    }
}

/// Synthesize every dispatch point in `graph` and install the resulting
/// tables as function bodies.
pub fn synthesize_virtual_methods(graph: &mut ProgramGraph, sink: &DiagnosticSink) -> SynthesisSummary {
    let _span = tracing::info_span!("synthesize_virtual_methods").entered();

    let results: Vec<(FunctionId, Synthesis)> = {
        let view: &ProgramGraph = graph;
        let synthesizer = VirtualMethodSynthesizer::new(view, sink);
        view.function_ids()
            .filter(|id| is_dispatch_point(view, *id))
            .map(|id| (id, synthesizer.synthesize(id)))
            .collect()
    };

    let mut summary = SynthesisSummary::default();
    for (id, synthesis) in results {
        match synthesis {
            Synthesis::Dispatch(table) => {
                summary.dispatch_tables += 1;
                summary.cases += table.cases.len();
                let function = graph.function_mut(id);
                // the dispatcher calls every target and casts to every case class
                function.dep.extend(table.cases.iter().map(|case| case.target));
                function.class_dep.extend(table.cases.iter().map(|case| case.class));
                function.body = FunctionBody::Dispatch(table);
                function.kind = FunctionKind::Local;
            }
            Synthesis::Empty => summary.empty += 1,
            Synthesis::SignaturesChecked => summary.checked_only += 1,
            Synthesis::NoInheritors | Synthesis::Failed => {}
        }
    }
    tracing::debug!(
        tables = summary.dispatch_tables,
        cases = summary.cases,
        empty = summary.empty,
        "dispatch tables installed"
    );
    summary
}

#[cfg(test)]
mod tests;
