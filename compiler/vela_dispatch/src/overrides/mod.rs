//! Override validation: arity and signature variance of a method against
//! the interface or abstract method it implements.

use vela_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use vela_ir::{ClassData, ClassId, FunctionData, FunctionId, ProgramGraph};

use crate::variance::{describe, param_hints_compatible, return_hints_compatible};

/// Abstract classes and interfaces may leave methods unimplemented.
pub(crate) fn is_abstract_class(class: &ClassData) -> bool {
    class.is_abstract || class.is_interface()
}

/// Whether an override accepts every call the interface method accepts:
/// at least as many parameters, and every extra one defaulted.
///
/// ```text
/// interface I { function foo($x, $y); }          // i_argn = 2
/// class A implements I { function foo($x, $y = 10, $z = 20); }
///                                                 // min 1, max 3, defaults 2
/// ```
pub fn arity_compatible(interface: &FunctionData, derived: &FunctionData) -> bool {
    let i_argn = interface.params.len();
    let max_argn = derived.params.len();
    let default_argn = max_argn - derived.min_argn();
    i_argn <= max_argn && default_argn >= max_argn - i_argn
}

pub struct OverrideChecker<'a> {
    graph: &'a ProgramGraph,
    sink: &'a DiagnosticSink,
}

impl<'a> OverrideChecker<'a> {
    pub fn new(graph: &'a ProgramGraph, sink: &'a DiagnosticSink) -> Self {
        OverrideChecker { graph, sink }
    }

    /// Check `found`, the method `class` declares for `interface`.
    ///
    /// With no method found, a concrete class is reported as needing to be
    /// abstract and an abstract one hands the obligation down to its derived
    /// classes. Returns `false` when an override was found and rejected.
    pub fn check(&self, interface: FunctionId, class: ClassId, found: Option<FunctionId>) -> bool {
        let graph = self.graph;
        let iface = graph.function(interface);
        let mut pending = vec![(class, found)];

        while let Some((class_id, found)) = pending.pop() {
            let class = graph.class(class_id);
            let found = found.filter(|method| {
                !(graph.function(*method).is_constructor() && !class.has_custom_constructor)
            });

            let Some(derived) = found else {
                if !is_abstract_class(class) {
                    self.sink.emit(
                        Diagnostic::error(ErrorCode::E3002)
                            .with_message(format!(
                                "class: {} must be abstract, method: {} is not overridden",
                                class.name,
                                graph.human_readable_name(interface)
                            ))
                            .with_label(&class.name, "concrete class without an implementation"),
                    );
                    continue;
                }
                for &next in class.derived.iter().rev() {
                    let own = graph.class(next).own_method(&iface.local_name, iface.is_static);
                    pending.push((next, own));
                }
                continue;
            };

            if !self.check_method(interface, class_id, derived) {
                return false;
            }
        }
        true
    }

    /// Arity, then variance for required methods.
    fn check_method(&self, interface: FunctionId, class: ClassId, derived: FunctionId) -> bool {
        let graph = self.graph;
        let iface = graph.function(interface);
        let method = graph.function(derived);

        if !arity_compatible(iface, method) {
            self.sink.emit(
                Diagnostic::error(ErrorCode::E3003)
                    .with_message(format!(
                        "Count of arguments are different in interface method: `{}` and in class: `{}`",
                        graph.human_readable_name(interface),
                        graph.class(class).name
                    ))
                    .with_label(graph.human_readable_name(derived), format!(
                        "declares {} parameter(s), {} required",
                        method.params.len(),
                        method.min_argn()
                    ))
                    .with_secondary_label(
                        graph.human_readable_name(interface),
                        format!("declares {} parameter(s)", iface.params.len()),
                    ),
            );
            return false;
        }

        // non-required methods may lack the type information to be checked
        if !method.is_required {
            return true;
        }
        self.check_variance(interface, derived)
    }

    /// Covariant return, then contravariant parameters (skipping the
    /// receiver), stopping at the first mismatch.
    pub fn check_variance(&self, interface: FunctionId, derived: FunctionId) -> bool {
        let graph = self.graph;
        let iface = graph.function(interface);
        let method = graph.function(derived);

        let return_ok = return_hints_compatible(
            iface.return_type_hint.as_ref(),
            method.return_type_hint.as_ref(),
            graph,
        );
        let mismatched_param = if return_ok {
            (1..iface.params.len()).find(|&i| {
                let base = iface.params[i].type_hint.as_ref();
                let over = method.params.get(i).and_then(|p| p.type_hint.as_ref());
                !param_hints_compatible(base, over, graph)
            })
        } else {
            None
        };
        if return_ok && mismatched_param.is_none() {
            return true;
        }

        let iface_owner = self.owner_name(iface);
        let method_owner = self.owner_name(method);
        let mut notes = Vec::new();
        if return_ok {
            for i in 1..iface.params.len() {
                let base = &iface.params[i];
                let over = method.params.get(i);
                notes.push(format!(
                    "base ({iface_owner}) param[{}]: {}",
                    base.name,
                    describe(base.type_hint.as_ref(), graph)
                ));
                notes.push(format!(
                    "derived ({method_owner}) param[{}]: {}",
                    over.map_or("?", |p| p.name.as_str()),
                    describe(over.and_then(|p| p.type_hint.as_ref()), graph)
                ));
            }
        } else {
            notes.push(format!(
                "base return type ({iface_owner}): {}",
                describe(iface.return_type_hint.as_ref(), graph)
            ));
            notes.push(format!(
                "derived return type ({method_owner}): {}",
                describe(method.return_type_hint.as_ref(), graph)
            ));
        }
        for note in &notes {
            tracing::debug!(interface = %graph.human_readable_name(interface), "{note}");
        }

        let mut diagnostic = Diagnostic::error(ErrorCode::E3001)
            .with_message(format!(
                "Declaration of {}() must be compatible with {}()",
                graph.human_readable_name(derived),
                graph.human_readable_name(interface)
            ))
            .with_label(graph.human_readable_name(derived), match mismatched_param {
                Some(i) => format!("parameter #{i} is narrower than in the base"),
                None => "return type is wider than in the base".to_string(),
            });
        for note in notes {
            diagnostic = diagnostic.with_note(note);
        }
        self.sink.emit(diagnostic);
        false
    }

    fn owner_name<'g>(&self, function: &'g FunctionData) -> &'g str
    where
        'a: 'g,
    {
        function
            .class_id
            .map_or(function.name.as_str(), |class| self.graph.class(class).name.as_str())
    }
}
