//! Include and forward-declaration collection for one translation unit.
//!
//! A unit is written in blocks (a header part and a body part, say). Each
//! block gathers what it needs, compiles it into `#include` lines and
//! forward declarations, then calls [`IncludesCollector::start_next_block`].
//! Anything an earlier block already emitted is never emitted again, so the
//! suppression set only grows while one unit is being written.

use std::collections::BTreeSet;

use vela_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use vela_ir::{ClassId, FunctionData, FunctionId, ProgramGraph, Settings, TypeData, VarId};

/// Header every function calling typed RPC helpers needs.
pub const TL_COMMON_HEADER: &str = "tl/common.h";

/// One block's includes, in emission order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompiledIncludes {
    pub lib_headers: Vec<String>,
    /// `<subdir>/<header>` of every class, sorted.
    pub class_headers: Vec<String>,
    /// Generated names of forward-declared classes.
    pub forward_declarations: Vec<String>,
    pub internal_headers: Vec<String>,
}

impl CompiledIncludes {
    pub fn is_empty(&self) -> bool {
        self.lib_headers.is_empty()
            && self.class_headers.is_empty()
            && self.forward_declarations.is_empty()
            && self.internal_headers.is_empty()
    }
}

pub struct IncludesCollector<'a> {
    graph: &'a ProgramGraph,
    settings: &'a Settings,
    diagnostics: &'a DiagnosticSink,

    lib_headers: BTreeSet<String>,
    internal_headers: BTreeSet<String>,
    classes: BTreeSet<ClassId>,
    forward_declarations: BTreeSet<ClassId>,

    prev_headers: BTreeSet<String>,
    prev_classes: BTreeSet<ClassId>,
    prev_forward_declarations: BTreeSet<ClassId>,
}

impl<'a> IncludesCollector<'a> {
    pub fn new(graph: &'a ProgramGraph, settings: &'a Settings, diagnostics: &'a DiagnosticSink) -> Self {
        IncludesCollector {
            graph,
            settings,
            diagnostics,
            lib_headers: BTreeSet::new(),
            internal_headers: BTreeSet::new(),
            classes: BTreeSet::new(),
            forward_declarations: BTreeSet::new(),
            prev_headers: BTreeSet::new(),
            prev_classes: BTreeSet::new(),
            prev_forward_declarations: BTreeSet::new(),
        }
    }

    /// Everything the body of `function` refers to: callee headers, used
    /// classes, classes inside local and global variable types.
    pub fn add_function_body_depends(&mut self, function: FunctionId) {
        let graph = self.graph;
        let data = graph.function(function);
        for &callee in &data.dep {
            if callee == function {
                continue;
            }
            let callee_data = graph.function(callee);
            if callee_data.imported_from_lib.is_some() {
                if let Some(header) = self.assigned_header(data, callee_data) {
                    self.lib_headers.insert(header);
                }
            } else if !callee_data.is_extern() {
                if let Some(header) = self.assigned_header(data, callee_data) {
                    self.internal_headers.insert(header);
                }
            }
        }

        for &class in &data.class_dep {
            self.add_class_include(class);
        }
        for &var in data.local_vars.iter().chain(&data.global_vars) {
            self.add_var_signature_depends(var);
        }

        if data.needs_tl_common_h {
            if self.settings.tl_schema_file.is_none() {
                self.diagnostics.emit(
                    Diagnostic::error(ErrorCode::E5001)
                        .with_message("tl schema not given as -T option for compilation")
                        .with_label(graph.human_readable_name(function), "calls typed RPC helpers")
                        .with_suggestion("pass the schema with `--tl-schema=<file>`"),
                );
            }
            self.internal_headers.insert(TL_COMMON_HEADER.to_string());
        }
    }

    /// Classes appearing in the inferred parameter and return types.
    pub fn add_function_signature_depends(&mut self, function: FunctionId) {
        let data = self.graph.function(function);
        let mut classes = BTreeSet::new();
        for param in &data.params {
            if let Some(type_data) = &param.type_data {
                type_data.collect_classes(&mut classes);
            }
        }
        data.return_type.collect_classes(&mut classes);
        self.classes.extend(classes);
    }

    pub fn add_class_include(&mut self, class: ClassId) {
        self.classes.insert(class);
    }

    pub fn add_class_forward_declaration(&mut self, class: ClassId) {
        self.forward_declarations.insert(class);
    }

    /// Parent class and implemented interfaces.
    pub fn add_base_classes_include(&mut self, class: ClassId) {
        let data = self.graph.class(class);
        self.classes.extend(data.implements.iter().copied());
        self.classes.extend(data.parent);
    }

    pub fn add_var_signature_depends(&mut self, var: VarId) {
        let graph = self.graph;
        self.add_type_depends(&graph.var(var).type_data);
    }

    /// Every class inside `type_data`, recursing into arrays and tuples.
    pub fn add_type_depends(&mut self, type_data: &TypeData) {
        type_data.collect_classes(&mut self.classes);
    }

    pub fn add_raw_filename_include(&mut self, file_name: impl Into<String>) {
        self.internal_headers.insert(file_name.into());
    }

    /// The current block's includes, minus everything an earlier block of
    /// the same unit emitted.
    pub fn compile(&self) -> CompiledIncludes {
        let graph = self.graph;
        let lib_headers = self
            .lib_headers
            .iter()
            .filter(|h| !self.prev_headers.contains(*h))
            .cloned()
            .collect();

        let class_headers: BTreeSet<String> = self
            .classes
            .iter()
            .filter(|c| !self.prev_classes.contains(*c))
            .filter_map(|&c| {
                let class = graph.class(c);
                if class.is_builtin {
                    return None;
                }
                let files = class.files.as_ref();
                if files.is_none() {
                    tracing::warn!(class = %class.name, "class has no assigned header");
                }
                files.map(vela_ir::ClassFiles::header_path)
            })
            .collect();

        let mut forward_declarations: Vec<(&str, String)> = self
            .forward_declarations
            .iter()
            .filter(|c| !self.prev_classes.contains(*c) && !self.prev_forward_declarations.contains(*c))
            .map(|&c| {
                let class = graph.class(c);
                (class.name.as_str(), class.cpp_name())
            })
            .collect();
        forward_declarations.sort();

        let internal_headers = self
            .internal_headers
            .iter()
            .filter(|h| !self.prev_headers.contains(*h))
            .cloned()
            .collect();

        CompiledIncludes {
            lib_headers,
            class_headers: class_headers.into_iter().collect(),
            forward_declarations: forward_declarations.into_iter().map(|(_, cpp)| cpp).collect(),
            internal_headers,
        }
    }

    /// Move the current sets into the already-emitted sets.
    pub fn start_next_block(&mut self) {
        self.prev_classes.append(&mut self.classes);
        self.prev_forward_declarations.append(&mut self.forward_declarations);
        self.prev_headers.append(&mut self.internal_headers);
        self.prev_headers.append(&mut self.lib_headers);
    }

    fn assigned_header(&self, caller: &FunctionData, callee: &FunctionData) -> Option<String> {
        if let Some(files) = &callee.files {
            return Some(files.header_full_name.clone());
        }
        self.diagnostics.emit(
            Diagnostic::error(ErrorCode::E5002)
                .with_message(format!(
                    "function `{}` is called by `{}` but has no generated header",
                    callee.name, caller.name
                ))
                .with_label(&callee.name, "no files assigned during preparation")
                .with_note("only functions with a body are generated"),
        );
        None
    }
}

#[cfg(test)]
mod tests;
