//! Small class-hierarchy builder shared by the unit tests.

use vela_diagnostic::{DiagnosticSink, ErrorCode};
use vela_ir::{ClassData, ClassId, ClassKind, FunctionData, FunctionId, Param, ProgramGraph, TypeHint};

#[derive(Default)]
pub(crate) struct Hierarchy {
    pub graph: ProgramGraph,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(&mut self, name: &str, parent: Option<ClassId>, implements: &[ClassId]) -> ClassId {
        let mut class = ClassData::new(name, ClassKind::Class);
        class.parent = parent;
        class.implements = implements.to_vec();
        self.graph.add_class(class)
    }

    pub fn abstract_class(&mut self, name: &str, parent: Option<ClassId>, implements: &[ClassId]) -> ClassId {
        let id = self.class(name, parent, implements);
        self.graph.class_mut(id).is_abstract = true;
        id
    }

    pub fn interface(&mut self, name: &str, extends: &[ClassId]) -> ClassId {
        let mut class = ClassData::new(name, ClassKind::Interface);
        class.implements = extends.to_vec();
        self.graph.add_class(class)
    }

    /// Instance method with a receiver parameter, customized by `edit`.
    pub fn method_with(
        &mut self,
        class: ClassId,
        local: &str,
        edit: impl FnOnce(&mut FunctionData),
    ) -> FunctionId {
        let class_name = self.graph.class(class).name.clone();
        let mut function = FunctionData::new(format!("{class_name}$${local}"));
        function.local_name = local.to_string();
        function.class_id = Some(class);
        function.params.push(Param::new("this"));
        edit(&mut function);
        self.graph.add_function(function)
    }

    pub fn method(&mut self, class: ClassId, local: &str) -> FunctionId {
        self.method_with(class, local, |_| {})
    }

    /// Abstract virtual method, as declared on an interface.
    pub fn abstract_method(&mut self, class: ClassId, local: &str) -> FunctionId {
        self.method_with(class, local, |f| {
            f.is_abstract = true;
            f.is_virtual_method = true;
        })
    }

    pub fn returning(&mut self, class: ClassId, local: &str, hint: TypeHint) -> FunctionId {
        self.method_with(class, local, |f| f.return_type_hint = Some(hint))
    }
}

pub(crate) fn codes(sink: &DiagnosticSink) -> Vec<ErrorCode> {
    sink.diagnostics().into_iter().map(|d| d.code).collect()
}

pub(crate) fn messages(sink: &DiagnosticSink) -> Vec<String> {
    sink.diagnostics().into_iter().map(|d| d.message).collect()
}
