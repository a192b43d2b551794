//! Program builder shared by the unit tests.

use std::sync::Arc;

use vela_diagnostic::DiagnosticSink;
use vela_ir::{
    ClassData, ClassId, ClassKind, CompilationContext, FunctionBody, FunctionData, FunctionId,
    FunctionKind, Param, ProgramGraph, Settings, Stmt, TypeData, VarData, VarId, VarKind,
};

use crate::commands::CodeGenRootCmd;
use crate::output::{GenMode, WriterData};
use crate::prepare::prepare_for_codegen;
use crate::task::run_command;

#[derive(Default)]
pub(crate) struct Program {
    pub graph: ProgramGraph,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(&mut self, name: &str, parent: Option<ClassId>, implements: &[ClassId]) -> ClassId {
        let mut class = ClassData::new(name, ClassKind::Class);
        class.parent = parent;
        class.implements = implements.to_vec();
        class.file = "zoo.php".to_string();
        self.graph.add_class(class)
    }

    pub fn interface(&mut self, name: &str) -> ClassId {
        let mut class = ClassData::new(name, ClassKind::Interface);
        class.file = "zoo.php".to_string();
        self.graph.add_class(class)
    }

    /// Free function with a `return;` body.
    pub fn function(&mut self, name: &str, edit: impl FnOnce(&mut FunctionData)) -> FunctionId {
        let mut function = FunctionData::new(name);
        function.file = "lib.php".to_string();
        function.body = FunctionBody::Statements(vec![Stmt::Return(None)]);
        edit(&mut function);
        self.graph.add_function(function)
    }

    pub fn extern_function(&mut self, name: &str) -> FunctionId {
        self.function(name, |f| {
            f.kind = FunctionKind::Extern;
            f.body = FunctionBody::Empty;
        })
    }

    pub fn method(&mut self, class: ClassId, local: &str, edit: impl FnOnce(&mut FunctionData)) -> FunctionId {
        let class_name = self.graph.class(class).name.clone();
        let mut function = FunctionData::new(format!("{class_name}$${local}"));
        function.local_name = local.to_string();
        function.class_id = Some(class);
        function.file = "zoo.php".to_string();
        function.params.push(Param::new("this"));
        function.body = FunctionBody::Statements(vec![Stmt::Return(None)]);
        edit(&mut function);
        self.graph.add_function(function)
    }

    pub fn main(&mut self, edit: impl FnOnce(&mut FunctionData)) -> FunctionId {
        self.function("main", |f| {
            f.kind = FunctionKind::Main;
            f.file = "index.php".to_string();
            edit(f);
        })
    }

    pub fn var(&mut self, name: &str, kind: VarKind, type_data: TypeData) -> VarId {
        self.graph.add_var(VarData::new(name, kind, type_data))
    }

    pub fn prepared(mut self, settings: Settings) -> Arc<CompilationContext> {
        prepare_for_codegen(&mut self.graph);
        CompilationContext::freeze(self.graph, settings)
    }
}

pub(crate) fn compile(
    context: &CompilationContext,
    command: &dyn CodeGenRootCmd,
) -> (Vec<WriterData>, DiagnosticSink) {
    let sink = DiagnosticSink::new();
    let units = run_command(context, &sink, command, GenMode::Contents);
    (units, sink)
}

/// Text of the unit at `path`.
pub(crate) fn text_of<'u>(units: &'u [WriterData], path: &str) -> &'u str {
    units
        .iter()
        .find(|u| u.path() == path)
        .and_then(WriterData::text)
        .unwrap_or_else(|| panic!("no unit at {path}; have {:?}", paths(units)))
}

pub(crate) fn paths(units: &[WriterData]) -> Vec<String> {
    units.iter().map(WriterData::path).collect()
}
