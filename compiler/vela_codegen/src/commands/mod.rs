//! Root commands: each one knows how to write a fixed set of files.
//!
//! Commands hold ids into the program graph, never references, so a
//! command can be shared across threads and run again later (the diff
//! re-run does exactly that).

mod class;
mod function;
mod globals;
mod init;
mod lib_headers;
mod types;

use std::fmt;

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::{FunctionFiles, FunctionId};

pub use class::{ClassDeclaration, InterfaceDeclaration};
pub use function::{FunctionCpp, FunctionH};
pub use globals::{GlobalVarsMemoryStats, GlobalVarsReset, VarsCpp, VARS_HEADER, VARS_SUBDIR};
pub use init::{CppMainFile, InitScriptsCpp, LibVersionHFile};
pub use lib_headers::{LibHeaderH, LibHeaderTxt, StaticLibraryRunGlobalHeaderH, LIB_HEADERS_DIR};
pub use types::{cpp_string_literal, cpp_type};

use crate::generator::CodeGenerator;

/// One independently generatable piece of the output tree.
pub trait CodeGenRootCmd: Send + Sync + fmt::Debug {
    /// Short label for logs and diagnostics.
    fn description(&self) -> String;

    fn compile(&self, gen: &mut CodeGenerator<'_>);
}

/// Files of a function that is about to be generated. Preparation assigns
/// them to every generated function, so a miss is an internal error.
pub(crate) fn function_files<'g>(gen: &CodeGenerator<'g>, function: FunctionId) -> Option<&'g FunctionFiles> {
    let graph = gen.graph();
    let files = graph.function(function).files.as_ref();
    if files.is_none() {
        gen.diagnostics().emit(
            Diagnostic::error(ErrorCode::E9001)
                .with_message(format!(
                    "function `{}` reached code generation without assigned files",
                    graph.human_readable_name(function)
                ))
                .with_label(graph.human_readable_name(function), "not prepared"),
        );
    }
    files
}
