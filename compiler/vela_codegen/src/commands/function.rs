//! Function declarations and definitions.
//!
//! Every generated function gets a header with its declaration (or its
//! whole definition when inline) and, unless inline, a source file with
//! the definition.

use vela_ir::{
    DispatchTable, Expr, FunctionBody, FunctionData, FunctionId, ProgramGraph, Stmt, TypeData,
};

use super::globals::VARS_HEADER;
use super::types::{cpp_string_literal, cpp_type};
use super::{function_files, CodeGenRootCmd};
use crate::generator::CodeGenerator;
use crate::includes::IncludesCollector;

#[derive(Debug)]
pub struct FunctionH {
    pub function: FunctionId,
}

impl CodeGenRootCmd for FunctionH {
    fn description(&self) -> String {
        format!("FunctionH({})", self.function.raw())
    }

    fn compile(&self, gen: &mut CodeGenerator<'_>) {
        let Some(files) = function_files(gen, self.function) else {
            return;
        };
        let graph = gen.graph();
        let data = graph.function(self.function);

        gen.open_file(files.subdir.clone(), files.header_name.clone());
        gen.writeln("#pragma once");
        gen.include_runtime();

        let mut includes = IncludesCollector::new(graph, gen.settings(), gen.diagnostics());
        includes.add_function_signature_depends(self.function);
        if data.is_inline {
            includes.add_function_body_depends(self.function);
            if uses_global_storage(data) {
                includes.add_raw_filename_include(VARS_HEADER);
            }
        }
        gen.write_includes(&includes.compile());
        gen.newline();

        if let Some(doc) = &data.doc_comment {
            gen.comment(doc);
        }
        if data.is_inline {
            write_definition(gen, self.function, "inline ");
        } else {
            gen.writeln(&format!("{};", signature(graph, data)));
        }
        gen.close_file();
    }
}

#[derive(Debug)]
pub struct FunctionCpp {
    pub function: FunctionId,
}

impl CodeGenRootCmd for FunctionCpp {
    fn description(&self) -> String {
        format!("FunctionCpp({})", self.function.raw())
    }

    fn compile(&self, gen: &mut CodeGenerator<'_>) {
        let Some(files) = function_files(gen, self.function) else {
            return;
        };
        // inline bodies live in the header
        let Some(src_name) = &files.src_name else {
            return;
        };
        let graph = gen.graph();
        let data = graph.function(self.function);

        gen.open_file(files.subdir.clone(), src_name.clone());
        gen.include_runtime();

        let mut includes = IncludesCollector::new(graph, gen.settings(), gen.diagnostics());
        includes.add_raw_filename_include(files.header_full_name.clone());
        includes.add_function_signature_depends(self.function);
        gen.write_includes(&includes.compile());
        includes.start_next_block();

        includes.add_function_body_depends(self.function);
        if uses_global_storage(data) {
            includes.add_raw_filename_include(VARS_HEADER);
        }
        gen.write_includes(&includes.compile());
        gen.newline();

        write_definition(gen, self.function, "");
        gen.close_file();
    }
}

fn uses_global_storage(data: &FunctionData) -> bool {
    !data.global_vars.is_empty() || !data.static_vars.is_empty()
}

/// `<ret> f$name(<params>)`
pub(crate) fn signature(graph: &ProgramGraph, data: &FunctionData) -> String {
    let params: Vec<String> = data
        .params
        .iter()
        .enumerate()
        .map(|(index, param)| {
            let ty = if index == 0 && data.is_instance_method() {
                let owner = data.class_id.map(|c| graph.class(c).cpp_name()).unwrap_or_default();
                format!("class_instance<{owner}> const &")
            } else {
                format!("{} ", param_type(param.type_data.as_ref(), graph))
            };
            format!("{ty}v${}", param.name)
        })
        .collect();
    format!(
        "{} {}({})",
        cpp_type(&data.return_type, graph),
        data.cpp_name(),
        params.join(", ")
    )
}

fn param_type(type_data: Option<&TypeData>, graph: &ProgramGraph) -> String {
    type_data.map_or_else(|| "mixed".to_string(), |t| cpp_type(t, graph))
}

fn write_definition(gen: &mut CodeGenerator<'_>, function: FunctionId, prefix: &str) {
    let graph = gen.graph();
    let data = graph.function(function);
    gen.open_block(&format!("{prefix}{}", signature(graph, data)));

    for &var in &data.local_vars {
        let var = graph.var(var);
        gen.writeln(&format!("{} {};", cpp_type(&var.type_data, graph), var.cpp_name()));
    }

    match &data.body {
        FunctionBody::Empty => {}
        FunctionBody::Statements(stmts) => {
            for stmt in stmts {
                write_stmt(gen, data, stmt);
            }
        }
        FunctionBody::Dispatch(table) => write_dispatch(gen, data, table),
    }
    gen.close_block("");
}

fn write_stmt(gen: &mut CodeGenerator<'_>, data: &FunctionData, stmt: &Stmt) {
    let graph = gen.graph();
    let line = match stmt {
        Stmt::Expr(expr) => format!("{};", emit_expr(graph, data, expr)),
        Stmt::Assign { var, value } => {
            format!("{} = {};", graph.var(*var).cpp_name(), emit_expr(graph, data, value))
        }
        Stmt::Return(None) => "return;".to_string(),
        Stmt::Return(Some(value)) => format!("return {};", emit_expr(graph, data, value)),
    };
    gen.writeln(&line);
}

/// A switch over the receiver's class hash. Each case casts the receiver
/// and forwards the remaining arguments.
fn write_dispatch(gen: &mut CodeGenerator<'_>, data: &FunctionData, table: &DispatchTable) {
    let graph = gen.graph();
    let receiver = data.params.first().map_or("this", |p| p.name.as_str());
    let forwarded: Vec<String> = data.params.iter().skip(1).map(|p| format!("v${}", p.name)).collect();

    gen.open_block(&format!("switch (v${receiver}.get_hash())"));
    for case in &table.cases {
        let mut args = vec![format!(
            "instance_cast<{}>(v${receiver})",
            graph.class(case.class).cpp_name()
        )];
        args.extend(forwarded.iter().cloned());
        gen.writeln(&format!("case static_cast<int32_t>({}U):", case.class_hash));
        gen.indent();
        gen.writeln(&format!(
            "return {}({});",
            graph.function(case.target).cpp_name(),
            args.join(", ")
        ));
        gen.dedent();
    }
    gen.writeln("default:");
    gen.indent();
    gen.writeln(&format!(
        "php_critical_error({});",
        cpp_string_literal(&table.default_message)
    ));
    gen.dedent();
    gen.close_block("");
}

pub(crate) fn emit_expr(graph: &ProgramGraph, data: &FunctionData, expr: &Expr) -> String {
    match expr {
        Expr::Null => "mixed{}".to_string(),
        Expr::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Expr::Int(i64::MIN) => "std::numeric_limits<int64_t>::min()".to_string(),
        Expr::Int(n) => format!("int64_t{{{n}}}"),
        Expr::Float(bits) => {
            let f = f64::from_bits(*bits);
            if f.is_nan() {
                "NAN".to_string()
            } else if f.is_infinite() {
                if f.is_sign_positive() { "INFINITY" } else { "-INFINITY" }.to_string()
            } else {
                format!("{f:?}")
            }
        }
        Expr::Str(s) => cpp_string_literal(s),
        Expr::Var(var) => graph.var(*var).cpp_name(),
        Expr::Param(index) => match usize::try_from(*index).ok().and_then(|i| data.params.get(i)) {
            Some(param) => format!("v${}", param.name),
            None => {
                tracing::warn!(function = %data.name, index, "parameter index out of range");
                "mixed{}".to_string()
            }
        },
        Expr::Call { callee, args } => {
            let args: Vec<_> = args.iter().map(|a| emit_expr(graph, data, a)).collect();
            format!("{}({})", graph.function(*callee).cpp_name(), args.join(", "))
        }
        Expr::New(class) => format!("make_instance<{}>()", graph.class(*class).cpp_name()),
    }
}
