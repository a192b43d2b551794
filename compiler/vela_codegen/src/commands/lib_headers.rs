//! Headers a static library build exports to the programs linking it.

use vela_ir::FunctionId;

use super::function::signature;
use super::CodeGenRootCmd;
use crate::generator::CodeGenerator;
use crate::includes::IncludesCollector;

pub const LIB_HEADERS_DIR: &str = "lib_headers";

/// Public declaration of one exported function.
#[derive(Debug)]
pub struct LibHeaderH {
    pub function: FunctionId,
}

impl LibHeaderH {
    pub fn file_name(&self, gen: &CodeGenerator<'_>) -> String {
        format!("{}.h", gen.graph().function(self.function).file_stem())
    }
}

impl CodeGenRootCmd for LibHeaderH {
    fn description(&self) -> String {
        format!("LibHeaderH({})", self.function.raw())
    }

    fn compile(&self, gen: &mut CodeGenerator<'_>) {
        let graph = gen.graph();
        let data = graph.function(self.function);
        let file_name = self.file_name(gen);

        gen.open_file(LIB_HEADERS_DIR, file_name);
        gen.writeln("#pragma once");
        gen.include_runtime();
        let mut includes = IncludesCollector::new(graph, gen.settings(), gen.diagnostics());
        includes.add_function_signature_depends(self.function);
        gen.write_includes(&includes.compile());
        gen.newline();
        if let Some(doc) = &data.doc_comment {
            gen.comment(doc);
        }
        gen.writeln(&format!("{};", signature(graph, data)));
        gen.close_file();
    }
}

/// Plain list of exported headers, one per line.
#[derive(Debug)]
pub struct LibHeaderTxt {
    pub exports: Vec<FunctionId>,
}

impl CodeGenRootCmd for LibHeaderTxt {
    fn description(&self) -> String {
        "LibHeaderTxt".to_string()
    }

    fn compile(&self, gen: &mut CodeGenerator<'_>) {
        let graph = gen.graph();
        let mut headers: Vec<String> = self
            .exports
            .iter()
            .map(|&f| format!("{LIB_HEADERS_DIR}/{}.h", graph.function(f).file_stem()))
            .collect();
        headers.sort();

        gen.open_file("", "lib_headers.txt");
        for header in &headers {
            gen.writeln(header);
        }
        gen.close_file();
    }
}

/// Entry that initializes the library's globals once.
#[derive(Debug)]
pub struct StaticLibraryRunGlobalHeaderH;

impl CodeGenRootCmd for StaticLibraryRunGlobalHeaderH {
    fn description(&self) -> String {
        "StaticLibraryRunGlobalHeaderH".to_string()
    }

    fn compile(&self, gen: &mut CodeGenerator<'_>) {
        let lib_name: String = gen
            .settings()
            .lib_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();

        gen.open_file(LIB_HEADERS_DIR, format!("{lib_name}_run_global.h"));
        gen.writeln("#pragma once");
        gen.newline();
        gen.writeln(&format!("void lib_{lib_name}_run_global();"));
        gen.close_file();
    }
}
