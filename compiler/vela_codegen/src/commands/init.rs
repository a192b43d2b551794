use vela_ir::{stable_hash, FunctionId};

use super::{function_files, CodeGenRootCmd};
use crate::generator::CodeGenerator;
use crate::prepare::should_gen_function;

/// `init_scripts()`: reset globals, then run the entry script.
#[derive(Debug)]
pub struct InitScriptsCpp {
    pub main: Option<FunctionId>,
}

impl CodeGenRootCmd for InitScriptsCpp {
    fn description(&self) -> String {
        "InitScriptsCpp".to_string()
    }

    fn compile(&self, gen: &mut CodeGenerator<'_>) {
        let main = self.main.and_then(|main| function_files(gen, main).map(|files| (main, files)));

        gen.open_file("", "init_scripts.cpp");
        gen.include_runtime();
        if let Some((_, files)) = main {
            gen.include(&files.header_full_name);
        }
        gen.newline();
        gen.writeln("void global_vars_reset();");
        gen.newline();
        gen.open_block("void init_scripts()");
        gen.writeln("global_vars_reset();");
        if let Some((main, _)) = main {
            gen.writeln(&format!("{}();", gen.graph().function(main).cpp_name()));
        }
        gen.close_block("");
        gen.close_file();
    }
}

/// Process entry point of an executable build.
#[derive(Debug)]
pub struct CppMainFile;

impl CodeGenRootCmd for CppMainFile {
    fn description(&self) -> String {
        "CppMainFile".to_string()
    }

    fn compile(&self, gen: &mut CodeGenerator<'_>) {
        gen.open_file("", "main.cpp");
        gen.include_runtime();
        gen.newline();
        gen.writeln("void init_scripts();");
        gen.newline();
        gen.open_block("int main(int argc, char *argv[])");
        gen.writeln("return run_main(argc, argv, init_scripts);");
        gen.close_block("");
        gen.close_file();
    }
}

/// Version stamp derived from the set of generated functions, so the
/// runtime can refuse a mismatched library.
#[derive(Debug)]
pub struct LibVersionHFile;

impl CodeGenRootCmd for LibVersionHFile {
    fn description(&self) -> String {
        "LibVersionHFile".to_string()
    }

    fn compile(&self, gen: &mut CodeGenerator<'_>) {
        let graph = gen.graph();
        let mut names: Vec<&str> = graph
            .function_ids()
            .filter(|&id| should_gen_function(graph.function(id)))
            .map(|id| graph.function(id).name.as_str())
            .collect();
        names.sort_unstable();
        let version = stable_hash(names.join("\n").as_bytes());

        gen.open_file("", "_lib_version.h");
        gen.writeln("#pragma once");
        gen.newline();
        gen.writeln(&format!("#define VELA_LIB_VERSION \"{version:016x}\""));
        gen.close_file();
    }
}
