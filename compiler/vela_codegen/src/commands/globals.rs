//! Storage for globals and function statics.
//!
//! Definitions are spread over several `vars<N>.cpp` parts so a program
//! with many globals does not produce one huge unit. A variable's part is
//! picked from a hash of its name, so adding a variable leaves the other
//! parts untouched.

use vela_ir::{stable_hash, VarId};

use super::types::{cpp_string_literal, cpp_type};
use super::CodeGenRootCmd;
use crate::generator::CodeGenerator;
use crate::includes::IncludesCollector;

pub const VARS_SUBDIR: &str = "globals";
/// Declarations of every global-storage variable.
pub const VARS_HEADER: &str = "globals/vars.h";

/// `global_vars_reset()`, run before each request.
#[derive(Debug)]
pub struct GlobalVarsReset {
    pub vars: Vec<VarId>,
}

impl CodeGenRootCmd for GlobalVarsReset {
    fn description(&self) -> String {
        "GlobalVarsReset".to_string()
    }

    fn compile(&self, gen: &mut CodeGenerator<'_>) {
        let graph = gen.graph();
        gen.open_file("", "globals_reset.cpp");
        gen.include_runtime();
        gen.include(VARS_HEADER);
        write_var_includes(gen, &self.vars);
        gen.newline();

        gen.open_block("void global_vars_reset()");
        for &var in &self.vars {
            gen.writeln(&format!("hard_reset_var({});", graph.var(var).cpp_name()));
        }
        gen.close_block("");
        gen.close_file();
    }
}

/// Per-variable memory usage report.
#[derive(Debug)]
pub struct GlobalVarsMemoryStats {
    pub vars: Vec<VarId>,
}

impl CodeGenRootCmd for GlobalVarsMemoryStats {
    fn description(&self) -> String {
        "GlobalVarsMemoryStats".to_string()
    }

    fn compile(&self, gen: &mut CodeGenerator<'_>) {
        let graph = gen.graph();
        gen.open_file("", "globals_memory_stats.cpp");
        gen.include_runtime();
        gen.include(VARS_HEADER);
        write_var_includes(gen, &self.vars);
        gen.newline();

        gen.open_block("array<int64_t> get_global_vars_memory_stats()");
        gen.writeln("array<int64_t> result;");
        for &var in &self.vars {
            let data = graph.var(var);
            gen.writeln(&format!(
                "result.set_value({}, estimate_memory_usage({}));",
                cpp_string_literal(&data.name),
                data.cpp_name()
            ));
        }
        gen.writeln("return result;");
        gen.close_block("");
        gen.close_file();
    }
}

/// The shared declarations header plus `parts` definition files.
#[derive(Debug)]
pub struct VarsCpp {
    pub vars: Vec<VarId>,
    pub parts: usize,
}

impl VarsCpp {
    /// `1 + vars / split` parts.
    pub fn new(vars: Vec<VarId>, split: usize) -> Self {
        let parts = 1 + vars.len() / split.max(1);
        VarsCpp { vars, parts }
    }

    /// Index of the part defining a variable named `name`.
    #[expect(clippy::cast_possible_truncation, reason = "remainder is below `parts`")]
    pub fn part_of(&self, name: &str) -> usize {
        (stable_hash(name.as_bytes()) % self.parts.max(1) as u64) as usize
    }
}

impl CodeGenRootCmd for VarsCpp {
    fn description(&self) -> String {
        format!("VarsCpp({} parts)", self.parts)
    }

    fn compile(&self, gen: &mut CodeGenerator<'_>) {
        let graph = gen.graph();

        gen.open_file(VARS_SUBDIR, "vars.h");
        gen.writeln("#pragma once");
        gen.include_runtime();
        write_var_includes(gen, &self.vars);
        gen.newline();
        for &var in &self.vars {
            let data = graph.var(var);
            gen.writeln(&format!("extern {} {};", cpp_type(&data.type_data, graph), data.cpp_name()));
        }
        gen.close_file();

        let mut parts: Vec<Vec<VarId>> = vec![Vec::new(); self.parts.max(1)];
        for &var in &self.vars {
            parts[self.part_of(&graph.var(var).name)].push(var);
        }
        for (index, vars) in parts.iter().enumerate() {
            gen.open_file(VARS_SUBDIR, format!("vars{index}.cpp"));
            gen.include_runtime();
            gen.include(VARS_HEADER);
            gen.newline();
            for &var in vars {
                let data = graph.var(var);
                gen.writeln(&format!("{} {};", cpp_type(&data.type_data, graph), data.cpp_name()));
            }
            gen.close_file();
        }
        tracing::debug!(vars = self.vars.len(), parts = self.parts, "globals partitioned");
    }
}

fn write_var_includes(gen: &mut CodeGenerator<'_>, vars: &[VarId]) {
    let mut includes = IncludesCollector::new(gen.graph(), gen.settings(), gen.diagnostics());
    for &var in vars {
        includes.add_var_signature_depends(var);
    }
    gen.write_includes(&includes.compile());
}
