//! Single-threaded preparation before generation starts.
//!
//! Assigns every generated function and every declared class its place in
//! the output tree and normalizes dependency lists. After this pass the
//! graph is frozen into a [`CompilationContext`](vela_ir::CompilationContext)
//! and never changes again.

use vela_ir::{
    stable_hash, ClassFiles, FunctionData, FunctionFiles, FunctionId, FunctionKind, ProgramGraph,
};

/// Number of `o_<N>` bucket directories.
pub const SUBDIR_BUCKETS: u64 = 100;

/// Whether a function gets its own header and source file. Functions
/// imported from a static library only get a header path. Virtual and
/// abstract methods are generated even when no implementation exists, so
/// their callers always have a header to include.
pub fn should_gen_function(function: &FunctionData) -> bool {
    function.kind != FunctionKind::ClassHolder
        && !function.is_extern()
        && function.imported_from_lib.is_none()
        && (!function.body.is_empty() || function.is_main() || is_virtual_member(function))
}

fn is_virtual_member(function: &FunctionData) -> bool {
    function.class_id.is_some() && (function.is_virtual_method || function.is_abstract)
}

/// `o_<hash(short file name) % 100>`
pub fn subdir_for(short_file_name: &str) -> String {
    format!("o_{}", stable_hash(short_file_name.as_bytes()) % SUBDIR_BUCKETS)
}

/// `Zoo\Dog` becomes `C@Zoo@Dog.h`.
pub fn class_header_name(class_name: &str) -> String {
    format!("C@{}.h", class_name.replace('\\', "@"))
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PrepareSummary {
    pub functions: usize,
    pub classes: usize,
}

/// Assign files and deduplicate dependency lists.
pub fn prepare_for_codegen(graph: &mut ProgramGraph) -> PrepareSummary {
    let _span = tracing::info_span!("prepare_for_codegen").entered();
    let mut summary = PrepareSummary::default();

    let ids: Vec<FunctionId> = graph.function_ids().collect();
    for id in ids {
        let lib_headers_dir = graph
            .function(id)
            .imported_from_lib
            .map(|lib| graph.lib(lib).headers_dir.clone());
        let function = graph.function_mut(id);

        dedup(&mut function.dep);
        dedup(&mut function.class_dep);
        dedup(&mut function.local_vars);
        dedup(&mut function.global_vars);
        dedup(&mut function.static_vars);

        let imported = lib_headers_dir.is_some();
        if !imported && !should_gen_function(function) {
            continue;
        }
        let stem = function.file_stem();
        let header_name = format!("{stem}.h");
        let subdir = subdir_for(&function.file);
        let header_full_name = match lib_headers_dir {
            Some(dir) => format!("{}/{header_name}", dir.trim_end_matches('/')),
            None => format!("{subdir}/{header_name}"),
        };
        let src_name = (!function.is_inline && !imported).then(|| format!("{stem}.cpp"));
        tracing::trace!(function = %function.name, header = %header_full_name, "files assigned");
        function.files = Some(FunctionFiles {
            subdir,
            header_name,
            src_name,
            header_full_name,
        });
        if !imported {
            summary.functions += 1;
        }
    }

    let classes: Vec<_> = graph.class_ids().collect();
    for id in classes {
        let class = graph.class_mut(id);
        if class.is_builtin {
            continue;
        }
        class.files = Some(ClassFiles {
            subdir: subdir_for(&class.file),
            header_name: class_header_name(&class.name),
        });
        summary.classes += 1;
    }

    tracing::debug!(
        functions = summary.functions,
        classes = summary.classes,
        "generation prepared"
    );
    summary
}

fn dedup<T: Ord>(items: &mut Vec<T>) {
    items.sort_unstable();
    items.dedup();
}
