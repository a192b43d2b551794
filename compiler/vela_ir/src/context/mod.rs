//! Settings and the frozen compilation context.

use std::sync::Arc;

use crate::ProgramGraph;

/// Code generation settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Global variables per `globals` translation unit.
    pub globals_split_count: usize,
    /// Build a static library instead of an executable.
    pub static_lib_mode: bool,
    pub enable_global_vars_memory_stats: bool,
    /// Required by functions that use TL RPC helpers.
    pub tl_schema_file: Option<String>,
    /// Worker threads; 0 lets rayon decide.
    pub jobs: usize,
    /// Generate every unit twice and compare.
    pub verify_idempotence: bool,
    /// Precompiled runtime header included by every unit.
    pub runtime_headers: String,
    /// Library name in static-library mode.
    pub lib_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            globals_split_count: 1024,
            static_lib_mode: false,
            enable_global_vars_memory_stats: false,
            tl_schema_file: None,
            jobs: 0,
            verify_idempotence: false,
            runtime_headers: "runtime-headers.h".to_string(),
            lib_name: String::new(),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn with_globals_split_count(mut self, count: usize) -> Self {
        self.globals_split_count = count.max(1);
        self
    }

    #[must_use]
    pub fn with_static_lib(mut self, lib_name: impl Into<String>) -> Self {
        self.static_lib_mode = true;
        self.lib_name = lib_name.into();
        self
    }

    #[must_use]
    pub fn with_global_vars_memory_stats(mut self, enabled: bool) -> Self {
        self.enable_global_vars_memory_stats = enabled;
        self
    }

    #[must_use]
    pub fn with_tl_schema_file(mut self, path: impl Into<String>) -> Self {
        self.tl_schema_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    #[must_use]
    pub fn with_verify_idempotence(mut self, enabled: bool) -> Self {
        self.verify_idempotence = enabled;
        self
    }

    #[must_use]
    pub fn with_runtime_headers(mut self, header: impl Into<String>) -> Self {
        self.runtime_headers = header.into();
        self
    }
}

/// Everything code generation reads: the prepared graph and the settings.
///
/// Built once after preparation and shared behind an `Arc`; there is no
/// way to mutate it afterwards.
#[derive(Debug)]
pub struct CompilationContext {
    graph: ProgramGraph,
    settings: Settings,
}

impl CompilationContext {
    pub fn freeze(graph: ProgramGraph, settings: Settings) -> Arc<Self> {
        Arc::new(CompilationContext { graph, settings })
    }

    #[inline]
    pub fn graph(&self) -> &ProgramGraph {
        &self.graph
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.globals_split_count, 1024);
        assert_eq!(settings.runtime_headers, "runtime-headers.h");
        assert!(!settings.static_lib_mode);
        assert!(settings.tl_schema_file.is_none());
    }

    #[test]
    fn split_count_never_zero() {
        assert_eq!(Settings::default().with_globals_split_count(0).globals_split_count, 1);
    }

    #[test]
    fn static_lib_builder_sets_name() {
        let settings = Settings::default().with_static_lib("geo");
        assert!(settings.static_lib_mode);
        assert_eq!(settings.lib_name, "geo");
    }
}
