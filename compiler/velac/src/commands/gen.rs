//! The `gen` command: write the translation units of a program.
//!
//! A full build generates contents for every unit. With `--diff` the
//! program is first generated in hash mode and compared against the
//! manifest of the previous build; only the commands behind changed files
//! run again, in contents mode. Either way files the new build no longer
//! produces are deleted and the manifest is replaced.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use vela_codegen::files::{remove_files, write_units};
use vela_codegen::scheduler::scheduler_for_jobs;
use vela_codegen::{compile_program, regenerate_for_diff, GenMode, HashManifest};
use vela_diagnostic::DiagnosticSink;
use vela_dispatch::SynthesisSummary;
use vela_ir::Settings;

use super::{fail, load_program, report_diagnostics, CommandError};

/// Default output directory.
pub const DEFAULT_DEST: &str = "vela_out";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenOptions {
    pub input: Option<PathBuf>,
    pub dest: PathBuf,
    /// `0` picks the number of cores.
    pub jobs: usize,
    /// Library name when building a static library.
    pub static_lib: Option<String>,
    pub tl_schema: Option<String>,
    pub split: Option<usize>,
    pub verify_idempotence: bool,
    pub mem_stats: bool,
    pub diff: bool,
    pub runtime_headers: Option<String>,
}

impl Default for GenOptions {
    fn default() -> Self {
        GenOptions {
            input: None,
            dest: PathBuf::from(DEFAULT_DEST),
            jobs: 0,
            static_lib: None,
            tl_schema: None,
            split: None,
            verify_idempotence: false,
            mem_stats: false,
            diff: false,
            runtime_headers: None,
        }
    }
}

impl GenOptions {
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default()
            .with_jobs(self.jobs)
            .with_verify_idempotence(self.verify_idempotence)
            .with_global_vars_memory_stats(self.mem_stats);
        if let Some(name) = &self.static_lib {
            settings = settings.with_static_lib(name.clone());
        }
        if let Some(schema) = &self.tl_schema {
            settings = settings.with_tl_schema_file(schema.clone());
        }
        if let Some(split) = self.split {
            settings = settings.with_globals_split_count(split);
        }
        if let Some(header) = &self.runtime_headers {
            settings = settings.with_runtime_headers(header.clone());
        }
        settings
    }
}

/// Parse the arguments following `velac gen`. Unknown flags and malformed
/// values are warned about and ignored.
pub fn parse_gen_options(args: &[String]) -> GenOptions {
    let mut options = GenOptions::default();
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if (arg == "--dest" || arg == "-d") && i + 1 < args.len() {
            options.dest = PathBuf::from(&args[i + 1]);
            i += 2;
            continue;
        }
        if let Some(dest) = arg.strip_prefix("--dest=") {
            options.dest = PathBuf::from(dest);
        } else if let Some(jobs) = arg.strip_prefix("--jobs=") {
            if jobs == "auto" {
                options.jobs = 0;
            } else if let Ok(n) = jobs.parse() {
                options.jobs = n;
            } else {
                eprintln!("warning: invalid job count '{jobs}', using auto");
            }
        } else if arg == "--static-lib" {
            options.static_lib = Some(String::new());
        } else if let Some(name) = arg.strip_prefix("--static-lib=") {
            options.static_lib = Some(name.to_string());
        } else if let Some(schema) = arg.strip_prefix("--tl-schema=") {
            options.tl_schema = Some(schema.to_string());
        } else if let Some(split) = arg.strip_prefix("--split=") {
            match split.parse() {
                Ok(n) if n > 0 => options.split = Some(n),
                _ => eprintln!("warning: invalid split count '{split}', using the default"),
            }
        } else if let Some(header) = arg.strip_prefix("--runtime-headers=") {
            options.runtime_headers = Some(header.to_string());
        } else if arg == "--verify-idempotence" {
            options.verify_idempotence = true;
        } else if arg == "--mem-stats" {
            options.mem_stats = true;
        } else if arg == "--diff" {
            options.diff = true;
        } else if !arg.starts_with('-') && options.input.is_none() {
            options.input = Some(PathBuf::from(arg));
        } else {
            eprintln!("warning: ignoring unknown option '{arg}'");
        }
        i += 1;
    }

    // a bare --static-lib names the library after the input
    if options.static_lib.as_deref() == Some("") {
        options.static_lib = Some(
            options
                .input
                .as_deref()
                .and_then(Path::file_stem)
                .map_or_else(|| "lib".to_string(), |stem| stem.to_string_lossy().into_owned()),
        );
    }
    options
}

#[derive(Debug, PartialEq, Eq)]
pub struct GenReport {
    /// Units the program produces.
    pub units: usize,
    pub written: usize,
    pub removed: usize,
    pub synthesis: SynthesisSummary,
}

pub fn gen_program(
    input: &Path,
    options: &GenOptions,
    diagnostics: &Arc<DiagnosticSink>,
) -> Result<GenReport, CommandError> {
    let _span = tracing::info_span!("gen", input = %input.display(), diff = options.diff).entered();
    let graph = load_program(input)?;
    let settings = options.settings();
    let dest = options.dest.as_path();
    let previous = HashManifest::load(dest)?;

    let (manifest, units, written, synthesis) = if options.diff {
        let jobs = settings.jobs;
        let generated = compile_program(graph, settings, diagnostics, GenMode::Hashes)?;
        let changed = previous.changed_paths(&generated.units);
        tracing::debug!(changed = changed.len(), units = generated.units.len(), "compared with manifest");

        let mut scheduler = scheduler_for_jobs(jobs);
        let regenerated = regenerate_for_diff(
            &generated.context,
            diagnostics,
            scheduler.as_mut(),
            &generated.output,
            &changed,
        )?;
        let written = write_units(dest, &regenerated)?;
        (
            HashManifest::from_units(&generated.units),
            generated.units.len(),
            written,
            generated.synthesis,
        )
    } else {
        let generated = compile_program(graph, settings, diagnostics, GenMode::Contents)?;
        let written = write_units(dest, &generated.units)?;
        (
            HashManifest::from_units(&generated.units),
            generated.units.len(),
            written,
            generated.synthesis,
        )
    };

    let removed = remove_files(dest, &previous.stale_paths(&manifest))?;
    manifest.save(dest)?;
    tracing::info!(units, written, removed, "generation finished");
    Ok(GenReport {
        units,
        written,
        removed,
        synthesis,
    })
}

/// CLI entry for `velac gen`.
pub fn gen_file(args: &[String]) {
    let options = parse_gen_options(args);
    let Some(input) = options.input.clone() else {
        eprintln!("error: missing program path");
        eprintln!("Usage: velac gen <program.json> --dest <dir> [options]");
        std::process::exit(1);
    };

    let diagnostics = Arc::new(DiagnosticSink::new());
    match gen_program(&input, &options, &diagnostics) {
        Ok(report) => {
            report_diagnostics(&diagnostics);
            println!(
                "Generated {} files into {} ({} written, {} removed, {} dispatch tables)",
                report.units,
                options.dest.display(),
                report.written,
                report.removed,
                report.synthesis.dispatch_tables
            );
        }
        Err(err) => fail(&diagnostics, &err),
    }
}
