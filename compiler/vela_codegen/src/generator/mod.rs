//! The text writer handed to every root command.
//!
//! A command opens a file, writes lines into it and closes it; closing
//! turns the buffer into a [`WriterData`] according to the [`GenMode`].
//! A generator is created per run of a command and owns everything it
//! produces, so running the same command twice never shares state.

use vela_diagnostic::DiagnosticSink;
use vela_ir::{stable_hash, CompilationContext, ProgramGraph, Settings};

use crate::includes::CompiledIncludes;
use crate::output::{GenMode, Payload, UnitKind, WriterData};

struct OpenFile {
    subdir: String,
    file_name: String,
    text: String,
    comments: Vec<String>,
    includes: Vec<String>,
    lib_includes: Vec<String>,
    forward_declarations: Vec<String>,
}

pub struct CodeGenerator<'a> {
    context: &'a CompilationContext,
    diagnostics: &'a DiagnosticSink,
    mode: GenMode,
    indent: usize,
    current: Option<OpenFile>,
    finished: Vec<WriterData>,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(context: &'a CompilationContext, diagnostics: &'a DiagnosticSink, mode: GenMode) -> Self {
        CodeGenerator {
            context,
            diagnostics,
            mode,
            indent: 0,
            current: None,
            finished: Vec::new(),
        }
    }

    #[inline]
    pub fn context(&self) -> &'a CompilationContext {
        self.context
    }

    #[inline]
    pub fn graph(&self) -> &'a ProgramGraph {
        self.context.graph()
    }

    #[inline]
    pub fn settings(&self) -> &'a Settings {
        self.context.settings()
    }

    #[inline]
    pub fn diagnostics(&self) -> &'a DiagnosticSink {
        self.diagnostics
    }

    pub fn mode(&self) -> GenMode {
        self.mode
    }

    /// Start a new file. A file still open is closed first.
    pub fn open_file(&mut self, subdir: impl Into<String>, file_name: impl Into<String>) {
        if self.current.is_some() {
            tracing::warn!("file opened while another was still open");
            self.close_file();
        }
        self.indent = 0;
        self.current = Some(OpenFile {
            subdir: subdir.into(),
            file_name: file_name.into(),
            text: String::with_capacity(1024),
            comments: Vec::new(),
            includes: Vec::new(),
            lib_includes: Vec::new(),
            forward_declarations: Vec::new(),
        });
    }

    pub fn close_file(&mut self) {
        let Some(file) = self.current.take() else {
            return;
        };
        let payload = match self.mode {
            GenMode::Hashes => Payload::Hash(stable_hash(file.text.as_bytes())),
            GenMode::Contents => Payload::Contents {
                text: file.text,
                comments: file.comments,
            },
        };
        tracing::trace!(subdir = %file.subdir, file = %file.file_name, "unit closed");
        self.finished.push(WriterData {
            kind: UnitKind::from_file_name(&file.file_name),
            subdir: file.subdir,
            file_name: file.file_name,
            payload,
            includes: file.includes,
            lib_includes: file.lib_includes,
            forward_declarations: file.forward_declarations,
        });
    }

    /// Close whatever is open and hand back the finished units.
    pub fn finish(mut self) -> Vec<WriterData> {
        self.close_file();
        self.finished
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent called with zero indent");
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write a line at the current indentation.
    pub fn writeln(&mut self, line: &str) {
        let indent = self.indent;
        let Some(file) = self.current.as_mut() else {
            tracing::warn!(line, "write outside of an open file dropped");
            return;
        };
        if !line.is_empty() {
            for _ in 0..indent {
                file.text.push_str("  ");
            }
            file.text.push_str(line);
        }
        file.text.push('\n');
    }

    pub fn newline(&mut self) {
        self.writeln("");
    }

    /// `header {` followed by an indent.
    pub fn open_block(&mut self, header: &str) {
        if header.is_empty() {
            self.writeln("{");
        } else {
            self.writeln(&format!("{header} {{"));
        }
        self.indent();
    }

    /// Dedent and write `}` followed by `suffix`.
    pub fn close_block(&mut self, suffix: &str) {
        self.dedent();
        self.writeln(&format!("}}{suffix}"));
    }

    /// Attach a documentation comment to the open file. Comments are
    /// carried only in contents mode and never affect the content hash.
    pub fn comment(&mut self, text: &str) {
        if let Some(file) = self.current.as_mut() {
            file.comments.push(text.to_string());
        }
    }

    pub fn include(&mut self, header: &str) {
        self.writeln(&format!("#include \"{header}\""));
        if let Some(file) = self.current.as_mut() {
            file.includes.push(header.to_string());
        }
    }

    pub fn include_runtime(&mut self) {
        let header = self.settings().runtime_headers.clone();
        self.writeln(&format!("#include \"{header}\""));
    }

    /// Render one compiled include block: library headers, class headers,
    /// forward declarations, internal headers.
    pub fn write_includes(&mut self, includes: &CompiledIncludes) {
        for header in &includes.lib_headers {
            self.writeln(&format!("#include \"{header}\""));
            if let Some(file) = self.current.as_mut() {
                file.lib_includes.push(header.clone());
            }
        }
        for header in &includes.class_headers {
            self.include(header);
        }
        for class in &includes.forward_declarations {
            self.writeln(&format!("struct {class};"));
            if let Some(file) = self.current.as_mut() {
                file.forward_declarations.push(class.clone());
            }
        }
        for header in &includes.internal_headers {
            self.include(header);
        }
    }
}

#[cfg(test)]
mod tests;
