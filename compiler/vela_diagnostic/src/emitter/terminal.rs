//! Terminal Emitter
//!
//! Human-readable diagnostic output with optional ANSI color support.
//!
//! ```text
//! error[E3001]: Declaration of Car::speak() must be compatible with Animal::speak()
//!   --> Car::speak: override declared here
//!       Animal::speak: overridden method
//!   = note: return type `Car` is not compatible with `Animal`
//! ```

use std::io::{self, Write};

use crate::{Diagnostic, Severity};

use super::DiagnosticEmitter;

mod colors {
    pub const ERROR: &str = "\x1b[1;31m";
    pub const WARNING: &str = "\x1b[1;33m";
    pub const NOTE: &str = "\x1b[1;36m";
    pub const HELP: &str = "\x1b[1;32m";
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m";
    pub const RESET: &str = "\x1b[0m";
}

#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Color output mode for terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// For `Auto`, `is_tty` decides; it is ignored otherwise.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Terminal emitter with optional color support.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
}

impl TerminalEmitter<io::Stderr> {
    /// Create a terminal emitter for stderr.
    pub fn stderr(mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter::with_color_mode(io::stderr(), mode, is_tty)
    }
}

impl<W: Write> TerminalEmitter<W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
        }
    }

    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn write_severity(&mut self, severity: Severity) {
        let color = match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
        };
        self.write_colored(&severity.to_string(), color);
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.write_severity(diagnostic.severity);
        let code = format!("[{}]", diagnostic.code);
        self.write_colored(&code, colors::BOLD);
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        for label in &diagnostic.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            let _ = write!(self.writer, "  {marker} ");
            self.write_colored(&label.subject, colors::BOLD);
            let _ = write!(self.writer, ": ");
            let color = if label.is_primary {
                colors::ERROR
            } else {
                colors::SECONDARY
            };
            self.write_colored(&label.message, color);
            let _ = writeln!(self.writer);
        }

        for note in &diagnostic.notes {
            let _ = write!(self.writer, "  = ");
            self.write_colored("note", colors::BOLD);
            let _ = writeln!(self.writer, ": {note}");
        }

        for suggestion in &diagnostic.suggestions {
            let _ = write!(self.writer, "  = ");
            self.write_colored("help", colors::HELP);
            let _ = writeln!(self.writer, ": {suggestion}");
        }

        let _ = writeln!(self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count > 0 {
            self.write_colored("error", colors::ERROR);
            let error_part = if error_count == 1 {
                "previous error".to_string()
            } else {
                format!("{error_count} previous errors")
            };
            if warning_count > 0 {
                let _ = writeln!(
                    self.writer,
                    ": aborting due to {error_part}; {warning_count} warning{} emitted",
                    plural_s(warning_count)
                );
            } else {
                let _ = writeln!(self.writer, ": aborting due to {error_part}");
            }
        } else if warning_count > 0 {
            self.write_colored("warning", colors::WARNING);
            let _ = writeln!(
                self.writer,
                ": {warning_count} warning{} emitted",
                plural_s(warning_count)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use pretty_assertions::assert_eq;

    fn render(diagnostics: &[Diagnostic], colors: ColorMode) -> String {
        let mut output = Vec::new();
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, colors, false);
        emitter.emit_all(diagnostics);
        emitter.emit_summary(diagnostics.len(), 0);
        emitter.flush();
        String::from_utf8_lossy(&output).into_owned()
    }

    #[test]
    fn renders_plain_text_layout() {
        let diag = Diagnostic::error(ErrorCode::E3001)
            .with_message("Declaration of Car::speak() must be compatible with Animal::speak()")
            .with_label("Car::speak", "override declared here")
            .with_secondary_label("Animal::speak", "overridden method")
            .with_note("return type `Car` is not compatible with `Animal`");

        let text = render(&[diag], ColorMode::Never);
        assert_eq!(
            text,
            "error[E3001]: Declaration of Car::speak() must be compatible with Animal::speak()\n\
             \x20 --> Car::speak: override declared here\n\
             \x20     Animal::speak: overridden method\n\
             \x20 = note: return type `Car` is not compatible with `Animal`\n\
             \n\
             error: aborting due to previous error\n"
        );
    }

    #[test]
    fn always_mode_emits_ansi() {
        let diag = Diagnostic::error(ErrorCode::E5001).with_message("TL schema is not set");
        let text = render(&[diag], ColorMode::Always);
        assert!(text.contains("\x1b["));
        assert!(text.contains("E5001"));
    }

    #[test]
    fn summary_counts_plural() {
        let diags = vec![
            Diagnostic::error(ErrorCode::E3002).with_message("a"),
            Diagnostic::error(ErrorCode::E3003).with_message("b"),
        ];
        let text = render(&diags, ColorMode::Never);
        assert!(text.ends_with("error: aborting due to 2 previous errors\n"));
    }

    #[test]
    fn auto_mode_follows_tty() {
        assert!(ColorMode::Auto.should_use_colors(true));
        assert!(!ColorMode::Auto.should_use_colors(false));
        assert!(ColorMode::Always.should_use_colors(false));
        assert!(!ColorMode::Never.should_use_colors(true));
    }
}
