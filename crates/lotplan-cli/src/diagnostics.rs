//! Diagnostic output for `lotplan check`
//!
//! Two emitters share one policy ([`DiagnosticConfig`]):
//! - `TerminalEmitter`: compiler-style text on stderr
//! - `JsonEmitter`: collected records printed as one JSON document
//!
//! ## Exit codes
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | No errors after policy (warnings, hints and info allowed) |
//! | 1 | At least one error after policy |
//!
//! `--strict` turns warnings into errors and hints into warnings, so a
//! sheet that only drops rows fails in strict mode. `--quiet` hides
//! everything but errors and never changes the exit code.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use lotplan_core::{Diagnostic, DiagnosticEmitter, Severity};
use serde::Serialize;

/// Process exit status of a check run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
}

impl ExitCode {
    /// The count must already include strict-mode escalation
    pub fn from_error_count(count: usize) -> Self {
        if count > 0 {
            ExitCode::Failure
        } else {
            ExitCode::Success
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }

    pub fn is_failure(self) -> bool {
        matches!(self, ExitCode::Failure)
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}

/// Severity policy and path display shared by both emitters
#[derive(Debug, Clone, Default)]
pub struct DiagnosticConfig {
    /// Warnings become errors, hints become warnings
    pub strict: bool,
    /// Only errors are printed
    pub quiet: bool,
    /// Prefix stripped from file paths
    pub base_path: Option<PathBuf>,
}

impl DiagnosticConfig {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }

    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Default::default()
        }
    }

    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    pub fn effective_severity(&self, severity: Severity) -> Severity {
        if !self.strict {
            return severity;
        }
        match severity {
            Severity::Warning => Severity::Error,
            Severity::Hint => Severity::Warning,
            s => s,
        }
    }

    pub fn should_show(&self, severity: Severity) -> bool {
        !self.quiet || self.effective_severity(severity) == Severity::Error
    }

    pub fn normalize_path(&self, path: &Path) -> String {
        if let Some(base) = &self.base_path {
            if let Ok(stripped) = path.strip_prefix(base) {
                return stripped.display().to_string();
            }
        }
        path.display().to_string()
    }
}

/// Writes `severity[CODE]: message` blocks
pub struct TerminalEmitter<W: Write> {
    writer: W,
    config: DiagnosticConfig,
    error_count: usize,
    warning_count: usize,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, config: DiagnosticConfig) -> Self {
        Self {
            writer,
            config,
            error_count: 0,
            warning_count: 0,
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from_error_count(self.error_count)
    }

    fn write_diagnostic(&mut self, diagnostic: &Diagnostic) -> std::io::Result<()> {
        let severity = self.config.effective_severity(diagnostic.severity);
        match severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            _ => {}
        }
        if !self.config.should_show(diagnostic.severity) {
            return Ok(());
        }

        writeln!(
            self.writer,
            "{}[{}]: {}",
            severity.as_str(),
            diagnostic.code.as_str(),
            diagnostic.message
        )?;

        match (&diagnostic.file, diagnostic.line) {
            (Some(file), Some(line)) => {
                writeln!(self.writer, "  --> {}:{}", self.config.normalize_path(file), line)?
            }
            (Some(file), None) => {
                writeln!(self.writer, "  --> {}", self.config.normalize_path(file))?
            }
            (None, Some(line)) => writeln!(self.writer, "  --> line {}", line)?,
            (None, None) => {}
        }

        if !diagnostic.notes.is_empty() {
            writeln!(self.writer, "   |")?;
            for note in &diagnostic.notes {
                writeln!(self.writer, "   = {}", note)?;
            }
        }
        for hint in &diagnostic.hints {
            writeln!(self.writer, "   = hint: {}", hint)?;
        }
        writeln!(self.writer)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        // stderr may already be closed
        let _ = self.write_diagnostic(&diagnostic);
    }
}

/// One diagnostic in `--format json` output
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub code: String,
    pub severity: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

/// Collects diagnostics for a single JSON document
pub struct JsonEmitter {
    diagnostics: Vec<JsonDiagnostic>,
    config: DiagnosticConfig,
    error_count: usize,
}

impl JsonEmitter {
    pub fn new(config: DiagnosticConfig) -> Self {
        Self {
            diagnostics: Vec::new(),
            config,
            error_count: 0,
        }
    }

    pub fn diagnostics(&self) -> &[JsonDiagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from_error_count(self.error_count)
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(&self.diagnostics).unwrap_or(serde_json::Value::Null)
    }
}

impl DiagnosticEmitter for JsonEmitter {
    fn emit(&mut self, diagnostic: Diagnostic) {
        let severity = self.config.effective_severity(diagnostic.severity);
        if severity == Severity::Error {
            self.error_count += 1;
        }
        if !self.config.should_show(diagnostic.severity) {
            return;
        }

        self.diagnostics.push(JsonDiagnostic {
            code: diagnostic.code.as_str().to_string(),
            severity: severity.as_str().to_string(),
            message: diagnostic.message,
            file: diagnostic
                .file
                .as_deref()
                .map(|p| self.config.normalize_path(p)),
            line: diagnostic.line,
            notes: diagnostic.notes,
            hints: diagnostic.hints,
        });
    }
}
