//! Diagnostics model
//!
//! Findings about an uploaded sheet (missing columns, dropped rows, room
//! conflicts) are reported as [`Diagnostic`] values and handed to a
//! [`DiagnosticEmitter`]. Emitters decide how to present them; the codes
//! and default severities live here so every front end agrees on them.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Diagnostic severity, most severe first
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Hint,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Hint => "hint",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable diagnostic codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    /// Required columns could not be resolved
    E001MissingColumns,
    /// Run time conversion failed and the batch was aborted
    E002UnparsableDuration,
    /// The input file could not be read
    E003UnreadableInput,
    /// A row was dropped because its date/time did not parse
    W001UnparsableTimestamp,
    /// A row was dropped because its run time did not parse
    W002UnparsableDuration,
    /// Two lots occupy the same room at the same time
    W003ResourceOverlap,
    /// An entry falls outside the displayed calendar week
    H001OutsideWeek,
    /// Summary of the normalized schedule
    I001ScheduleSummary,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::E001MissingColumns => "E001",
            DiagnosticCode::E002UnparsableDuration => "E002",
            DiagnosticCode::E003UnreadableInput => "E003",
            DiagnosticCode::W001UnparsableTimestamp => "W001",
            DiagnosticCode::W002UnparsableDuration => "W002",
            DiagnosticCode::W003ResourceOverlap => "W003",
            DiagnosticCode::H001OutsideWeek => "H001",
            DiagnosticCode::I001ScheduleSummary => "I001",
        }
    }

    /// Severity a diagnostic with this code carries unless overridden
    pub fn default_severity(self) -> Severity {
        match self.as_str().as_bytes().first() {
            Some(b'E') => Severity::Error,
            Some(b'W') => Severity::Warning,
            Some(b'H') => Severity::Hint,
            _ => Severity::Info,
        }
    }
}

/// A single finding
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    pub file: Option<PathBuf>,
    /// 1-based sheet line, when the finding concerns one row
    pub line: Option<usize>,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    /// Create a diagnostic with the code's default severity
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            message: message.into(),
            file: None,
            line: None,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    /// Create a diagnostic forced to error severity
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            ..Self::new(code, message)
        }
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

/// Sink for diagnostics
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: Diagnostic);
}

/// Emitter that keeps everything in memory
#[derive(Debug, Default)]
pub struct CollectingEmitter {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn count(&self, code: DiagnosticCode) -> usize {
        self.diagnostics.iter().filter(|d| d.code == code).count()
    }
}

impl DiagnosticEmitter for CollectingEmitter {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_severity_follows_code_prefix() {
        assert_eq!(DiagnosticCode::E001MissingColumns.default_severity(), Severity::Error);
        assert_eq!(
            DiagnosticCode::W003ResourceOverlap.default_severity(),
            Severity::Warning
        );
        assert_eq!(DiagnosticCode::H001OutsideWeek.default_severity(), Severity::Hint);
        assert_eq!(DiagnosticCode::I001ScheduleSummary.default_severity(), Severity::Info);
    }

    #[test]
    fn builder_collects_context() {
        let d = Diagnostic::new(DiagnosticCode::W001UnparsableTimestamp, "row dropped")
            .with_file("plan.xlsx")
            .with_line(7)
            .with_note("value was \"soon 08:00\"")
            .with_hint("use YYYY-MM-DD dates");

        assert_eq!(d.severity, Severity::Warning);
        assert_eq!(d.line, Some(7));
        assert_eq!(d.file, Some(PathBuf::from("plan.xlsx")));
        assert_eq!(d.notes.len(), 1);
        assert_eq!(d.hints.len(), 1);
    }

    #[test]
    fn error_constructor_overrides_severity() {
        let d = Diagnostic::error(DiagnosticCode::W003ResourceOverlap, "conflict");
        assert_eq!(d.severity, Severity::Error);
    }

    #[test]
    fn collecting_emitter_counts() {
        let mut emitter = CollectingEmitter::new();
        emitter.emit(Diagnostic::new(DiagnosticCode::W003ResourceOverlap, "a"));
        emitter.emit(Diagnostic::new(DiagnosticCode::W003ResourceOverlap, "b"));
        assert_eq!(emitter.count(DiagnosticCode::W003ResourceOverlap), 2);
        assert!(!emitter.has_errors());

        emitter.emit(Diagnostic::new(DiagnosticCode::E001MissingColumns, "c"));
        assert!(emitter.has_errors());
    }

    #[test]
    fn severity_ordering_puts_errors_first() {
        assert!(Severity::Error < Severity::Warning);
        assert!(Severity::Hint < Severity::Info);
    }
}
