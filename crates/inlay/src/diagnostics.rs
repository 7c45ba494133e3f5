//! Error types and diagnostics
//!
//! This module provides the error taxonomy for the block engine and a
//! collector for non-fatal diagnostics gathered during a compaction run.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for inlay operations
pub type InlayResult<T> = Result<T, InlayError>;

/// Main error type for inlay
#[derive(Debug, Error)]
pub enum InlayError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The declaration start marker for a named block is absent
    #[error("block not found: no declaration for `{name}` in host text")]
    BlockNotFound {
        /// Requested block name
        name: String,
    },

    /// A wrapper delimiter is absent or malformed
    #[error("block `{name}`: expected marker `{marker}` was not found")]
    MarkerNotFound {
        /// Block being located
        name: String,
        /// The literal marker that could not be found
        marker: String,
    },

    /// More than one declaration matches the name (strict mode only)
    #[error("block `{name}` is declared more than once")]
    AmbiguousBlock {
        /// Duplicated block name
        name: String,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Asset file missing
    #[error("asset file not found: {0}")]
    AssetNotFound(PathBuf),

    /// Serialization error (rename tables)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl InlayError {
    /// Create a block-not-found error
    pub fn block_not_found(name: impl Into<String>) -> Self {
        InlayError::BlockNotFound { name: name.into() }
    }

    /// Create a marker-not-found error
    pub fn marker_not_found(name: impl Into<String>, marker: impl Into<String>) -> Self {
        InlayError::MarkerNotFound {
            name: name.into(),
            marker: marker.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        InlayError::Config(message.into())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Error - aborts the run
    Error,
    /// Warning - the run continues
    Warning,
    /// Info - informational message
    Info,
}

impl DiagnosticSeverity {
    /// Get display string
    pub fn display(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Info => "info",
        }
    }

    /// Get ANSI color code
    pub fn color(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "\x1b[31m",   // Red
            DiagnosticSeverity::Warning => "\x1b[33m", // Yellow
            DiagnosticSeverity::Info => "\x1b[34m",    // Blue
        }
    }
}

/// A diagnostic message tied to a block or file
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level
    pub severity: DiagnosticSeverity,
    /// Message
    pub message: String,
    /// Block the diagnostic refers to, if any
    pub block: Option<String>,
    /// Source file
    pub file: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            block: None,
            file: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, message)
    }

    /// Create an info diagnostic
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Info, message)
    }

    /// Set the block name
    pub fn in_block(mut self, block: impl Into<String>) -> Self {
        self.block = Some(block.into());
        self
    }

    /// Set the source file
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Format the diagnostic for display
    pub fn format(&self) -> String {
        let mut result = String::new();

        if let Some(ref file) = self.file {
            result.push_str(&file.display().to_string());
            result.push_str(": ");
        }

        result.push_str(self.severity.display());

        if let Some(ref block) = self.block {
            result.push('[');
            result.push_str(block);
            result.push(']');
        }

        result.push_str(": ");
        result.push_str(&self.message);

        result
    }

    /// Format with ANSI colors
    pub fn format_colored(&self) -> String {
        let mut result = String::new();
        let reset = "\x1b[0m";

        if let Some(ref file) = self.file {
            result.push_str("\x1b[2m");
            result.push_str(&file.display().to_string());
            result.push_str(reset);
            result.push_str(": ");
        }

        result.push_str(self.severity.color());
        result.push_str(self.severity.display());
        result.push_str(reset);

        if let Some(ref block) = self.block {
            result.push_str("\x1b[2m[");
            result.push_str(block);
            result.push_str("]\x1b[0m");
        }

        result.push_str(": ");
        result.push_str(&self.message);

        result
    }
}

/// Collector for diagnostics gathered during a run
#[derive(Debug, Default)]
pub struct DiagnosticsCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticsCollector {
    /// Create a new collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add an error
    pub fn error(&mut self, message: impl Into<String>) {
        self.add(Diagnostic::error(message));
    }

    /// Add a warning
    pub fn warning(&mut self, message: impl Into<String>) {
        self.add(Diagnostic::warning(message));
    }

    /// Add an info message
    pub fn info(&mut self, message: impl Into<String>) {
        self.add(Diagnostic::info(message));
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Get all diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get error count
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
            .count()
    }

    /// Get warning count
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
            .count()
    }

    /// Print all diagnostics to stderr
    pub fn print(&self) {
        for diagnostic in &self.diagnostics {
            eprintln!("{}", diagnostic.format_colored());
        }
    }

    /// Print summary
    pub fn print_summary(&self) {
        let errors = self.error_count();
        let warnings = self.warning_count();

        if errors > 0 || warnings > 0 {
            eprintln!("\n{} error(s), {} warning(s)", errors, warnings);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_not_found_message() {
        let err = InlayError::block_not_found("DASHBOARD_HTML");
        assert!(err.to_string().contains("DASHBOARD_HTML"));
        assert!(err.to_string().contains("block not found"));
    }

    #[test]
    fn test_marker_not_found_message() {
        let err = InlayError::marker_not_found("LOGIN_HTML", ")HTML\"");
        assert!(err.to_string().contains("LOGIN_HTML"));
        assert!(err.to_string().contains(")HTML\""));
    }

    #[test]
    fn test_diagnostic_format() {
        let diag = Diagnostic::warning("no style region")
            .in_block("SERIAL_MONITOR_HTML")
            .in_file("server.ino");

        assert_eq!(diag.severity, DiagnosticSeverity::Warning);
        assert!(diag.format().contains("server.ino"));
        assert!(diag.format().contains("warning"));
        assert!(diag.format().contains("SERIAL_MONITOR_HTML"));
    }

    #[test]
    fn test_diagnostics_collector() {
        let mut collector = DiagnosticsCollector::new();
        collector.error("error 1");
        collector.warning("warning 1");
        collector.info("info 1");

        assert!(collector.has_errors());
        assert_eq!(collector.error_count(), 1);
        assert_eq!(collector.warning_count(), 1);
        assert_eq!(collector.diagnostics().len(), 3);
    }
}
