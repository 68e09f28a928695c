//! Error types for the resume2pdf library.
//!
//! Every pipeline stage fails with a single [`Resume2PdfError`]. Nothing is
//! retried and no partial PDF is ever returned alongside an error: the first
//! failing stage aborts the run and its error is what the caller sees.
//!
//! Schema violations are the one case where a single failure carries many
//! individual problems. They travel as an [`AggregatedError`] holding a typed
//! [`ValidationReport`], so callers can branch on [`ErrorKind::Validation`]
//! and walk the violations instead of scraping the message.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the resume2pdf library.
#[derive(Debug, Error)]
pub enum Resume2PdfError {
    // ── I/O errors ────────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read as UTF-8 text.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Precondition errors ───────────────────────────────────────────────
    /// A path that must be absolute was relative. Raised before any I/O.
    #[error("{role} must be an absolute path, got '{path}'")]
    RelativePath { role: &'static str, path: PathBuf },

    // ── Document errors ───────────────────────────────────────────────────
    /// No parser in the fallback chain accepted the file.
    #[error("Failed to parse as either {formats}:\n\n  {path}\n\n{details}",
        formats = format_names(.attempts),
        details = format_attempts(.attempts))]
    Parse {
        path: PathBuf,
        attempts: Vec<ParseAttempt>,
    },

    /// The document parsed but violates the résumé schema.
    #[error(transparent)]
    Validation(#[from] AggregatedError),

    /// The schema itself could not be compiled.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    // ── Render errors ─────────────────────────────────────────────────────
    /// The template engine rejected the template or failed while executing it.
    #[error("Template rendering failed: {detail}")]
    Template { detail: String },

    // ── Export errors ─────────────────────────────────────────────────────
    /// No headless browser executable could be located.
    #[error(
        "No headless browser found (tried: {tried}).\n\
Install Chromium or Google Chrome, or point CHROME_PATH / --browser at an existing binary."
    )]
    BrowserNotFound { tried: String },

    /// The headless browser ran but did not produce a PDF.
    #[error("PDF export failed: {detail}")]
    Export { detail: String },

    /// The headless browser did not finish in time and was killed.
    #[error("PDF export timed out after {secs}s")]
    ExportTimeout { secs: u64 },

    // ── Annotation errors ─────────────────────────────────────────────────
    /// The exported PDF could not be opened, modified or written back.
    #[error("Failed to brand PDF '{path}': {detail}")]
    Annotation { path: PathBuf, detail: String },

    /// The exported PDF has no pages to brand.
    #[error("PDF '{path}' has no pages")]
    EmptyPdf { path: PathBuf },

    /// A page's media box is missing or degenerate.
    #[error("Page {page} has an invalid media box: {detail}")]
    InvalidMediaBox { page: usize, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The coarse category of a [`Resume2PdfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Io,
    Parse,
    Validation,
    Path,
    Render,
    Export,
    Annotation,
    Config,
    Internal,
}

impl Resume2PdfError {
    /// Classify the error so callers can branch without matching every variant.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::ReadFailed { .. }
            | Self::WriteFailed { .. } => ErrorKind::Io,
            Self::RelativePath { .. } => ErrorKind::Path,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Validation(_) => ErrorKind::Validation,
            Self::InvalidSchema(_) | Self::InvalidConfig(_) => ErrorKind::Config,
            Self::Template { .. } => ErrorKind::Render,
            Self::BrowserNotFound { .. } | Self::Export { .. } | Self::ExportTimeout { .. } => {
                ErrorKind::Export
            }
            Self::Annotation { .. } | Self::EmptyPdf { .. } | Self::InvalidMediaBox { .. } => {
                ErrorKind::Annotation
            }
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The validation report, when this is a schema failure.
    pub fn validation_report(&self) -> Option<&ValidationReport> {
        match self {
            Self::Validation(agg) => Some(&agg.report),
            _ => None,
        }
    }
}

/// One rejected interpretation of the input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAttempt {
    /// Human-readable format name, e.g. `"JSON"`.
    pub format: &'static str,
    /// The parser's own error message.
    pub message: String,
}

fn format_names(attempts: &[ParseAttempt]) -> String {
    attempts
        .iter()
        .map(|a| a.format)
        .collect::<Vec<_>>()
        .join(" or ")
}

fn format_attempts(attempts: &[ParseAttempt]) -> String {
    attempts
        .iter()
        .map(|a| format!("{} error message:\n\n  {}", a.format, a.message))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A single schema violation at a concrete location in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted path into the document, e.g. `work[0].startDate`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Every violation found in one validation pass.
///
/// Non-empty exactly when validation failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport(pub Vec<Violation>);

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// Each violation formatted as `"<path>: <message>"`.
    pub fn lines(&self) -> Vec<String> {
        self.0.iter().map(Violation::to_string).collect()
    }
}

/// A schema failure: the validator's summary plus the full report.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{}", format_aggregated(.summary, .report))]
pub struct AggregatedError {
    pub summary: String,
    pub report: ValidationReport,
}

fn format_aggregated(summary: &str, report: &ValidationReport) -> String {
    std::iter::once(summary.to_string())
        .chain(report.lines())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> ValidationReport {
        ValidationReport(vec![
            Violation {
                path: "basics".into(),
                message: "\"email\" is a required property".into(),
            },
            Violation {
                path: "work[0].startDate".into(),
                message: "\"soon\" does not match pattern".into(),
            },
        ])
    }

    #[test]
    fn aggregated_error_lists_one_line_per_violation() {
        let e = AggregatedError {
            summary: "Validation failed".into(),
            report: sample_report(),
        };
        let msg = e.to_string();
        let lines: Vec<&str> = msg.lines().collect();
        assert_eq!(lines.len(), 3, "got: {msg}");
        assert_eq!(lines[0], "Validation failed");
        assert_eq!(lines[1], "basics: \"email\" is a required property");
        assert!(lines[2].starts_with("work[0].startDate: "));
    }

    #[test]
    fn validation_error_is_transparent() {
        let e: Resume2PdfError = AggregatedError {
            summary: "Validation failed".into(),
            report: sample_report(),
        }
        .into();
        assert_eq!(e.kind(), ErrorKind::Validation);
        assert_eq!(e.validation_report().map(|r| r.len()), Some(2));
        assert!(e.to_string().starts_with("Validation failed\n"));
    }

    #[test]
    fn parse_error_labels_every_attempt() {
        let e = Resume2PdfError::Parse {
            path: "/tmp/resume.json".into(),
            attempts: vec![
                ParseAttempt {
                    format: "JSON",
                    message: "key must be a string".into(),
                },
                ParseAttempt {
                    format: "JSON5",
                    message: "expected identifier".into(),
                },
            ],
        };
        let msg = e.to_string();
        assert!(msg.contains("JSON or JSON5"), "got: {msg}");
        assert!(msg.contains("JSON error message:\n\n  key must be a string"));
        assert!(msg.contains("JSON5 error message:\n\n  expected identifier"));
        assert_eq!(e.kind(), ErrorKind::Parse);
    }

    #[test]
    fn relative_path_display() {
        let e = Resume2PdfError::RelativePath {
            role: "Input file",
            path: "out/resume.html".into(),
        };
        assert_eq!(
            e.to_string(),
            "Input file must be an absolute path, got 'out/resume.html'"
        );
        assert_eq!(e.kind(), ErrorKind::Path);
    }

    #[test]
    fn kinds_cover_delegated_failures() {
        let export = Resume2PdfError::ExportTimeout { secs: 30 };
        assert_eq!(export.kind(), ErrorKind::Export);
        assert!(export.to_string().contains("30s"));

        let annot = Resume2PdfError::EmptyPdf {
            path: "/tmp/a.pdf".into(),
        };
        assert_eq!(annot.kind(), ErrorKind::Annotation);

        let render = Resume2PdfError::Template {
            detail: "unclosed block".into(),
        };
        assert_eq!(render.kind(), ErrorKind::Render);
    }
}
