//! # resume2pdf
//!
//! Turn a JSON Resume document into a branded, letter-sized PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! résumé.json / résumé.json5
//!  │
//!  ├─ 1. Load        parse JSON, fall back to JSON5, validate (draft-04 schema)
//!  ├─ 2. Preprocess  summary → HTML, website → URL object, at any depth
//!  ├─ 3. Render      handlebars template + formatDate/duration/year helpers
//!  ├─ 4. Export      headless Chromium --print-to-pdf
//!  └─ 5. Brand       bar along the bottom of every page, sized from page height
//! ```
//!
//! Validation collects every schema violation in one pass, so the error lists
//! all of them as `path: message` lines.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume2pdf::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert("/home/ada/resume.json", None, "/home/ada/resume.pdf", &config).await?;
//!     eprintln!("{} page(s) in {}ms", output.page_count, output.stats.total_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `resume2pdf` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! resume2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assets;
pub mod config;
pub mod convert;
pub mod error;
pub mod helpers;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{BrandingConfig, BrowserConfig, ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_sync, convert_with_exporter, inspect};
pub use error::{AggregatedError, ErrorKind, Resume2PdfError, ValidationReport, Violation};
pub use output::{ConversionOutput, ConversionStats};
pub use pipeline::export::{ChromeExporter, PdfExporter};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback, Stage};
