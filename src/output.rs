//! Result types returned by a successful conversion.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a finished pipeline run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The branded PDF.
    pub pdf_path: PathBuf,
    /// The intermediate HTML, when it was kept.
    pub html_path: Option<PathBuf>,
    /// Pages in the exported PDF.
    pub page_count: usize,
    /// Whether the branding bar was drawn.
    pub branded: bool,
    pub stats: ConversionStats,
}

/// Wall-clock timings per stage, in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub load_ms: u64,
    pub preprocess_ms: u64,
    pub render_ms: u64,
    pub export_ms: u64,
    pub brand_ms: u64,
    pub total_ms: u64,
    /// Bytes of rendered HTML.
    pub html_bytes: usize,
}
