//! Pipeline orchestration.
//!
//! Stages run strictly in sequence: each one finishes, including tearing down
//! the browser process, before the next begins. The first failing stage
//! aborts the run; no partial output is reported alongside an error.

use crate::assets::{resume_schema, DEFAULT_TEMPLATE};
use crate::config::ConversionConfig;
use crate::error::Resume2PdfError;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::export::{ChromeExporter, PdfExporter};
use crate::pipeline::{brand, input, load, preprocess, template};
use crate::progress::Stage;
use serde_json::Value;
use std::future::Future;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// File name of the intermediate HTML when it is not kept.
const HTML_FILE_NAME: &str = "resume.html";

/// Convert a résumé file into a branded PDF.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input`: absolute path to a JSON or JSON5 résumé
/// * `template`: absolute path to a handlebars template, or `None` for the
///   bundled one
/// * `output_pdf`: absolute path of the PDF to produce (overwritten)
/// * `config`: conversion configuration
///
/// # Errors
/// Relative paths fail before any I/O. After that, the first failing stage's
/// error is returned: I/O, parse, validation, render, export or annotation.
pub async fn convert(
    input: impl AsRef<Path>,
    template: Option<&Path>,
    output_pdf: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Resume2PdfError> {
    let exporter = ChromeExporter::new(config.browser.clone());
    convert_with_exporter(input.as_ref(), template, output_pdf.as_ref(), config, &exporter).await
}

/// [`convert`] with a caller-supplied PDF exporter.
pub async fn convert_with_exporter(
    input_path: &Path,
    template_path: Option<&Path>,
    output_pdf: &Path,
    config: &ConversionConfig,
    exporter: &dyn PdfExporter,
) -> Result<ConversionOutput, Resume2PdfError> {
    let total_start = Instant::now();

    // ── Preconditions ────────────────────────────────────────────────────
    input::require_absolute(input_path, "Input file")?;
    if let Some(path) = template_path {
        input::require_absolute(path, "Template")?;
    }
    input::require_absolute(output_pdf, "Output PDF")?;
    if let Some(ref path) = config.keep_html {
        input::require_absolute(path, "HTML output")?;
    }
    info!(
        "Starting conversion: {} → {}",
        input_path.display(),
        output_pdf.display()
    );

    let schema = match config.schema {
        Some(ref schema) => schema.clone(),
        None => resume_schema()?,
    };
    let mut stats = ConversionStats::default();

    // ── Step 1: Load + validate ──────────────────────────────────────────
    let (document, ms) = run_stage(config, Stage::Load, load::load(input_path, &schema)).await?;
    stats.load_ms = ms;

    // ── Step 2: Preprocess ───────────────────────────────────────────────
    let (document, ms) = run_stage(config, Stage::Preprocess, async {
        Ok(preprocess::preprocess(document))
    })
    .await?;
    stats.preprocess_ms = ms;

    // ── Step 3: Render HTML ──────────────────────────────────────────────
    // The temp dir must outlive the export stage, which reads the HTML.
    let (html_path, _html_dir) = match config.keep_html {
        Some(ref path) => (path.clone(), None),
        None => {
            let dir = tempfile::TempDir::new()
                .map_err(|e| Resume2PdfError::Internal(format!("tempdir: {e}")))?;
            (dir.path().join(HTML_FILE_NAME), Some(dir))
        }
    };
    let strict = config.strict_templates;
    let render = async {
        match template_path {
            Some(path) => template::render(path, &document, &html_path, strict).await,
            None => template::render_to(DEFAULT_TEMPLATE, &document, &html_path, strict).await,
        }
    };
    let (html_bytes, ms) = run_stage(config, Stage::Render, render).await?;
    stats.render_ms = ms;
    stats.html_bytes = html_bytes;

    // ── Step 4: Export PDF ───────────────────────────────────────────────
    let ((), ms) = run_stage(config, Stage::Export, exporter.to_pdf(&html_path, output_pdf)).await?;
    stats.export_ms = ms;

    // ── Step 5: Brand ────────────────────────────────────────────────────
    let page_count = if config.branding.enabled {
        let (pages, ms) = run_stage(
            config,
            Stage::Brand,
            brand::brand(output_pdf, &config.branding),
        )
        .await?;
        stats.brand_ms = ms;
        pages
    } else {
        brand::page_count(output_pdf).await?
    };

    stats.total_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Conversion complete: {} page(s), {}ms total",
        page_count, stats.total_ms
    );

    Ok(ConversionOutput {
        pdf_path: output_pdf.to_path_buf(),
        html_path: config.keep_html.clone(),
        page_count,
        branded: config.branding.enabled,
        stats,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    template: Option<&Path>,
    output_pdf: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Resume2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Resume2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input, template, output_pdf, config))
}

/// Load and validate a résumé without rendering anything.
///
/// Returns the validated document exactly as parsed.
pub async fn inspect(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<Value, Resume2PdfError> {
    let path = input.as_ref();
    input::require_absolute(path, "Input file")?;
    let schema = match config.schema {
        Some(ref schema) => schema.clone(),
        None => resume_schema()?,
    };
    load::load(path, &schema).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Run one stage, reporting it to the progress callback and timing it.
async fn run_stage<T>(
    config: &ConversionConfig,
    stage: Stage,
    work: impl Future<Output = Result<T, Resume2PdfError>>,
) -> Result<(T, u64), Resume2PdfError> {
    let cb = config.progress_callback.as_ref();
    if let Some(cb) = cb {
        cb.on_stage_start(stage);
    }
    let start = Instant::now();
    match work.await {
        Ok(value) => {
            let elapsed_ms = start.elapsed().as_millis() as u64;
            info!("Stage {} finished in {}ms", stage, elapsed_ms);
            if let Some(cb) = cb {
                cb.on_stage_complete(stage, elapsed_ms);
            }
            Ok((value, elapsed_ms))
        }
        Err(e) => {
            if let Some(cb) = cb {
                cb.on_stage_error(stage, &e.to_string());
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::progress::PipelineProgressCallback;
    use futures::future::BoxFuture;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Fails every export; the pipeline must stop there.
    struct FailingExporter;

    impl PdfExporter for FailingExporter {
        fn to_pdf<'a>(
            &'a self,
            _html_path: &'a Path,
            _pdf_path: &'a Path,
        ) -> BoxFuture<'a, Result<(), Resume2PdfError>> {
            Box::pin(async {
                Err(Resume2PdfError::Export {
                    detail: "navigation failed".into(),
                })
            })
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl PipelineProgressCallback for Recorder {
        fn on_stage_start(&self, stage: Stage) {
            self.0.lock().unwrap().push(format!("start:{stage}"));
        }
        fn on_stage_complete(&self, stage: Stage, _elapsed_ms: u64) {
            self.0.lock().unwrap().push(format!("done:{stage}"));
        }
        fn on_stage_error(&self, stage: Stage, _error: &str) {
            self.0.lock().unwrap().push(format!("error:{stage}"));
        }
    }

    const VALID: &str = r#"{"basics":{"name":"Ada","label":"Analyst","email":"ada@example.com"}}"#;

    #[tokio::test]
    async fn test_relative_paths_fail_before_io() {
        let config = ConversionConfig::default();
        let err = convert_with_exporter(
            Path::new("/does/not/exist.json"),
            None,
            Path::new("out.pdf"),
            &config,
            &FailingExporter,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Path);

        let err = convert_with_exporter(
            Path::new("/does/not/exist.json"),
            Some(Path::new("theme.hbs")),
            Path::new("/tmp/out.pdf"),
            &config,
            &FailingExporter,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Path);
    }

    #[tokio::test]
    async fn test_relative_keep_html_fails_before_any_stage() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("resume.json");
        tokio::fs::write(&input, VALID).await.unwrap();

        let recorder = Arc::new(Recorder::default());
        let mut config = ConversionConfig::default();
        config.keep_html = Some(PathBuf::from("kept-resume.html"));
        config.progress_callback = Some(recorder.clone() as Arc<dyn PipelineProgressCallback>);

        let err = convert_with_exporter(
            &input,
            None,
            &dir.path().join("resume.pdf"),
            &config,
            &FailingExporter,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Path);
        assert!(!Path::new("kept-resume.html").exists());
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_failure_stops_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("resume.json");
        let html = dir.path().join("resume.html");
        tokio::fs::write(&input, VALID).await.unwrap();

        let recorder = Arc::new(Recorder::default());
        let config = ConversionConfig::builder()
            .keep_html(&html)
            .progress_callback(recorder.clone())
            .build()
            .unwrap();

        let err = convert_with_exporter(
            &input,
            None,
            &dir.path().join("resume.pdf"),
            &config,
            &FailingExporter,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Export);
        assert!(html.exists(), "HTML is written before export runs");
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![
                "start:load",
                "done:load",
                "start:preprocess",
                "done:preprocess",
                "start:render",
                "done:render",
                "start:export",
                "error:export",
            ]
        );
    }

    #[tokio::test]
    async fn test_inspect_returns_validated_document() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("resume.json");
        tokio::fs::write(&input, VALID).await.unwrap();

        let doc = inspect(&input, &ConversionConfig::default()).await.unwrap();
        assert_eq!(doc["basics"]["name"], "Ada");
    }

    #[tokio::test]
    async fn test_inspect_with_custom_schema() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("resume.json");
        tokio::fs::write(&input, "{}").await.unwrap();

        let permissive = ConversionConfig::builder()
            .schema(serde_json::json!({ "type": "object" }))
            .build()
            .unwrap();
        assert!(inspect(&input, &permissive).await.is_ok());

        let err = inspect(&input, &ConversionConfig::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
