//! HTML → PDF export.
//!
//! The pipeline only depends on the [`PdfExporter`] trait, so tests can swap
//! in an exporter that writes a fixed PDF. The shipped implementation drives
//! a headless Chromium-family browser with `--print-to-pdf`; the page size
//! comes from the template's `@page` rule (US Letter for the bundled one).

use crate::config::BrowserConfig;
use crate::error::Resume2PdfError;
use crate::pipeline::input::require_absolute;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Environment variable naming the browser executable.
pub const CHROME_PATH_ENV: &str = "CHROME_PATH";

/// Binary names probed on `PATH`, in order.
pub const BROWSER_CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
    "microsoft-edge",
];

/// Turns a rendered HTML file into a PDF.
///
/// Both paths must be absolute. Implementations must have fully released
/// any external resource by the time the future resolves.
pub trait PdfExporter: Send + Sync {
    fn to_pdf<'a>(
        &'a self,
        html_path: &'a Path,
        pdf_path: &'a Path,
    ) -> BoxFuture<'a, Result<(), Resume2PdfError>>;
}

/// Headless Chromium exporter.
#[derive(Debug, Clone, Default)]
pub struct ChromeExporter {
    config: BrowserConfig,
}

impl ChromeExporter {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    /// Resolve the browser executable.
    ///
    /// Order: configured executable, `CHROME_PATH`, then [`BROWSER_CANDIDATES`]
    /// on `PATH`.
    pub fn locate(&self) -> Result<PathBuf, Resume2PdfError> {
        if let Some(ref exe) = self.config.executable {
            return Ok(exe.clone());
        }
        if let Some(exe) = std::env::var_os(CHROME_PATH_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(exe));
        }
        BROWSER_CANDIDATES
            .iter()
            .find_map(|name| find_on_path(name))
            .ok_or_else(|| Resume2PdfError::BrowserNotFound {
                tried: format!("${CHROME_PATH_ENV}, {}", BROWSER_CANDIDATES.join(", ")),
            })
    }

    async fn export(&self, html_path: &Path, pdf_path: &Path) -> Result<(), Resume2PdfError> {
        require_absolute(html_path, "HTML path")?;
        require_absolute(pdf_path, "PDF path")?;

        let exe = self.locate()?;
        let url = Url::from_file_path(html_path).map_err(|_| Resume2PdfError::Export {
            detail: format!("cannot build a file URL for '{}'", html_path.display()),
        })?;

        // A stale PDF would otherwise pass the existence check below.
        match tokio::fs::remove_file(pdf_path).await {
            Ok(()) => debug!("Removed stale {}", pdf_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(Resume2PdfError::WriteFailed {
                    path: pdf_path.to_path_buf(),
                    source,
                })
            }
        }

        let mut cmd = tokio::process::Command::new(&exe);
        cmd.args(["--headless", "--disable-gpu", "--no-pdf-header-footer"])
            .arg(format!("--print-to-pdf={}", pdf_path.display()))
            .args(&self.config.extra_args)
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        info!("Exporting {} with {}", url, exe.display());
        let secs = self.config.timeout_secs;
        let output = tokio::time::timeout(Duration::from_secs(secs), cmd.output())
            .await
            .map_err(|_| Resume2PdfError::ExportTimeout { secs })?
            .map_err(|e| Resume2PdfError::Export {
                detail: format!("failed to launch '{}': {e}", exe.display()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Resume2PdfError::Export {
                detail: format!(
                    "'{}' exited with {}: {}",
                    exe.display(),
                    output.status,
                    stderr.trim()
                ),
            });
        }

        match tokio::fs::metadata(pdf_path).await {
            Ok(meta) if meta.len() > 0 => {
                debug!("Exported {} bytes to {}", meta.len(), pdf_path.display());
                Ok(())
            }
            _ => Err(Resume2PdfError::Export {
                detail: format!(
                    "'{}' exited successfully but wrote no PDF to '{}'",
                    exe.display(),
                    pdf_path.display()
                ),
            }),
        }
    }
}

impl PdfExporter for ChromeExporter {
    fn to_pdf<'a>(
        &'a self,
        html_path: &'a Path,
        pdf_path: &'a Path,
    ) -> BoxFuture<'a, Result<(), Resume2PdfError>> {
        Box::pin(self.export(html_path, pdf_path))
    }
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
