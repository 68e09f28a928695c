//! Configuration types for résumé-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The branding constants live in
//! [`BrandingConfig`] and the headless-browser settings in [`BrowserConfig`];
//! both have defaults that reproduce the standard letter-sized output.

use crate::error::Resume2PdfError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for a résumé-to-PDF conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use resume2pdf::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .bar_height_inches(1.0 / 3.0)
///     .brand_color(0x1E90FF)
///     .export_timeout_secs(30)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Default)]
pub struct ConversionConfig {
    /// Schema the document is validated against. If None, uses the bundled
    /// JSON Resume schema from [`crate::assets::RESUME_SCHEMA`].
    pub schema: Option<serde_json::Value>,

    /// Branding bar drawn on every exported page.
    pub branding: BrandingConfig,

    /// Headless browser used to export HTML to PDF.
    pub browser: BrowserConfig,

    /// Fail on template references to missing fields. Default: false.
    ///
    /// Résumé sections are almost all optional, so templates routinely probe
    /// fields that a given document does not have.
    pub strict_templates: bool,

    /// Where to keep the intermediate HTML. If None, the HTML is written to a
    /// temporary directory that is removed once the PDF is branded.
    pub keep_html: Option<PathBuf>,

    /// Receives stage start/complete/error events.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("schema", &self.schema.as_ref().map(|_| "<custom schema>"))
            .field("branding", &self.branding)
            .field("browser", &self.browser)
            .field("strict_templates", &self.strict_templates)
            .field("keep_html", &self.keep_html)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn PipelineProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Geometry and colour of the branding bar.
///
/// The bar height scales with the first page's height: a page of
/// `reference_page_height_inches` is assumed, so one inch is
/// `page_height / reference_page_height_inches` PDF units and the bar is
/// `bar_height_inches` of those.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrandingConfig {
    /// Draw the bar at all. Default: true.
    pub enabled: bool,

    /// Fill colour as `0xRRGGBB`. Default: `0x6EFF00`.
    pub color: u32,

    /// Bar height in reference inches. Default: 0.25.
    pub bar_height_inches: f64,

    /// Page height the scale is derived from, in inches. Default: 11 (US Letter).
    pub reference_page_height_inches: f64,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: 0x6EFF00,
            bar_height_inches: 0.25,
            reference_page_height_inches: 11.0,
        }
    }
}

impl BrandingConfig {
    /// The fill colour as normalised `(r, g, b)` components in `0.0..=1.0`.
    pub fn rgb(&self) -> (f32, f32, f32) {
        let channel = |shift: u32| ((self.color >> shift) & 0xFF) as f32 / 255.0;
        (channel(16), channel(8), channel(0))
    }
}

/// Settings for the headless-browser PDF exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Browser executable. If None, `CHROME_PATH` is consulted, then a list of
    /// well-known Chromium binary names is probed on `PATH`.
    pub executable: Option<PathBuf>,

    /// Seconds to wait for the export before killing the browser. Default: 60.
    pub timeout_secs: u64,

    /// Extra command-line switches passed to the browser.
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            timeout_secs: 60,
            extra_args: Vec::new(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn schema(mut self, schema: serde_json::Value) -> Self {
        self.config.schema = Some(schema);
        self
    }

    pub fn branding(mut self, branding: BrandingConfig) -> Self {
        self.config.branding = branding;
        self
    }

    pub fn brand(mut self, enabled: bool) -> Self {
        self.config.branding.enabled = enabled;
        self
    }

    pub fn brand_color(mut self, rgb: u32) -> Self {
        self.config.branding.color = rgb;
        self
    }

    pub fn bar_height_inches(mut self, inches: f64) -> Self {
        self.config.branding.bar_height_inches = inches;
        self
    }

    pub fn reference_page_height_inches(mut self, inches: f64) -> Self {
        self.config.branding.reference_page_height_inches = inches;
        self
    }

    pub fn browser_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.browser.executable = Some(path.into());
        self
    }

    pub fn export_timeout_secs(mut self, secs: u64) -> Self {
        self.config.browser.timeout_secs = secs;
        self
    }

    pub fn browser_arg(mut self, arg: impl Into<String>) -> Self {
        self.config.browser.extra_args.push(arg.into());
        self
    }

    pub fn strict_templates(mut self, v: bool) -> Self {
        self.config.strict_templates = v;
        self
    }

    pub fn keep_html(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.keep_html = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Resume2PdfError> {
        let b = &self.config.branding;
        if b.color > 0xFF_FFFF {
            return Err(Resume2PdfError::InvalidConfig(format!(
                "brand colour must be 0xRRGGBB, got {:#X}",
                b.color
            )));
        }
        if !(b.reference_page_height_inches.is_finite() && b.reference_page_height_inches > 0.0) {
            return Err(Resume2PdfError::InvalidConfig(format!(
                "reference page height must be > 0 inches, got {}",
                b.reference_page_height_inches
            )));
        }
        if !(b.bar_height_inches.is_finite()
            && b.bar_height_inches > 0.0
            && b.bar_height_inches < b.reference_page_height_inches)
        {
            return Err(Resume2PdfError::InvalidConfig(format!(
                "bar height must be between 0 and {} inches, got {}",
                b.reference_page_height_inches, b.bar_height_inches
            )));
        }
        if self.config.browser.timeout_secs == 0 {
            return Err(Resume2PdfError::InvalidConfig(
                "export timeout must be ≥ 1 second".into(),
            ));
        }
        if let Some(ref path) = self.config.keep_html {
            if !path.is_absolute() {
                return Err(Resume2PdfError::InvalidConfig(format!(
                    "HTML output path must be absolute, got '{}'",
                    path.display()
                )));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_letter_branding() {
        let config = ConversionConfig::default();
        assert!(config.branding.enabled);
        assert_eq!(config.branding.color, 0x6EFF00);
        assert_eq!(config.branding.bar_height_inches, 0.25);
        assert_eq!(config.branding.reference_page_height_inches, 11.0);
        assert_eq!(config.browser.timeout_secs, 60);
        assert!(config.schema.is_none());
    }

    #[test]
    fn rgb_splits_channels() {
        let branding = BrandingConfig {
            color: 0xFF8000,
            ..Default::default()
        };
        let (r, g, b) = branding.rgb();
        assert_eq!(r, 1.0);
        assert!((g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(b, 0.0);
    }

    #[test]
    fn builder_rejects_degenerate_bar() {
        assert!(ConversionConfig::builder()
            .bar_height_inches(0.0)
            .build()
            .is_err());
        assert!(ConversionConfig::builder()
            .bar_height_inches(12.0)
            .build()
            .is_err());
        assert!(ConversionConfig::builder()
            .reference_page_height_inches(-1.0)
            .build()
            .is_err());
    }

    #[test]
    fn builder_rejects_bad_colour_and_timeout() {
        assert!(ConversionConfig::builder()
            .brand_color(0x1_000_000)
            .build()
            .is_err());
        assert!(ConversionConfig::builder()
            .export_timeout_secs(0)
            .build()
            .is_err());
    }

    #[test]
    fn builder_requires_absolute_html_path() {
        assert!(ConversionConfig::builder()
            .keep_html("out/resume.html")
            .build()
            .is_err());
        let config = ConversionConfig::builder()
            .keep_html("/tmp/resume.html")
            .browser_arg("--disable-gpu")
            .build()
            .unwrap();
        assert_eq!(config.browser.extra_args, vec!["--disable-gpu"]);
    }
}
