//! CLI binary for resume2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use resume2pdf::{
    convert, inspect, ConversionConfig, PipelineProgressCallback, ProgressCallback, Stage,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner showing the running stage, with one log line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Starting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    /// Stop the spinner. The last stage to run is Export when branding is off.
    fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Load => "Loading résumé",
        Stage::Preprocess => "Preprocessing",
        Stage::Render => "Rendering HTML",
        Stage::Export => "Exporting PDF",
        Stage::Brand => "Branding pages",
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(stage.to_string());
        self.bar.set_message(format!("{}…", stage_label(stage)));
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} {:<16} {}",
            green("✓"),
            stage_label(stage),
            dim(&format!("{elapsed_ms}ms")),
        ));
        if stage == Stage::Brand {
            self.bar.finish_and_clear();
        }
    }

    fn on_stage_error(&self, stage: Stage, _error: &str) {
        self.bar.println(format!("  {} {}", red("✗"), stage_label(stage)));
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert with the bundled template (writes resume.pdf next to the input)
  resume2pdf resume.json

  # Custom template, keep the intermediate HTML
  resume2pdf resume.json5 -t theme.hbs --html resume.html -o out/cv.pdf

  # Validate only
  resume2pdf --check resume.json

  # Different bar colour and height
  resume2pdf --brand-color 1E90FF --bar-height 0.333 resume.json

ENVIRONMENT VARIABLES:
  CHROME_PATH             Browser executable used when --browser is not set
  RUST_LOG                Overrides the log filter (e.g. resume2pdf=debug)
"#;

/// Render a JSON Resume document to a branded PDF.
#[derive(Parser, Debug)]
#[command(
    name = "resume2pdf",
    version,
    about = "Render a JSON Resume document to a branded PDF",
    long_about = "Validate a JSON or JSON5 résumé against the JSON Resume schema, render it \
through a handlebars template, print it to PDF with headless Chromium and stamp a branding \
bar along the bottom of every page.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Résumé file (JSON or JSON5).
    input: PathBuf,

    /// PDF to write. Default: the input path with a .pdf extension.
    #[arg(short, long, env = "RESUME2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// Handlebars template. Default: the bundled template.
    #[arg(short, long, env = "RESUME2PDF_TEMPLATE")]
    template: Option<PathBuf>,

    /// Keep the rendered HTML at this path.
    #[arg(long, env = "RESUME2PDF_HTML")]
    html: Option<PathBuf>,

    /// JSON schema to validate against instead of the bundled one.
    #[arg(long, env = "RESUME2PDF_SCHEMA")]
    schema: Option<PathBuf>,

    /// Skip the branding bar.
    #[arg(long, env = "RESUME2PDF_NO_BRAND")]
    no_brand: bool,

    /// Branding bar colour as RRGGBB hex.
    #[arg(long, env = "RESUME2PDF_BRAND_COLOR", default_value = "6EFF00", value_parser = parse_color)]
    brand_color: u32,

    /// Branding bar height in inches of an 11-inch reference page.
    #[arg(long, env = "RESUME2PDF_BAR_HEIGHT", default_value_t = 0.25)]
    bar_height: f64,

    /// Reference page height in inches used to scale the bar.
    #[arg(long, env = "RESUME2PDF_REFERENCE_HEIGHT", default_value_t = 11.0)]
    reference_height: f64,

    /// Browser executable (Chromium, Chrome or Edge).
    #[arg(long, env = "RESUME2PDF_BROWSER")]
    browser: Option<PathBuf>,

    /// Extra switch passed to the browser; repeatable.
    #[arg(long = "browser-arg", allow_hyphen_values = true)]
    browser_args: Vec<String>,

    /// Seconds to wait for the PDF export.
    #[arg(long, env = "RESUME2PDF_TIMEOUT", default_value_t = 60)]
    timeout: u64,

    /// Fail when the template references a missing field.
    #[arg(long, env = "RESUME2PDF_STRICT")]
    strict: bool,

    /// Validate the résumé and exit.
    #[arg(long)]
    check: bool,

    /// Print structured JSON (ConversionOutput) to stdout.
    #[arg(long, env = "RESUME2PDF_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "RESUME2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RESUME2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "RESUME2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO logs would interleave with the spinner, so they are only shown
    // when it is off.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.check;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let input = absolute(&cli.input)?;

    let spinner = show_progress.then(CliProgressCallback::new);
    let progress_cb = spinner
        .clone()
        .map(|cb| cb as Arc<dyn PipelineProgressCallback>);
    let config = build_config(&cli, progress_cb).await?;

    // ── Check-only mode ──────────────────────────────────────────────────
    if cli.check {
        let document = inspect(&input, &config)
            .await
            .context("Résumé is not valid")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&document).context("Failed to serialise document")?
            );
        } else if !cli.quiet {
            let name = document["basics"]["name"].as_str().unwrap_or("(unnamed)");
            eprintln!("{} {} is valid", green("✔"), bold(name));
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let output_pdf = match cli.output {
        Some(ref path) => absolute(path)?,
        None => input.with_extension("pdf"),
    };
    let template = cli.template.as_deref().map(absolute).transpose()?;

    let result = convert(&input, template.as_deref(), &output_pdf, &config).await;
    if let Some(ref spinner) = spinner {
        spinner.finish();
    }
    let output = result.context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        eprintln!(
            "{}  {} page(s)  {}ms  →  {}",
            green("✔"),
            output.page_count,
            output.stats.total_ms,
            bold(&output.pdf_path.display().to_string()),
        );
        if let Some(ref html) = output.html_path {
            eprintln!("   HTML kept at {}", dim(&html.display().to_string()));
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .brand(!cli.no_brand)
        .brand_color(cli.brand_color)
        .bar_height_inches(cli.bar_height)
        .reference_page_height_inches(cli.reference_height)
        .export_timeout_secs(cli.timeout)
        .strict_templates(cli.strict);

    if let Some(ref path) = cli.schema {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read schema from {:?}", path))?;
        let schema: serde_json::Value =
            serde_json::from_str(&text).with_context(|| format!("Schema {:?} is not JSON", path))?;
        builder = builder.schema(schema);
    }
    if let Some(ref path) = cli.html {
        builder = builder.keep_html(absolute(path)?);
    }
    if let Some(ref exe) = cli.browser {
        builder = builder.browser_executable(exe.clone());
    }
    for arg in &cli.browser_args {
        builder = builder.browser_arg(arg.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// The library requires absolute paths; resolve CLI paths against the cwd.
fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Cannot resolve path {:?}", path))
}

/// Parse `RRGGBB`, `#RRGGBB` or `0xRRGGBB`.
fn parse_color(s: &str) -> Result<u32, String> {
    let hex = s
        .trim()
        .trim_start_matches('#')
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    if hex.len() != 6 {
        return Err(format!("expected 6 hex digits, got '{s}'"));
    }
    u32::from_str_radix(hex, 16).map_err(|e| format!("invalid colour '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_finishes_without_brand_stage() {
        let cb = CliProgressCallback::new();
        for stage in [Stage::Load, Stage::Preprocess, Stage::Render, Stage::Export] {
            cb.on_stage_start(stage);
            cb.on_stage_complete(stage, 1);
        }
        assert!(!cb.bar.is_finished());
        cb.finish();
        assert!(cb.bar.is_finished());
    }

    #[test]
    fn test_finish_after_brand_stage_is_harmless() {
        let cb = CliProgressCallback::new();
        cb.on_stage_start(Stage::Brand);
        cb.on_stage_complete(Stage::Brand, 1);
        cb.finish();
        assert!(cb.bar.is_finished());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("6EFF00"), Ok(0x6EFF00));
        assert_eq!(parse_color("#1e90ff"), Ok(0x1E90FF));
        assert!(parse_color("fff").is_err());
    }
}
