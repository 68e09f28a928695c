//! HTML rendering through handlebars.

use crate::error::Resume2PdfError;
use crate::helpers::register_helpers;
use crate::pipeline::input::{read_text, write_text};
use handlebars::Handlebars;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Engine with the résumé helpers registered.
///
/// HTML escaping stays on; templates opt out with triple braces for the
/// pre-rendered `summary` fields.
pub fn engine(strict: bool) -> Handlebars<'static> {
    let mut hb = Handlebars::new();
    hb.set_strict_mode(strict);
    register_helpers(&mut hb);
    hb
}

/// Render `template` with `document` as the context.
pub fn render_str(template: &str, document: &Value, strict: bool) -> Result<String, Resume2PdfError> {
    engine(strict)
        .render_template(template, document)
        .map_err(|e| Resume2PdfError::Template {
            detail: e.to_string(),
        })
}

/// Render the template at `template_path` and write the HTML to `output_path`.
///
/// Returns the number of bytes written.
pub async fn render(
    template_path: &Path,
    document: &Value,
    output_path: &Path,
    strict: bool,
) -> Result<usize, Resume2PdfError> {
    let template = read_text(template_path).await?;
    render_to(&template, document, output_path, strict).await
}

/// [`render`] with the template source already in memory.
pub async fn render_to(
    template: &str,
    document: &Value,
    output_path: &Path,
    strict: bool,
) -> Result<usize, Resume2PdfError> {
    let html = render_str(template, document, strict)?;
    debug!("Rendered HTML:\n{html}");
    write_text(output_path, &html).await?;
    info!("Wrote {} bytes of HTML to {}", html.len(), output_path.display());
    Ok(html.len())
}
