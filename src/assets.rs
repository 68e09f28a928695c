//! Bundled schema and template.
//!
//! Both are compiled into the binary so a conversion needs nothing but the
//! résumé file. Callers override them through
//! [`crate::config::ConversionConfig::schema`] and the template argument of
//! [`crate::convert::convert`].

use crate::error::Resume2PdfError;

/// JSON Resume schema (draft-04), accepting both the `website` and `url`
/// spellings of link fields. `basics` with a name, label and email is required.
pub const RESUME_SCHEMA: &str = include_str!("../assets/resume.schema.json");

/// Default single-column letter-sized handlebars template.
pub const DEFAULT_TEMPLATE: &str = include_str!("../assets/resume.hbs");

/// Parse [`RESUME_SCHEMA`].
pub fn resume_schema() -> Result<serde_json::Value, Resume2PdfError> {
    serde_json::from_str(RESUME_SCHEMA)
        .map_err(|e| Resume2PdfError::InvalidSchema(format!("bundled schema: {e}")))
}
