//! Schema validation with aggregated error reporting.
//!
//! The validator walks the whole document in one pass and collects every
//! violation, so a user fixing a résumé sees all problems at once rather than
//! one per run. Locations are reported as dotted paths (`work[0].startDate`)
//! instead of raw JSON pointers.

use crate::error::{AggregatedError, Resume2PdfError, ValidationReport, Violation};
use serde_json::Value;
use tracing::debug;

/// Summary line of every [`AggregatedError`] produced here.
pub const VALIDATION_SUMMARY: &str = "Validation failed";

/// Path used for violations on the document root itself.
pub const ROOT_PATH: &str = "(root)";

/// A compiled draft-04 schema.
pub struct SchemaValidator {
    inner: jsonschema::Validator,
}

impl SchemaValidator {
    /// Compile `schema`. Fails with [`Resume2PdfError::InvalidSchema`].
    pub fn new(schema: &Value) -> Result<Self, Resume2PdfError> {
        let inner = jsonschema::draft4::new(schema)
            .map_err(|e| Resume2PdfError::InvalidSchema(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Every violation in `document`. Empty when the document is valid.
    pub fn check(&self, document: &Value) -> ValidationReport {
        ValidationReport(
            self.inner
                .iter_errors(document)
                .map(|error| Violation {
                    path: pointer_to_path(&error.instance_path.to_string(), document),
                    message: error.to_string(),
                })
                .collect(),
        )
    }

    /// Return `document` unchanged if valid, otherwise an aggregated error.
    pub fn validate(&self, document: Value) -> Result<Value, Resume2PdfError> {
        let report = self.check(&document);
        if report.is_empty() {
            return Ok(document);
        }
        debug!("Schema validation found {} violation(s)", report.len());
        Err(AggregatedError {
            summary: VALIDATION_SUMMARY.to_string(),
            report,
        }
        .into())
    }
}

/// Compile `schema` and validate `document` against it.
pub fn validate(document: Value, schema: &Value) -> Result<Value, Resume2PdfError> {
    SchemaValidator::new(schema)?.validate(document)
}

/// `/work/0/startDate` → `work[0].startDate`; the empty pointer is the root.
///
/// A segment is written as an index only when it steps into an array of
/// `document`, so an object key such as `"2020"` stays a property.
pub fn pointer_to_path(pointer: &str, document: &Value) -> String {
    let mut path = String::new();
    let mut node = Some(document);
    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        match node {
            Some(Value::Array(items)) => {
                node = segment.parse::<usize>().ok().and_then(|i| items.get(i));
                path.push('[');
                path.push_str(&segment);
                path.push(']');
            }
            parent => {
                node = parent.and_then(|v| v.get(segment.as_str()));
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(&segment);
            }
        }
    }
    if path.is_empty() {
        ROOT_PATH.to_string()
    } else {
        path
    }
}
