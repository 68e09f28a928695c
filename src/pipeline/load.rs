//! Document loading: read, parse with format fallback, validate.
//!
//! Parsers are tried in order and the first success wins. When every parser
//! rejects the text, all of their messages are returned together in one
//! [`Resume2PdfError::Parse`] so the user can see why each interpretation
//! failed.

use crate::error::{ParseAttempt, Resume2PdfError};
use crate::pipeline::input::read_text;
use crate::pipeline::schema;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// One textual format the loader understands.
pub struct ParserAttempt {
    pub format: &'static str,
    pub parse: fn(&str) -> Result<Value, String>,
}

/// Strict JSON first, then the relaxed JSON5 superset.
pub const PARSERS: &[ParserAttempt] = &[
    ParserAttempt {
        format: "JSON",
        parse: parse_json,
    },
    ParserAttempt {
        format: "JSON5",
        parse: parse_json5,
    },
];

fn parse_json(text: &str) -> Result<Value, String> {
    serde_json::from_str(text).map_err(|e| e.to_string())
}

fn parse_json5(text: &str) -> Result<Value, String> {
    json5::from_str(text).map_err(|e| e.to_string())
}

/// Run `text` through `parsers` in order.
///
/// Returns the first successful parse, or every failure labelled by format.
pub fn parse_with(text: &str, parsers: &[ParserAttempt]) -> Result<Value, Vec<ParseAttempt>> {
    let mut attempts = Vec::with_capacity(parsers.len());
    for parser in parsers {
        match (parser.parse)(text) {
            Ok(value) => {
                debug!("Parsed document as {}", parser.format);
                return Ok(value);
            }
            Err(message) => attempts.push(ParseAttempt {
                format: parser.format,
                message,
            }),
        }
    }
    Err(attempts)
}

/// Load a résumé from `path` and validate it against `schema`.
///
/// On success the document is schema-valid and deep-equal to the parsed file.
pub async fn load(path: &Path, schema: &Value) -> Result<Value, Resume2PdfError> {
    info!("Loading résumé: {}", path.display());
    let text = read_text(path).await?;

    let document = parse_with(&text, PARSERS).map_err(|attempts| Resume2PdfError::Parse {
        path: path.to_path_buf(),
        attempts,
    })?;
    debug!("Parsed document: {document}");

    schema::validate(document, schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::resume_schema;
    use crate::error::ErrorKind;
    use serde_json::json;

    async fn load_text(text: &str) -> Result<Value, Resume2PdfError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.json");
        tokio::fs::write(&path, text).await.unwrap();
        load(&path, &resume_schema().unwrap()).await
    }

    #[tokio::test]
    async fn test_loads_strict_json() {
        let doc = json!({
            "basics": { "name": "Ada", "label": "Engineer", "email": "ada@example.com" },
            "skills": [{ "name": "Maths", "keywords": ["analysis"] }]
        });
        let loaded = load_text(&doc.to_string()).await.unwrap();
        assert_eq!(loaded, doc);
    }

    #[tokio::test]
    async fn test_falls_back_to_json5() {
        let text = r#"{
            // relaxed syntax
            basics: { name: 'Ada', label: 'Engineer', email: 'ada@example.com', },
        }"#;
        let loaded = load_text(text).await.unwrap();
        assert_eq!(loaded["basics"]["name"], "Ada");
    }

    #[tokio::test]
    async fn test_broken_text_reports_both_parsers() {
        let err = load_text("{invalid").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        match &err {
            Resume2PdfError::Parse { attempts, .. } => {
                let formats: Vec<&str> = attempts.iter().map(|a| a.format).collect();
                assert_eq!(formats, ["JSON", "JSON5"]);
                assert!(attempts.iter().all(|a| !a.message.is_empty()));
            }
            other => panic!("expected Parse, got {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("JSON error message:"));
        assert!(msg.contains("JSON5 error message:"));
    }

    #[tokio::test]
    async fn test_schema_violation_lists_missing_fields() {
        let err = load_text(r#"{"basics": {"name": "A"}}"#).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let msg = err.to_string();
        assert_eq!(msg.lines().count(), 3, "got: {msg}");
        assert!(msg.lines().skip(1).all(|l| l.starts_with("basics: ")));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = load(Path::new("/nonexistent/resume.json"), &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_first_successful_parser_wins() {
        let parsers = [
            ParserAttempt {
                format: "never",
                parse: |_| Err("nope".into()),
            },
            ParserAttempt {
                format: "JSON",
                parse: parse_json,
            },
        ];
        assert_eq!(parse_with("[1]", &parsers).unwrap(), json!([1]));

        let attempts = parse_with("x", &parsers[..1]).unwrap_err();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].message, "nope");
    }
}
