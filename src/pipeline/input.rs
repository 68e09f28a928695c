//! Path checks and text I/O shared by the pipeline stages.
//!
//! Every stage that touches the filesystem goes through here so that a
//! missing file, an unreadable file and a failed write surface as the same
//! typed errors no matter which stage hit them.

use crate::error::Resume2PdfError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reject relative paths before any I/O happens.
///
/// `role` names the argument in the error, e.g. `"Output PDF"`.
pub fn require_absolute(path: &Path, role: &'static str) -> Result<(), Resume2PdfError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(Resume2PdfError::RelativePath {
            role,
            path: path.to_path_buf(),
        })
    }
}

/// Read a UTF-8 text file.
pub async fn read_text(path: &Path) -> Result<String, Resume2PdfError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            debug!("Read {} bytes from {}", text.len(), path.display());
            Ok(text)
        }
        Err(e) => Err(map_read_error(path.to_path_buf(), e)),
    }
}

/// Write a text file, replacing whatever was there.
pub async fn write_text(path: &Path, contents: &str) -> Result<(), Resume2PdfError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| Resume2PdfError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

pub(crate) fn map_read_error(path: PathBuf, e: std::io::Error) -> Resume2PdfError {
    match e.kind() {
        std::io::ErrorKind::NotFound => Resume2PdfError::FileNotFound { path },
        std::io::ErrorKind::PermissionDenied => Resume2PdfError::PermissionDenied { path },
        _ => Resume2PdfError::ReadFailed { path, source: e },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_require_absolute() {
        assert!(require_absolute(Path::new("/tmp/resume.json"), "Input file").is_ok());

        let err = require_absolute(Path::new("resume.json"), "Input file").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Path);
        assert!(err.to_string().starts_with("Input file must be an absolute path"));
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_text(&dir.path().join("nope.json")).await.unwrap_err();
        assert!(matches!(err, Resume2PdfError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        write_text(&path, "<p>hi</p>").await.unwrap();
        assert_eq!(read_text(&path).await.unwrap(), "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_text(&dir.path().join("missing/out.html"), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, Resume2PdfError::WriteFailed { .. }));
    }

    #[test]
    fn test_read_error_mapping() {
        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(
            map_read_error("/a".into(), denied),
            Resume2PdfError::PermissionDenied { .. }
        ));
        let invalid = std::io::Error::from(std::io::ErrorKind::InvalidData);
        assert!(matches!(
            map_read_error("/a".into(), invalid),
            Resume2PdfError::ReadFailed { .. }
        ));
    }
}
