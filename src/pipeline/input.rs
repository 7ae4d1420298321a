//! Input resolution: read the local PDF and derive its base name.
//!
//! The whole file is read up front, so no handle stays open across the
//! network calls and a missing or unreadable file fails before any request
//! is sent.

use crate::error::CoverMetaError;
use crate::gemini::types::PDF_MIME_TYPE;
use crate::gemini::FileUpload;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Fallback when a path has no final component (e.g. `/`).
const DEFAULT_FILE_NAME: &str = "document.pdf";

/// A local file, read into memory.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub path: PathBuf,
    /// Final path component, sent as the upload file name.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        Self {
            path: PathBuf::from(&file_name),
            file_name,
            bytes,
        }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when the content starts with the `%PDF` magic bytes.
    pub fn looks_like_pdf(&self) -> bool {
        self.bytes.starts_with(b"%PDF")
    }

    /// Hand the content over to the upload stage.
    pub fn into_upload(self) -> FileUpload {
        FileUpload {
            file_name: self.file_name,
            mime_type: PDF_MIME_TYPE.to_string(),
            bytes: self.bytes,
        }
    }
}

/// Base name of a path, as sent to the upload endpoint.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
}

/// Read a local file fully into memory.
///
/// The content is not validated beyond a warning when it lacks the PDF
/// magic bytes; the service decides what it accepts.
pub async fn read_input(path_str: &str) -> Result<InputFile, CoverMetaError> {
    let path = PathBuf::from(path_str);

    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => CoverMetaError::FileNotFound { path: path.clone() },
        ErrorKind::PermissionDenied => CoverMetaError::PermissionDenied { path: path.clone() },
        _ => CoverMetaError::ReadFailed {
            path: path.clone(),
            source: e,
        },
    })?;

    let input = InputFile {
        file_name: file_name_of(&path),
        path,
        bytes,
    };

    if !input.looks_like_pdf() {
        warn!(
            "'{}' does not start with %PDF; uploading it as application/pdf anyway",
            input.path.display()
        );
    }
    debug!("Read {} ({} bytes)", input.path.display(), input.len());
    Ok(input)
}
