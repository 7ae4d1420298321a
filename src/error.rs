//! Error types for the edgequake-covermeta library.
//!
//! Every failure is fatal for the run and surfaces as [`CoverMetaError`].
//! One variant is special: [`CoverMetaError::UploadRejected`] means the File
//! API answered with a non-200 status. Nothing is wrong with the local setup
//! and no analysis was attempted, so the CLI prints the status and body and
//! exits normally. Use [`CoverMetaError::is_upload_rejected`] to make the same
//! distinction in library code.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The network stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Multipart upload to the File API.
    Upload,
    /// `generateContent` call.
    Analyze,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Upload => f.write_str("upload"),
            Stage::Analyze => f.write_str("analyze"),
        }
    }
}

/// All errors returned by the edgequake-covermeta library.
#[derive(Debug, Error)]
pub enum CoverMetaError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Any other I/O failure while reading the input.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// No API key was supplied.
    #[error("Gemini API key is not configured.\nSet GEMINI_API_KEY or pass --api-key.")]
    MissingApiKey,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Service errors ────────────────────────────────────────────────────
    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    #[error("HTTP request failed during {stage}: {source}")]
    Http {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    /// The File API answered the upload with a non-200 status.
    #[error("Upload rejected with HTTP {status}: {body}")]
    UploadRejected { status: u16, body: String },

    /// `generateContent` answered with a non-success status.
    #[error("Generation request failed with HTTP {status}: {body}")]
    GenerationFailed { status: u16, body: String },

    /// A response body did not have the expected shape.
    #[error("Malformed {stage} response: {detail}")]
    MalformedResponse { stage: Stage, detail: String },

    /// The model's answer text did not parse as JSON.
    #[error("Model returned invalid metadata JSON: {detail}\nText: {text}")]
    InvalidMetadataJson { detail: String, text: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output JSON file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoverMetaError {
    /// True when the upload endpoint refused the file with a non-200 status.
    pub fn is_upload_rejected(&self) -> bool {
        matches!(self, CoverMetaError::UploadRejected { .. })
    }

    /// True for failures of the analysis stage, the ones file-name
    /// inference may stand in for.
    pub fn is_analysis_failure(&self) -> bool {
        match self {
            CoverMetaError::GenerationFailed { .. } | CoverMetaError::InvalidMetadataJson { .. } => {
                true
            }
            CoverMetaError::MalformedResponse { stage, .. } | CoverMetaError::Http { stage, .. } => {
                *stage == Stage::Analyze
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_rejected_display() {
        let e = CoverMetaError::UploadRejected {
            status: 403,
            body: "{\"error\":\"denied\"}".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("403"), "got: {msg}");
        assert!(msg.contains("denied"), "got: {msg}");
        assert!(e.is_upload_rejected());
        assert!(!e.is_analysis_failure());
    }

    #[test]
    fn malformed_response_names_stage() {
        let e = CoverMetaError::MalformedResponse {
            stage: Stage::Upload,
            detail: "missing field `uri`".into(),
        };
        assert!(e.to_string().contains("upload"));
        assert!(!e.is_analysis_failure());

        let e = CoverMetaError::MalformedResponse {
            stage: Stage::Analyze,
            detail: "no candidates".into(),
        };
        assert!(e.to_string().contains("analyze"));
        assert!(e.is_analysis_failure());
    }

    #[test]
    fn input_errors_are_not_analysis_failures() {
        let e = CoverMetaError::FileNotFound {
            path: PathBuf::from("/nope.pdf"),
        };
        assert!(e.to_string().contains("/nope.pdf"));
        assert!(!e.is_analysis_failure());
        assert!(!CoverMetaError::MissingApiKey.is_analysis_failure());
    }

    #[test]
    fn invalid_json_display_includes_text() {
        let e = CoverMetaError::InvalidMetadataJson {
            detail: "expected value".into(),
            text: "not json".into(),
        };
        assert!(e.to_string().contains("not json"));
        assert!(e.is_analysis_failure());
    }
}
