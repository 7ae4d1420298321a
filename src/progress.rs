//! Progress-callback trait for extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to hear about
//! each stage as it happens. The CLI uses this to print its
//! `Uploading …` / `OK: …` / `Analyzing cover...` lines.
//!
//! # Example
//!
//! ```rust
//! use edgequake_covermeta::{ExtractionConfig, ExtractionProgressCallback};
//! use std::sync::Arc;
//!
//! struct Log;
//!
//! impl ExtractionProgressCallback for Log {
//!     fn on_upload_complete(&self, uri: &str) {
//!         eprintln!("uploaded as {uri}");
//!     }
//! }
//!
//! let config = ExtractionConfig::builder()
//!     .api_key("test-key")
//!     .progress_callback(Arc::new(Log))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the extraction flow as it moves through its stages.
///
/// All methods default to no-ops.
pub trait ExtractionProgressCallback: Send + Sync {
    /// The file has been read and is about to be uploaded.
    fn on_upload_start(&self, file_name: &str, size_bytes: u64) {
        let _ = (file_name, size_bytes);
    }

    /// The File API accepted the upload.
    fn on_upload_complete(&self, uri: &str) {
        let _ = uri;
    }

    /// The File API answered with a non-200 status.
    fn on_upload_rejected(&self, status: u16) {
        let _ = status;
    }

    /// The `generateContent` request is about to be sent.
    fn on_analysis_start(&self) {}

    /// The answer decoded; `filled_fields` of the six fields have a value.
    fn on_analysis_complete(&self, filled_fields: usize) {
        let _ = filled_fields;
    }

    /// Cover analysis failed and file-name inference takes over.
    fn on_fallback(&self, reason: &str) {
        let _ = reason;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
