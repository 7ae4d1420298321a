//! The Gemini service boundary.
//!
//! [`GeminiApi`] is deliberately dumb: it moves bytes and hands back the raw
//! status and body. Status checks and JSON decoding live in
//! [`crate::pipeline`], so the same rules apply to the real client
//! ([`HttpGeminiApi`]) and to any injected implementation.

pub mod http;
pub mod types;

pub use http::HttpGeminiApi;
pub use types::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part, UploadResponse,
    UploadedFile,
};

use crate::config::ExtractionConfig;
use crate::error::CoverMetaError;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Raw HTTP reply: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    pub status: u16,
    pub body: String,
}

impl ApiReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A file ready to be sent to the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Original base name, sent as the multipart file name.
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Transport for the two calls the extraction makes.
///
/// Implementations return `Err` only for transport failures; any HTTP
/// status, including errors, comes back as an [`ApiReply`].
pub trait GeminiApi: Send + Sync {
    /// `POST /upload/v1beta/files` with the file as multipart form data.
    fn upload_file(&self, file: FileUpload) -> BoxFuture<'_, Result<ApiReply, CoverMetaError>>;

    /// `POST /v1beta/models/{model}:generateContent` with a JSON body.
    fn generate_content<'a>(
        &'a self,
        request: &'a GenerateContentRequest,
    ) -> BoxFuture<'a, Result<ApiReply, CoverMetaError>>;
}

/// Use the injected client if there is one, otherwise build the reqwest one.
pub fn resolve_api(config: &ExtractionConfig) -> Result<Arc<dyn GeminiApi>, CoverMetaError> {
    if let Some(ref api) = config.api {
        return Ok(Arc::clone(api));
    }
    if config.api_key.trim().is_empty() {
        return Err(CoverMetaError::MissingApiKey);
    }
    Ok(Arc::new(HttpGeminiApi::from_config(config)?))
}
