//! reqwest-backed [`GeminiApi`].
//!
//! The key travels as the `key` query parameter, as the REST API expects.
//! Every `reqwest::Error` is stripped of its URL before it is wrapped, so
//! the key never ends up in an error message or a log line.

use super::{ApiReply, FileUpload, GeminiApi, GenerateContentRequest};
use crate::config::ExtractionConfig;
use crate::error::{CoverMetaError, Stage};
use futures::future::{BoxFuture, FutureExt};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

/// Talks to the real service over HTTPS.
#[derive(Clone)]
pub struct HttpGeminiApi {
    client: Client,
    api_key: String,
    upload_url: String,
    generate_url: String,
}

impl std::fmt::Debug for HttpGeminiApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGeminiApi")
            .field("upload_url", &self.upload_url)
            .field("generate_url", &self.generate_url)
            .finish_non_exhaustive()
    }
}

impl HttpGeminiApi {
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, CoverMetaError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| CoverMetaError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            upload_url: config.upload_url(),
            generate_url: config.generate_url(),
        })
    }

    async fn upload(&self, file: FileUpload) -> Result<ApiReply, CoverMetaError> {
        let size = file.bytes.len();
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.mime_type)
            .map_err(|e| http_error(Stage::Upload, e))?;
        let form = Form::new().part("file", part);

        debug!("POST {} ({} bytes multipart)", self.upload_url, size);
        let response = self
            .client
            .post(&self.upload_url)
            .query(&[("key", self.api_key.as_str())])
            .multipart(form)
            .send()
            .await
            .map_err(|e| http_error(Stage::Upload, e))?;

        into_reply(response, Stage::Upload).await
    }

    async fn generate(&self, request: &GenerateContentRequest) -> Result<ApiReply, CoverMetaError> {
        debug!("POST {}", self.generate_url);
        let response = self
            .client
            .post(&self.generate_url)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| http_error(Stage::Analyze, e))?;

        into_reply(response, Stage::Analyze).await
    }
}

impl GeminiApi for HttpGeminiApi {
    fn upload_file(&self, file: FileUpload) -> BoxFuture<'_, Result<ApiReply, CoverMetaError>> {
        self.upload(file).boxed()
    }

    fn generate_content<'a>(
        &'a self,
        request: &'a GenerateContentRequest,
    ) -> BoxFuture<'a, Result<ApiReply, CoverMetaError>> {
        self.generate(request).boxed()
    }
}

async fn into_reply(response: Response, stage: Stage) -> Result<ApiReply, CoverMetaError> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| http_error(stage, e))?;
    debug!("{} reply: HTTP {} ({} bytes)", stage, status, body.len());
    Ok(ApiReply { status, body })
}

fn http_error(stage: Stage, e: reqwest::Error) -> CoverMetaError {
    CoverMetaError::Http {
        stage,
        source: e.without_url(),
    }
}
