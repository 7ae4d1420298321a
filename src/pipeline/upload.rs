//! Upload stage: send the PDF to the File API and decode `file.uri`.

use crate::error::{CoverMetaError, Stage};
use crate::gemini::{ApiReply, GeminiApi, UploadResponse, UploadedFile};
use crate::pipeline::input::InputFile;
use tracing::{debug, info, warn};

/// Upload `input` and return the File API record.
///
/// Only HTTP 200 counts as success. Any other status becomes
/// [`CoverMetaError::UploadRejected`] carrying the raw body.
pub async fn upload_pdf(
    api: &dyn GeminiApi,
    input: InputFile,
) -> Result<UploadedFile, CoverMetaError> {
    info!("Uploading {} ({} bytes)", input.file_name, input.len());
    let reply = api.upload_file(input.into_upload()).await?;
    decode_upload_reply(reply)
}

/// Turn a raw upload reply into the uploaded-file record.
pub fn decode_upload_reply(reply: ApiReply) -> Result<UploadedFile, CoverMetaError> {
    if reply.status != 200 {
        warn!("Upload rejected: HTTP {}", reply.status);
        return Err(CoverMetaError::UploadRejected {
            status: reply.status,
            body: reply.body,
        });
    }

    let parsed: UploadResponse =
        serde_json::from_str(&reply.body).map_err(|e| CoverMetaError::MalformedResponse {
            stage: Stage::Upload,
            detail: e.to_string(),
        })?;

    if parsed.file.uri.trim().is_empty() {
        return Err(CoverMetaError::MalformedResponse {
            stage: Stage::Upload,
            detail: "file.uri is empty".into(),
        });
    }

    debug!(
        "Uploaded as {} (state: {})",
        parsed.file.name.as_deref().unwrap_or("?"),
        parsed.file.state.as_deref().unwrap_or("unknown")
    );
    Ok(parsed.file)
}
