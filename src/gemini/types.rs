//! Wire types for the two Gemini endpoints this crate talks to.
//!
//! Request types serialise to exactly the bodies the service expects.
//! Response types are lenient: every field the crate does not strictly need
//! is optional, so a service-side addition never breaks decoding.

use serde::{Deserialize, Serialize};

/// MIME type used for both the multipart part and the `file_data` reference.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// MIME type requested for the model's answer.
pub const JSON_MIME_TYPE: &str = "application/json";

// ── Upload ───────────────────────────────────────────────────────────────

/// The `file` object returned by the File API after an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Opaque reference passed to `generateContent` as `file_uri`.
    pub uri: String,
    /// Resource name, e.g. `files/abc123`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Int64 encoded as a string, as the service sends it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<String>,
    /// `PROCESSING`, `ACTIVE` or `FAILED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Top-level upload response: `{"file": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub file: UploadedFile,
}

// ── generateContent request ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

/// One request part: either prompt text or a reference to an uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    FileData { file_data: FileData },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn pdf(uri: impl Into<String>) -> Self {
        Part::FileData {
            file_data: FileData {
                file_uri: uri.into(),
                mime_type: PDF_MIME_TYPE.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileData {
    pub file_uri: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            response_mime_type: JSON_MIME_TYPE.to_string(),
            temperature: None,
            response_schema: None,
        }
    }
}

impl GenerateContentRequest {
    /// Single-turn request with the given parts.
    pub fn new(parts: Vec<Part>, generation_config: GenerationConfig) -> Self {
        Self {
            contents: vec![Content { role: None, parts }],
            generation_config,
        }
    }

    /// URIs of every `file_data` part, in order.
    pub fn file_uris(&self) -> Vec<&str> {
        self.contents
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| match p {
                Part::FileData { file_data } => Some(file_data.file_uri.as_str()),
                Part::Text { .. } => None,
            })
            .collect()
    }
}

// ── generateContent response ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    ///
    /// The error string explains which link of
    /// `candidates[0].content.parts[0].text` is missing.
    pub fn first_text(&self) -> Result<&str, String> {
        let Some(candidate) = self.candidates.first() else {
            return Err(match self
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
            {
                Some(reason) => format!("no candidates (prompt blocked: {reason})"),
                None => "no candidates".to_string(),
            });
        };
        let finish = candidate.finish_reason.as_deref().unwrap_or("unknown");
        let content = candidate
            .content
            .as_ref()
            .ok_or_else(|| format!("candidate has no content (finish reason: {finish})"))?;
        let part = content
            .parts
            .first()
            .ok_or_else(|| format!("candidate content has no parts (finish reason: {finish})"))?;
        part.text
            .as_deref()
            .ok_or_else(|| "first part has no text".to_string())
    }
}
