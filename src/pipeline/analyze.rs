//! Analysis stage: ask the model for the metadata and decode its answer.
//!
//! The answer sits at `candidates[0].content.parts[0].text` and is itself a
//! JSON document. Each link of that path is checked, so a missing field is
//! a [`CoverMetaError::MalformedResponse`] rather than a crash.

use crate::config::ExtractionConfig;
use crate::error::{CoverMetaError, Stage};
use crate::gemini::{
    ApiReply, GeminiApi, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
use crate::pipeline::postprocess::clean_model_text;
use crate::prompts::{file_name_prompt, metadata_response_schema, COVER_PROMPT};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

static RE_BOOK_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(pdf|epub|txt)$").unwrap());

/// Request that points the model at an uploaded PDF.
///
/// Parts are ordered prompt first, file second.
pub fn cover_request(uri: &str, config: &ExtractionConfig) -> GenerateContentRequest {
    let prompt = config.cover_prompt.as_deref().unwrap_or(COVER_PROMPT);
    GenerateContentRequest::new(
        vec![Part::text(prompt), Part::pdf(uri)],
        generation_config(config),
    )
}

/// Text-only request that infers the metadata from a file name.
pub fn file_name_request(file_name: &str, config: &ExtractionConfig) -> GenerateContentRequest {
    GenerateContentRequest::new(
        vec![Part::text(file_name_prompt(file_name))],
        generation_config(config),
    )
}

fn generation_config(config: &ExtractionConfig) -> GenerationConfig {
    GenerationConfig {
        temperature: config.temperature,
        response_schema: config.response_schema.then(metadata_response_schema),
        ..Default::default()
    }
}

/// Send `request` and return the model's answer as parsed JSON.
pub async fn generate_metadata(
    api: &dyn GeminiApi,
    request: &GenerateContentRequest,
) -> Result<Value, CoverMetaError> {
    info!("Requesting metadata ({} file reference(s))", request.file_uris().len());
    let reply = api.generate_content(request).await?;
    let text = decode_generation_reply(reply)?;
    parse_metadata_text(&text)
}

/// Ask the model to infer the metadata from `file_name`.
///
/// With `file_name_fallback` on, a failure here is not fatal: the answer
/// degrades to [`file_name_default`]. Otherwise the error is returned.
pub async fn infer_from_file_name(
    api: &dyn GeminiApi,
    file_name: &str,
    config: &ExtractionConfig,
) -> Result<Value, CoverMetaError> {
    let request = file_name_request(file_name, config);
    match generate_metadata(api, &request).await {
        Ok(raw) => Ok(raw),
        Err(e) if config.file_name_fallback => {
            warn!("File-name inference failed, using built-in default: {}", e);
            Ok(file_name_default(file_name))
        }
        Err(e) => Err(e),
    }
}

/// Offline answer used when every model call failed.
///
/// The title is the file name without a `.pdf`, `.epub` or `.txt`
/// extension; every other field is null and confidence is zero.
pub fn file_name_default(file_name: &str) -> Value {
    let title = RE_BOOK_EXTENSION.replace(file_name, "");
    json!({
        "title": title,
        "author": null,
        "subject": null,
        "grade": null,
        "publisher": null,
        "publishDate": null,
        "confidence": { "overall": 0.0, "fields": {} },
    })
}

/// Extract the answer text from a raw `generateContent` reply.
pub fn decode_generation_reply(reply: ApiReply) -> Result<String, CoverMetaError> {
    if !reply.is_success() {
        return Err(CoverMetaError::GenerationFailed {
            status: reply.status,
            body: reply.body,
        });
    }

    let parsed: GenerateContentResponse =
        serde_json::from_str(&reply.body).map_err(|e| CoverMetaError::MalformedResponse {
            stage: Stage::Analyze,
            detail: e.to_string(),
        })?;

    let text = parsed
        .first_text()
        .map_err(|detail| CoverMetaError::MalformedResponse {
            stage: Stage::Analyze,
            detail,
        })?;
    debug!("Model answer: {} chars", text.chars().count());
    Ok(text.to_string())
}

/// Parse the answer text as JSON, after stripping fences and invisible chars.
///
/// Any JSON value is accepted; the typed view in
/// [`crate::output::BookMetadata`] copes with non-object answers.
pub fn parse_metadata_text(text: &str) -> Result<Value, CoverMetaError> {
    let cleaned = clean_model_text(text);
    serde_json::from_str(&cleaned).map_err(|e| CoverMetaError::InvalidMetadataJson {
        detail: e.to_string(),
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExtractionConfig {
        ExtractionConfig::builder().api_key("k").build().unwrap()
    }

    #[test]
    fn cover_request_references_uri_after_prompt() {
        let req = cover_request("https://files/X", &config());
        let v = serde_json::to_value(&req).unwrap();
        let parts = &v["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], COVER_PROMPT);
        assert_eq!(parts[1]["file_data"]["file_uri"], "https://files/X");
        assert_eq!(parts[1]["file_data"]["mime_type"], "application/pdf");
        assert_eq!(v["generationConfig"], json!({"responseMimeType": "application/json"}));
    }

    #[test]
    fn cover_request_honours_overrides() {
        let cfg = ExtractionConfig::builder()
            .api_key("k")
            .cover_prompt("Only the title.")
            .temperature(0.1)
            .response_schema(true)
            .build()
            .unwrap();
        let v = serde_json::to_value(cover_request("u", &cfg)).unwrap();
        assert_eq!(v["contents"][0]["parts"][0]["text"], "Only the title.");
        assert!(v["generationConfig"]["temperature"].is_number());
        assert_eq!(v["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn file_name_request_has_no_file_part() {
        let req = file_name_request("Physics 8A.pdf", &config());
        assert!(req.file_uris().is_empty());
        let v = serde_json::to_value(&req).unwrap();
        let text = v["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("Physics 8A.pdf"));
    }

    #[test]
    fn decode_nested_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"title\":\"A\",\"author\":\"B\"}"}]}}]}"#;
        let text = decode_generation_reply(ApiReply::new(200, body)).unwrap();
        let v = parse_metadata_text(&text).unwrap();
        assert_eq!(v, json!({"title": "A", "author": "B"}));
    }

    #[test]
    fn non_success_status_is_generation_failed() {
        let err = decode_generation_reply(ApiReply::new(429, "quota")).unwrap_err();
        match err {
            CoverMetaError::GenerationFailed { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota");
            }
            other => panic!("expected GenerationFailed, got {other:?}"),
        }
    }

    #[test]
    fn missing_candidates_is_malformed() {
        let err = decode_generation_reply(ApiReply::new(200, "{}")).unwrap_err();
        assert!(matches!(
            err,
            CoverMetaError::MalformedResponse {
                stage: Stage::Analyze,
                ..
            }
        ));
    }

    #[test]
    fn non_json_text_is_invalid_metadata() {
        let err = parse_metadata_text("The title is A.").unwrap_err();
        assert!(matches!(err, CoverMetaError::InvalidMetadataJson { .. }));
    }

    #[test]
    fn fenced_answer_parses() {
        let v = parse_metadata_text("```json\n{\"grade\": \"5\"}\n```").unwrap();
        assert_eq!(v["grade"], "5");
    }

    #[test]
    fn default_title_drops_book_extension() {
        assert_eq!(file_name_default("Physics 8A.pdf")["title"], "Physics 8A");
        assert_eq!(file_name_default("Reader.EPUB")["title"], "Reader");
        assert_eq!(file_name_default("notes.txt")["title"], "notes");
        assert_eq!(file_name_default("scan.djvu")["title"], "scan.djvu");
        assert_eq!(file_name_default("a.pdf.pdf")["title"], "a.pdf");
    }

    #[test]
    fn default_has_zero_confidence_and_null_fields() {
        let v = file_name_default("Math 3.pdf");
        assert_eq!(v["confidence"], json!({"overall": 0.0, "fields": {}}));
        assert!(v["author"].is_null());
        assert!(v["publishDate"].is_null());
    }
}
