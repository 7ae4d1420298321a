//! Extraction entry points.
//!
//! [`extract`] runs the whole flow for a local file: read, upload, settle,
//! analyse, decode. The other entry points are thin variations on it.

use crate::config::ExtractionConfig;
use crate::error::CoverMetaError;
use crate::gemini::{resolve_api, GeminiApi};
use crate::output::{ExtractionOutput, ExtractionStats, MetadataSource};
use crate::pipeline::input::{self, InputFile};
use crate::pipeline::{analyze, upload};
use std::path::Path;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Extract cover metadata from a local PDF.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// - [`CoverMetaError::FileNotFound`] / [`CoverMetaError::PermissionDenied`]
///   before any request is sent
/// - [`CoverMetaError::UploadRejected`] when the File API answers non-200;
///   no analysis request is sent in that case
/// - analysis-stage errors, unless `file_name_fallback` recovers them
pub async fn extract(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, CoverMetaError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting extraction: {}", input_str);

    // ── Step 1: Read input (no network yet) ──────────────────────────────
    let input = input::read_input(input_str).await?;

    // ── Step 2: Get/create API client ────────────────────────────────────
    let api = resolve_api(config)?;

    extract_input(api.as_ref(), input, config, total_start).await
}

/// Extract cover metadata from PDF bytes already in memory.
///
/// `file_name` is sent as the upload's file name and used for the
/// file-name fallback.
pub async fn extract_from_bytes(
    bytes: Vec<u8>,
    file_name: impl Into<String>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, CoverMetaError> {
    let total_start = Instant::now();
    let input = InputFile::from_bytes(file_name, bytes);
    let api = resolve_api(config)?;
    extract_input(api.as_ref(), input, config, total_start).await
}

/// Extract and write the pretty-printed JSON answer to `output_path`.
///
/// See [`ExtractionOutput::save_json`] for the write semantics.
pub async fn extract_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, CoverMetaError> {
    let output = extract(input_str, config).await?;
    output.save_json(output_path)?;
    Ok(output)
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, CoverMetaError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CoverMetaError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input_str, config))
}

/// Infer metadata from a file name alone: one text-only request, no upload.
///
/// With `file_name_fallback` on, a failed request yields the built-in
/// default from [`analyze::file_name_default`] instead of an error.
pub async fn extract_from_file_name(
    file_name: &str,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, CoverMetaError> {
    let start = Instant::now();
    info!("Inferring metadata from file name: {}", file_name);
    let api = resolve_api(config)?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_start();
    }
    let raw = analyze::infer_from_file_name(api.as_ref(), file_name, config).await?;

    let elapsed = millis_since(start);
    let stats = ExtractionStats {
        analysis_duration_ms: elapsed,
        total_duration_ms: elapsed,
        ..Default::default()
    };
    let output = ExtractionOutput::from_answer(raw, None, MetadataSource::FileName, stats);
    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_complete(output.metadata.filled_count());
    }
    Ok(output)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Upload → settle → analyse for an input that has already been read.
async fn extract_input(
    api: &dyn GeminiApi,
    input: InputFile,
    config: &ExtractionConfig,
    total_start: Instant,
) -> Result<ExtractionOutput, CoverMetaError> {
    let file_name = input.file_name.clone();
    let file_bytes = input.len();

    // ── Step 3: Upload ───────────────────────────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        cb.on_upload_start(&file_name, file_bytes);
    }
    let upload_start = Instant::now();
    let uploaded = match upload::upload_pdf(api, input).await {
        Ok(file) => file,
        Err(e) => {
            if let (CoverMetaError::UploadRejected { status, .. }, Some(cb)) =
                (&e, config.progress_callback.as_ref())
            {
                cb.on_upload_rejected(*status);
            }
            return Err(e);
        }
    };
    let upload_duration_ms = millis_since(upload_start);
    info!("Uploaded {} → {}", file_name, uploaded.uri);
    if let Some(ref cb) = config.progress_callback {
        cb.on_upload_complete(&uploaded.uri);
    }

    // ── Step 4: Let the uploaded file settle ─────────────────────────────
    // The analysis line is printed before the wait, not after it.
    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_start();
    }
    let settle_start = Instant::now();
    let delay = config.settle_delay();
    if !delay.is_zero() {
        debug!("Waiting {}ms before analysis", config.settle_delay_ms);
        tokio::time::sleep(delay).await;
    }
    let settle_duration_ms = millis_since(settle_start);

    // ── Step 5: Analyse the cover ────────────────────────────────────────
    let analysis_start = Instant::now();
    let request = analyze::cover_request(&uploaded.uri, config);
    let (raw, source) = match analyze::generate_metadata(api, &request).await {
        Ok(raw) => (raw, MetadataSource::Cover),
        Err(e) if config.file_name_fallback && e.is_analysis_failure() => {
            warn!("Cover analysis failed, falling back to file name: {}", e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_fallback(&e.to_string());
            }
            let raw = analyze::infer_from_file_name(api, &file_name, config).await?;
            (raw, MetadataSource::FileName)
        }
        Err(e) => return Err(e),
    };
    let analysis_duration_ms = millis_since(analysis_start);

    // ── Step 6: Assemble output ──────────────────────────────────────────
    let stats = ExtractionStats {
        file_bytes,
        upload_duration_ms,
        settle_duration_ms,
        analysis_duration_ms,
        total_duration_ms: millis_since(total_start),
    };
    let output = ExtractionOutput::from_answer(raw, Some(uploaded), source, stats);

    info!(
        "Extraction complete: {}/6 fields from {}, {}ms total",
        output.metadata.filled_count(),
        output.source,
        output.stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_complete(output.metadata.filled_count());
    }
    Ok(output)
}

fn millis_since(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_reported_before_missing_key() {
        let config = ExtractionConfig::default();
        let err = extract("/definitely/not/here.pdf", &config).await.unwrap_err();
        assert!(matches!(err, CoverMetaError::FileNotFound { .. }), "got {err:?}");
    }
}
