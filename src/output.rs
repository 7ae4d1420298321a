//! Result types returned by the extraction entry points.
//!
//! [`ExtractionOutput::raw`] is the model's JSON exactly as parsed, and is
//! what the CLI prints. [`BookMetadata`] is a typed view over it for library
//! callers; building it never fails, fields that are missing or have an
//! unexpected type are simply `None`.

use crate::error::CoverMetaError;
use crate::gemini::UploadedFile;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bibliographic fields read from a cover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub grade: Option<String>,
    pub publisher: Option<String>,
    pub publish_date: Option<String>,
}

impl BookMetadata {
    /// Lenient view over the model's JSON.
    ///
    /// Accepts an object, or an array whose first element is an object
    /// (JSON mode occasionally wraps the answer in a list). Numbers and
    /// booleans are stringified, so `"publishDate": 2021` becomes `"2021"`.
    pub fn from_value(value: &Value) -> Self {
        let obj = match value {
            Value::Object(map) => Some(map),
            Value::Array(items) => items.first().and_then(Value::as_object),
            _ => None,
        };
        let Some(obj) = obj else {
            return Self::default();
        };
        let field = |key: &str| obj.get(key).and_then(scalar_to_string);
        Self {
            title: field("title"),
            author: field("author"),
            subject: field("subject"),
            grade: field("grade"),
            publisher: field("publisher"),
            publish_date: field("publishDate"),
        }
    }

    /// Number of fields with a non-empty value.
    pub fn filled_count(&self) -> usize {
        [
            &self.title,
            &self.author,
            &self.subject,
            &self.grade,
            &self.publisher,
            &self.publish_date,
        ]
        .iter()
        .filter(|f| f.as_deref().is_some_and(|s| !s.trim().is_empty()))
        .count()
    }
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Model-reported confidence, when the answer carries one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub overall: Option<f64>,
    #[serde(default)]
    pub fields: BTreeMap<String, f64>,
}

impl Confidence {
    /// Read `confidence: { overall, fields: {..} }` from the answer, if present.
    pub fn from_value(value: &Value) -> Option<Self> {
        let c = value.get("confidence")?.as_object()?;
        let fields = c
            .get("fields")
            .and_then(Value::as_object)
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_f64().map(|f| (k.clone(), f)))
                    .collect()
            })
            .unwrap_or_default();
        Some(Self {
            overall: c.get("overall").and_then(Value::as_f64),
            fields,
        })
    }
}

/// Where the metadata came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSource {
    /// The PDF was uploaded and its cover analysed.
    Cover,
    /// Inferred from the file name alone.
    FileName,
}

impl fmt::Display for MetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataSource::Cover => f.write_str("cover"),
            MetadataSource::FileName => f.write_str("file_name"),
        }
    }
}

/// Timings and sizes for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub file_bytes: u64,
    pub upload_duration_ms: u64,
    pub settle_duration_ms: u64,
    pub analysis_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything one extraction produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Typed view over `raw`.
    pub metadata: BookMetadata,
    /// The model's JSON answer, key order preserved.
    pub raw: Value,
    pub confidence: Option<Confidence>,
    /// The File API record; `None` for file-name inference.
    pub file: Option<UploadedFile>,
    pub source: MetadataSource,
    pub stats: ExtractionStats,
}

impl ExtractionOutput {
    pub(crate) fn from_answer(
        raw: Value,
        file: Option<UploadedFile>,
        source: MetadataSource,
        stats: ExtractionStats,
    ) -> Self {
        Self {
            metadata: BookMetadata::from_value(&raw),
            confidence: Confidence::from_value(&raw),
            raw,
            file,
            source,
            stats,
        }
    }

    /// `raw` with 2-space indentation; non-ASCII characters are kept as-is.
    pub fn to_pretty_json(&self) -> String {
        // Serialising a Value cannot fail.
        serde_json::to_string_pretty(&self.raw).unwrap_or_default()
    }

    /// Write [`Self::to_pretty_json`] plus a trailing newline to `path`.
    ///
    /// Atomic: the JSON goes to a temp file in the target directory which is
    /// then renamed over `path`, so a failed write never leaves a partial
    /// file behind. Missing parent directories are created.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), CoverMetaError> {
        let path = path.as_ref();
        let write_err = |source: std::io::Error| CoverMetaError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(write_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(self.to_pretty_json().as_bytes())
            .map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}
