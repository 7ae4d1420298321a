//! # edgequake-covermeta
//!
//! Extract book metadata (title, author, subject, grade, publisher,
//! publication date) from the cover of a PDF using the Gemini File API.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    read the local file, derive its base name
//!  ├─ 2. Upload   multipart POST to the File API → file.uri
//!  ├─ 3. Settle   fixed delay (default 2 s) before referencing the file
//!  ├─ 4. Analyze  generateContent with the prompt + file reference
//!  └─ 5. Output   JSON answer, typed view, timings
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_covermeta::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key from GEMINI_API_KEY
//!     let config = ExtractionConfig::from_env()?;
//!     let output = extract("textbook.pdf", &config).await?;
//!     println!("{}", output.to_pretty_json());
//!     eprintln!("title: {:?}", output.metadata.title);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `covermeta` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-covermeta = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod gemini;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::{CoverMetaError, Stage};
pub use extract::{extract, extract_from_bytes, extract_from_file_name, extract_sync, extract_to_file};
pub use gemini::{ApiReply, FileUpload, GeminiApi, GenerateContentRequest, HttpGeminiApi, UploadedFile};
pub use output::{BookMetadata, Confidence, ExtractionOutput, ExtractionStats, MetadataSource};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
