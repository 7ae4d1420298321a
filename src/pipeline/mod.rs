//! Pipeline stages for cover-metadata extraction.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own with raw replies and no network.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ upload ──▶ (settle) ──▶ analyze ──▶ postprocess
//! (path)    (file.uri)   (sleep)     (model)     (clean JSON)
//! ```
//!
//! 1. [`input`]: read the local file and derive its base name
//! 2. [`upload`]: multipart upload, `file.uri` decoding
//! 3. [`analyze`]: build the `generateContent` request, decode the answer
//! 4. [`postprocess`]: strip fences and invisible characters from the answer

pub mod analyze;
pub mod input;
pub mod postprocess;
pub mod upload;
