//! Configuration types for cover-metadata extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. The API key lives here and nowhere
//! else; it is redacted from `Debug` output.

use crate::error::CoverMetaError;
use crate::gemini::GeminiApi;
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Public Gemini endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used for cover analysis when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Delay between a successful upload and the analysis call.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 2000;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration for a cover-metadata extraction.
///
/// # Example
/// ```rust
/// use edgequake_covermeta::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .api_key("test-key")
///     .model("gemini-2.0-flash")
///     .settle_delay_ms(500)
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "gemini-2.0-flash");
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Gemini API key, sent as the `key` query parameter on both calls.
    pub api_key: String,

    /// Endpoint root. Default: [`DEFAULT_BASE_URL`].
    ///
    /// Upload goes to `{base_url}/upload/v1beta/files`, analysis to
    /// `{base_url}/v1beta/models/{model}:generateContent`.
    pub base_url: String,

    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Wait after a successful upload before referencing the file. Default: 2000 ms.
    ///
    /// The File API gives no availability contract for freshly uploaded
    /// files; this delay is kept as-is and can be set to 0.
    pub settle_delay_ms: u64,

    /// Per-request timeout in seconds. Default: None (client default).
    pub request_timeout_secs: Option<u64>,

    /// Sampling temperature added to `generationConfig` when set. Default: None.
    pub temperature: Option<f32>,

    /// Send a `responseSchema` describing the six fields. Default: false.
    pub response_schema: bool,

    /// Fall back to file-name inference when cover analysis fails. Default: false.
    pub file_name_fallback: bool,

    /// Custom cover prompt. If None, uses the built-in one.
    pub cover_prompt: Option<String>,

    /// Pre-constructed service client. Takes precedence over the built-in
    /// reqwest client; used by tests and by callers that need middleware.
    pub api: Option<Arc<dyn GeminiApi>>,

    /// Progress events. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            request_timeout_secs: None,
            temperature: None,
            response_schema: false,
            file_name_fallback: false,
            cover_prompt: None,
            api: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("settle_delay_ms", &self.settle_delay_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("temperature", &self.temperature)
            .field("response_schema", &self.response_schema)
            .field("file_name_fallback", &self.file_name_fallback)
            .field("cover_prompt", &self.cover_prompt.as_ref().map(|p| p.len()))
            .field("api", &self.api.as_ref().map(|_| "<dyn GeminiApi>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Default configuration with the API key read from `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self, CoverMetaError> {
        let key = std::env::var(API_KEY_ENV).unwrap_or_default();
        Self::builder().api_key(key).build()
    }

    /// The settle delay as a [`Duration`].
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Upload endpoint, without the key.
    pub fn upload_url(&self) -> String {
        format!("{}/upload/v1beta/files", self.base_url.trim_end_matches('/'))
    }

    /// `generateContent` endpoint for the configured model, without the key.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn settle_delay_ms(mut self, ms: u64) -> Self {
        self.config.settle_delay_ms = ms;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn response_schema(mut self, v: bool) -> Self {
        self.config.response_schema = v;
        self
    }

    pub fn file_name_fallback(mut self, v: bool) -> Self {
        self.config.file_name_fallback = v;
        self
    }

    pub fn cover_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.cover_prompt = Some(prompt.into());
        self
    }

    pub fn api(mut self, api: Arc<dyn GeminiApi>) -> Self {
        self.config.api = Some(api);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// An API key is required unless a pre-built [`GeminiApi`] is injected.
    pub fn build(self) -> Result<ExtractionConfig, CoverMetaError> {
        let c = &self.config;
        if c.api.is_none() && c.api_key.trim().is_empty() {
            return Err(CoverMetaError::MissingApiKey);
        }
        if c.model.trim().is_empty() {
            return Err(CoverMetaError::InvalidConfig("model must not be empty".into()));
        }
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(CoverMetaError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(CoverMetaError::InvalidConfig("timeout must be ≥ 1 second".into()));
        }
        Ok(self.config)
    }
}
