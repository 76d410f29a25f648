use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::BackendOutput;

/// Model used when neither the caller nor the environment picks one
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Public endpoint of the Generative Language API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Errors that can occur while talking to a generative backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to build backend client: {0}")]
    ClientBuild(String),

    #[error("Backend request failed: {0}")]
    Transport(String),

    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Backend returned no text content")]
    EmptyResponse,
}

/// The request URL is stripped so the message is safe to log.
impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Transport(err.without_url().to_string())
    }
}

/// Settings needed to construct a backend client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    /// API credential (None = not configured)
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// Base URL of the API, without a trailing path
    pub base_url: String,
    /// Optional request timeout (None = the HTTP stack's own behavior)
    pub timeout: Option<Duration>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl BackendSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The credential, if present and not blank
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Supported backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendType {
    Gemini,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::Gemini => write!(f, "gemini"),
        }
    }
}

impl std::str::FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" | "google-gemini" => Ok(BackendType::Gemini),
            _ => Err(format!("Unknown backend type: {}", s)),
        }
    }
}

/// A generative text backend.
///
/// Every call to [`Backend::generate`] is a single round-trip; implementations
/// must not retry internally.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Human-readable name of the backend
    fn name(&self) -> &str;

    /// The backend type
    fn backend_type(&self) -> BackendType;

    /// Model identifier the backend sends requests to
    fn model(&self) -> &str;

    /// Send a prompt and return the raw text the model produced
    async fn generate(&self, prompt: &str) -> Result<BackendOutput, BackendError>;
}
