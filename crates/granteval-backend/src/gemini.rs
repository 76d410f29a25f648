use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::debug;

use crate::{Backend, BackendError, BackendOutput, BackendSettings, BackendType};

/// Google Gemini backend speaking the `generateContent` REST API
pub struct GeminiBackend {
    api_key: String,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GeminiBackend {
    /// Build a client from settings.
    ///
    /// Fails with [`BackendError::ClientBuild`] when the credential is missing
    /// or malformed, or when the HTTP client cannot be constructed.
    pub fn new(settings: &BackendSettings) -> Result<Self, BackendError> {
        let api_key = settings
            .credential()
            .ok_or_else(|| BackendError::ClientBuild("API key is not set".to_string()))?;

        if api_key.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(BackendError::ClientBuild(
                "API key contains whitespace or control characters".to_string(),
            ));
        }

        let model = settings.model.trim();
        if model.is_empty() {
            return Err(BackendError::ClientBuild("model name is empty".to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::ClientBuild(e.to_string()))?;

        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            settings.base_url.trim_end_matches('/'),
            model
        );

        Ok(Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            endpoint,
            client,
        })
    }

    /// Pull the generated text out of a `generateContent` response body.
    ///
    /// Text parts of the first candidate are concatenated; a missing or blank
    /// result is an [`BackendError::EmptyResponse`].
    pub fn extract_text(body: &Value) -> Result<String, BackendError> {
        let parts = body
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array)
            .ok_or(BackendError::EmptyResponse)?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();

        if text.trim().is_empty() {
            return Err(BackendError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl Backend for GeminiBackend {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<BackendOutput, BackendError> {
        let start = Instant::now();

        debug!(
            backend = self.name(),
            model = %self.model,
            prompt_len = prompt.len(),
            "Sending generateContent request"
        );

        let body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ]
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", self.api_key.as_str())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = resp.json().await?;
        let text = Self::extract_text(&json)?;
        let duration = start.elapsed();

        debug!(
            model = %self.model,
            text_len = text.len(),
            duration_ms = duration.as_millis(),
            "Backend responded"
        );

        Ok(BackendOutput::new(text, self.model.clone(), duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_fails_construction() {
        let result = GeminiBackend::new(&BackendSettings::default());
        assert!(matches!(result, Err(BackendError::ClientBuild(_))));
    }

    #[test]
    fn test_malformed_key_fails_construction() {
        let result = GeminiBackend::new(&BackendSettings::new("abc def"));
        assert!(matches!(result, Err(BackendError::ClientBuild(_))));
    }

    #[test]
    fn test_endpoint_includes_model() {
        let settings = BackendSettings::new("key")
            .with_model("gemini-pro")
            .with_base_url("http://localhost:9999/");
        let backend = GeminiBackend::new(&settings).unwrap();
        assert_eq!(
            backend.endpoint,
            "http://localhost:9999/v1beta/models/gemini-pro:generateContent"
        );
        assert_eq!(backend.model(), "gemini-pro");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body = json!({
            "candidates": [
                { "content": { "parts": [ { "text": "{\"summary\":" }, { "text": "\"ok\"}" } ] } }
            ]
        });
        assert_eq!(
            GeminiBackend::extract_text(&body).unwrap(),
            "{\"summary\":\"ok\"}"
        );
    }

    #[test]
    fn test_extract_text_missing_candidates() {
        let body = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(matches!(
            GeminiBackend::extract_text(&body),
            Err(BackendError::EmptyResponse)
        ));
    }

    #[test]
    fn test_extract_text_blank() {
        let body = json!({ "candidates": [ { "content": { "parts": [ { "text": "  " } ] } } ] });
        assert!(matches!(
            GeminiBackend::extract_text(&body),
            Err(BackendError::EmptyResponse)
        ));
    }
}
