use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Text captured from a single backend invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendOutput {
    /// Raw text produced by the model
    pub text: String,
    /// Model that produced the text
    pub model: String,
    /// Round-trip duration
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl BackendOutput {
    pub fn new(text: String, model: String, duration: Duration) -> Self {
        Self {
            text,
            model,
            duration,
        }
    }

    /// Length of the returned text in characters
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs))
    }
}
