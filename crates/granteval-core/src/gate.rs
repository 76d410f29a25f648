use std::sync::{Arc, OnceLock};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use granteval_backend::{
    create_backend, Backend, BackendError, BackendSettings, BackendType, DEFAULT_BASE_URL,
    DEFAULT_MODEL,
};

/// Primary credential variable
pub const API_KEY_ENV: &str = "GOOGLE_GEMINI_API_KEY";
/// Credential variable consulted when the primary one is unset
pub const API_KEY_FALLBACK_ENV: &str = "GEMINI_API_KEY";
/// Optional model override
pub const MODEL_ENV: &str = "GEMINI_MODEL";

/// Why no backend is usable
#[derive(Error, Debug)]
pub enum GateError {
    #[error("API credential is not configured")]
    Unconfigured,

    #[error("Backend client could not be constructed: {0}")]
    ClientConstructionFailed(#[source] BackendError),
}

/// Result of a capability check
pub enum Capability {
    Capable(Arc<dyn Backend>),
    Incapable(GateError),
}

impl Capability {
    pub fn is_capable(&self) -> bool {
        matches!(self, Capability::Capable(_))
    }
}

impl std::fmt::Debug for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Capable(backend) => f
                .debug_tuple("Capable")
                .field(&format_args!("{} ({})", backend.name(), backend.model()))
                .finish(),
            Capability::Incapable(err) => f.debug_tuple("Incapable").field(err).finish(),
        }
    }
}

/// Where backend settings come from. Consulted on every check until a
/// client has been built, so configuration that appears later is picked up.
pub trait SettingsSource: Send + Sync {
    fn load(&self) -> BackendSettings;
}

impl SettingsSource for BackendSettings {
    fn load(&self) -> BackendSettings {
        self.clone()
    }
}

/// Settings read from process environment, with optional fixed overrides
#[derive(Debug, Clone, Default)]
pub struct EnvSettings {
    /// Takes precedence over `GEMINI_MODEL`
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl EnvSettings {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve settings against an arbitrary variable lookup
    pub fn resolve<F>(&self, lookup: F) -> BackendSettings
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = non_blank(API_KEY_ENV).or_else(|| non_blank(API_KEY_FALLBACK_ENV));
        let model = self
            .model
            .clone()
            .or_else(|| non_blank(MODEL_ENV))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        BackendSettings {
            api_key,
            model,
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: self.timeout,
        }
    }
}

impl SettingsSource for EnvSettings {
    fn load(&self) -> BackendSettings {
        self.resolve(|name| std::env::var(name).ok())
    }
}

/// Builds a backend client from settings
pub trait BackendFactory: Send + Sync {
    fn build(&self, settings: &BackendSettings) -> Result<Arc<dyn Backend>, BackendError>;
}

impl<F> BackendFactory for F
where
    F: Fn(&BackendSettings) -> Result<Arc<dyn Backend>, BackendError> + Send + Sync,
{
    fn build(&self, settings: &BackendSettings) -> Result<Arc<dyn Backend>, BackendError> {
        self(settings)
    }
}

/// Factory for a concrete [`BackendType`]
#[derive(Debug, Clone, Copy)]
pub struct TypedFactory(pub BackendType);

impl BackendFactory for TypedFactory {
    fn build(&self, settings: &BackendSettings) -> Result<Arc<dyn Backend>, BackendError> {
        create_backend(self.0, settings)
    }
}

/// Decides whether an AI backend can be used, memoizing the first client
/// that is built successfully. Failed builds are not cached.
pub struct CapabilityGate {
    settings: Box<dyn SettingsSource>,
    factory: Box<dyn BackendFactory>,
    client: OnceLock<Arc<dyn Backend>>,
}

impl CapabilityGate {
    pub fn new(
        settings: impl SettingsSource + 'static,
        factory: impl BackendFactory + 'static,
    ) -> Self {
        Self {
            settings: Box::new(settings),
            factory: Box::new(factory),
            client: OnceLock::new(),
        }
    }

    /// Gemini backend configured from the environment
    pub fn from_env(settings: EnvSettings) -> Self {
        Self::new(settings, TypedFactory(BackendType::Gemini))
    }

    /// A gate that is always capable with the given backend
    pub fn with_backend(backend: Arc<dyn Backend>) -> Self {
        Self {
            settings: Box::new(BackendSettings::default()),
            factory: Box::new(TypedFactory(BackendType::Gemini)),
            client: OnceLock::from(backend),
        }
    }

    pub fn check(&self) -> Capability {
        if let Some(backend) = self.client.get() {
            return Capability::Capable(Arc::clone(backend));
        }

        let settings = self.settings.load();
        if settings.credential().is_none() {
            debug!("No API credential configured");
            return Capability::Incapable(GateError::Unconfigured);
        }

        match self.factory.build(&settings) {
            Ok(backend) => {
                // Concurrent first checks may both build; the first stored wins.
                let cached = self.client.get_or_init(|| backend);
                info!(
                    backend = cached.name(),
                    model = cached.model(),
                    "Backend client ready"
                );
                Capability::Capable(Arc::clone(cached))
            }
            Err(e) => {
                debug!(error = %e, "Backend client construction failed");
                Capability::Incapable(GateError::ClientConstructionFailed(e))
            }
        }
    }

    /// Whether a client has been built and cached
    pub fn is_initialized(&self) -> bool {
        self.client.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_primary_key_wins() {
        let settings = EnvSettings::default().resolve(lookup(&[
            (API_KEY_ENV, "primary"),
            (API_KEY_FALLBACK_ENV, "secondary"),
        ]));
        assert_eq!(settings.api_key.as_deref(), Some("primary"));
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_fallback_key_used_when_primary_blank() {
        let settings = EnvSettings::default().resolve(lookup(&[
            (API_KEY_ENV, "  "),
            (API_KEY_FALLBACK_ENV, "secondary"),
        ]));
        assert_eq!(settings.api_key.as_deref(), Some("secondary"));
    }

    #[test]
    fn test_no_key() {
        let settings = EnvSettings::default().resolve(lookup(&[]));
        assert_eq!(settings.api_key, None);
    }

    #[test]
    fn test_model_precedence() {
        let vars = [(MODEL_ENV, "gemini-1.5-pro")];
        let settings = EnvSettings::default().resolve(lookup(&vars));
        assert_eq!(settings.model, "gemini-1.5-pro");

        let settings = EnvSettings::default()
            .with_model("gemini-2.0-flash")
            .resolve(lookup(&vars));
        assert_eq!(settings.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_unconfigured_gate_is_incapable() {
        let gate = CapabilityGate::new(BackendSettings::default(), TypedFactory(BackendType::Gemini));
        let capability = gate.check();
        assert!(matches!(capability, Capability::Incapable(GateError::Unconfigured)));
        assert!(!gate.is_initialized());
    }

    #[test]
    fn test_malformed_key_is_construction_failure() {
        let gate = CapabilityGate::new(
            BackendSettings::new("bad key"),
            TypedFactory(BackendType::Gemini),
        );
        assert!(matches!(
            gate.check(),
            Capability::Incapable(GateError::ClientConstructionFailed(_))
        ));
        assert!(!gate.is_initialized());
    }

    #[test]
    fn test_valid_key_builds_and_caches_gemini_client() {
        let gate = CapabilityGate::new(
            BackendSettings::new("test-key").with_model("gemini-2.5-pro"),
            TypedFactory(BackendType::Gemini),
        );
        match gate.check() {
            Capability::Capable(backend) => assert_eq!(backend.model(), "gemini-2.5-pro"),
            other => panic!("expected capable, got {:?}", other),
        }
        assert!(gate.is_initialized());
    }
}
