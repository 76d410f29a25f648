mod gemini;
mod output;
mod traits;

pub use gemini::GeminiBackend;
pub use output::BackendOutput;
pub use traits::{
    Backend, BackendError, BackendSettings, BackendType, DEFAULT_BASE_URL, DEFAULT_MODEL,
};

use std::sync::Arc;

/// Create a backend by type
pub fn create_backend(
    backend_type: BackendType,
    settings: &BackendSettings,
) -> Result<Arc<dyn Backend>, BackendError> {
    match backend_type {
        BackendType::Gemini => Ok(Arc::new(GeminiBackend::new(settings)?)),
    }
}
