mod engine;
mod error;
mod gate;
mod outcome;

pub use engine::EvaluationEngine;
pub use error::PipelineError;
pub use gate::{
    BackendFactory, Capability, CapabilityGate, EnvSettings, GateError, SettingsSource,
    TypedFactory, API_KEY_ENV, API_KEY_FALLBACK_ENV, MODEL_ENV,
};
pub use outcome::{Evaluation, EvaluationSource};
