use thiserror::Error;

use granteval_backend::BackendError;
use granteval_evaluator::{FallbackReason, InterpretError};

use crate::GateError;

/// Any reason the pipeline could not produce a backend-derived result.
/// Never surfaces past the engine; every variant ends in the fallback policy.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Interpret(#[from] InterpretError),
}

impl PipelineError {
    pub fn fallback_reason(&self) -> FallbackReason {
        match self {
            PipelineError::Gate(_) => FallbackReason::Unavailable,
            PipelineError::Backend(_) | PipelineError::Interpret(_) => FallbackReason::Failed,
        }
    }
}
