use serde::Serialize;
use std::time::Duration;

use granteval_evaluator::{EvaluationResult, FallbackReason, ParseTier};

/// Where an evaluation result came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EvaluationSource {
    /// Normalized from backend output
    Backend {
        model: String,
        duration_secs: f64,
        parse_tier: ParseTier,
    },
    /// Deterministic default result
    Fallback {
        reason: FallbackReason,
        error: String,
    },
}

impl EvaluationSource {
    pub fn label(&self) -> &'static str {
        match self {
            EvaluationSource::Backend { .. } => "backend",
            EvaluationSource::Fallback { .. } => "fallback",
        }
    }
}

/// An evaluation result together with how it was produced
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub result: EvaluationResult,
    pub source: EvaluationSource,
    pub total_duration_secs: f64,
}

impl Evaluation {
    pub fn new(result: EvaluationResult, source: EvaluationSource, duration: Duration) -> Self {
        Self {
            result,
            source,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, EvaluationSource::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self.source {
            EvaluationSource::Fallback { reason, .. } => Some(reason),
            EvaluationSource::Backend { .. } => None,
        }
    }

    pub fn into_result(self) -> EvaluationResult {
        self.result
    }
}
