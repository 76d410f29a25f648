use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use granteval_evaluator::{
    interpret, normalize, EvaluationPrompts, EvaluationRequest, EvaluationResult, FallbackPolicy,
};
use granteval_logging::{LogEvent, Logger};

use crate::error::PipelineError;
use crate::gate::{Capability, CapabilityGate};
use crate::outcome::{Evaluation, EvaluationSource};

/// Runs a request through gate, prompt, backend, interpreter and normalizer,
/// routing every failure to the fallback policy.
///
/// Holds no per-call state, so one engine can be shared across tasks.
pub struct EvaluationEngine {
    gate: CapabilityGate,
    logger: Option<Arc<Logger>>,
}

impl EvaluationEngine {
    pub fn new(gate: CapabilityGate) -> Self {
        Self { gate, logger: None }
    }

    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn gate(&self) -> &CapabilityGate {
        &self.gate
    }

    /// Evaluate a request. Always returns a result of the request's kind.
    pub async fn evaluate(&self, request: &EvaluationRequest) -> EvaluationResult {
        self.evaluate_detailed(request).await.into_result()
    }

    /// Evaluate a request and report whether the backend or the fallback
    /// policy produced the result
    pub async fn evaluate_detailed(&self, request: &EvaluationRequest) -> Evaluation {
        let start = Instant::now();
        let kind = request.kind();

        self.log(LogEvent::EvaluationStarted {
            kind: kind.to_string(),
            input_preview: input_preview(request),
        });

        let (result, source) = match self.run_pipeline(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let reason = e.fallback_reason();
                warn!(kind = %kind, reason = %reason, error = %e, "Evaluation fell back to defaults");
                self.log(LogEvent::FallbackApplied {
                    kind: kind.to_string(),
                    reason: reason.to_string(),
                    error: e.to_string(),
                });
                (
                    FallbackPolicy::apply(request, reason),
                    EvaluationSource::Fallback {
                        reason,
                        error: e.to_string(),
                    },
                )
            }
        };

        let duration = start.elapsed();
        self.log(LogEvent::EvaluationCompleted {
            kind: kind.to_string(),
            source: source.label().to_string(),
            score_count: result.scores().len(),
            duration_secs: duration.as_secs_f64(),
        });

        Evaluation::new(result, source, duration)
    }

    async fn run_pipeline(
        &self,
        request: &EvaluationRequest,
    ) -> Result<(EvaluationResult, EvaluationSource), PipelineError> {
        let backend = match self.gate.check() {
            Capability::Capable(backend) => backend,
            Capability::Incapable(e) => return Err(e.into()),
        };

        let prompt = EvaluationPrompts::build(request);
        debug!(
            kind = %request.kind(),
            prompt_len = prompt.len(),
            model = backend.model(),
            "Invoking backend"
        );

        let output = backend.generate(&prompt).await?;

        self.log(LogEvent::BackendResponded {
            kind: request.kind().to_string(),
            model: output.model.clone(),
            duration_secs: output.duration.as_secs_f64(),
            text_len: output.text_len(),
        });

        let candidate = interpret(&output.text)?;
        let result = normalize(&candidate, request.kind());

        info!(
            kind = %request.kind(),
            parse_tier = %candidate.tier(),
            scores = result.scores().len(),
            "Backend evaluation normalized"
        );

        Ok((
            result,
            EvaluationSource::Backend {
                model: output.model,
                duration_secs: output.duration.as_secs_f64(),
                parse_tier: candidate.tier(),
            },
        ))
    }

    fn log(&self, event: LogEvent) {
        if let Some(ref logger) = self.logger {
            logger.log(&event);
        }
    }
}

fn input_preview(request: &EvaluationRequest) -> String {
    let text = match request {
        EvaluationRequest::Proposal(req) => &req.title,
        EvaluationRequest::IdeaDraft(req) => &req.idea,
    };
    text.chars().take(100).collect()
}
