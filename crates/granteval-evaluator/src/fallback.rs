use serde::Serialize;

use crate::{
    EvaluationRequest, EvaluationResult, ProposalDraft, ProposalEvaluation, Score, ScoreCategory,
};

/// Longest prefix of the idea used as a fallback draft title, in characters
pub const FALLBACK_TITLE_LEN: usize = 60;

const UNTITLED: &str = "Untitled Proposal";

/// Why the deterministic result is being returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// No usable backend: credential missing or client could not be built
    Unavailable,
    /// The backend was called but no trustworthy result came back
    Failed,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::Unavailable => write!(f, "unavailable"),
            FallbackReason::Failed => write!(f, "failed"),
        }
    }
}

/// Deterministic result used on every failure path
pub struct FallbackPolicy;

impl FallbackPolicy {
    pub fn apply(request: &EvaluationRequest, reason: FallbackReason) -> EvaluationResult {
        match request {
            EvaluationRequest::Proposal(_) => EvaluationResult::Proposal(ProposalEvaluation {
                summary: summary(reason, "analysis"),
                recommendations: recommendations(reason).to_string(),
                scores: Self::scores(),
            }),
            EvaluationRequest::IdeaDraft(req) => EvaluationResult::IdeaDraft(ProposalDraft {
                title: fallback_title(&req.idea),
                description: req.idea.clone(),
                amount_suggestion: 0.0,
                milestones: Vec::new(),
                budget: Vec::new(),
                ai_summary: summary(reason, "summary"),
                ai_scores: Self::scores(),
                recommendations: recommendations(reason).to_string(),
            }),
        }
    }

    /// One score per standard category, in declaration order
    pub fn scores() -> Vec<Score> {
        ScoreCategory::ALL
            .iter()
            .map(|category| Score::new(category.label(), default_score(*category)))
            .collect()
    }
}

fn default_score(category: ScoreCategory) -> f64 {
    match category {
        ScoreCategory::MarketFit => 75.0,
        ScoreCategory::TeamQuality => 70.0,
        ScoreCategory::Innovation => 80.0,
        ScoreCategory::Scalability => 72.0,
        ScoreCategory::RiskLevel => 40.0,
    }
}

fn summary(reason: FallbackReason, noun: &str) -> String {
    match reason {
        FallbackReason::Unavailable => format!("AI service unavailable; using default {}.", noun),
        FallbackReason::Failed => format!("AI analysis failed; using default {}.", noun),
    }
}

fn recommendations(reason: FallbackReason) -> &'static str {
    match reason {
        FallbackReason::Unavailable => "Provide more details to enable thorough AI analysis.",
        FallbackReason::Failed => "Try again later or verify API configuration.",
    }
}

fn fallback_title(idea: &str) -> String {
    if idea.is_empty() {
        return UNTITLED.to_string();
    }
    idea.chars().take(FALLBACK_TITLE_LEN).collect()
}
