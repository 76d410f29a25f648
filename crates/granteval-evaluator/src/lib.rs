mod fallback;
mod interpreter;
pub mod normalizer;
mod prompts;
mod types;

pub use fallback::{FallbackPolicy, FallbackReason, FALLBACK_TITLE_LEN};
pub use interpreter::{interpret, Candidate, InterpretError, ParseTier};
pub use normalizer::normalize;
pub use prompts::EvaluationPrompts;
pub use types::{
    BudgetItem, EvaluationRequest, EvaluationResult, IdeaDraftRequest, Milestone,
    ProposalDraft, ProposalEvaluation, ProposalEvaluationRequest, RequestKind, Score,
    ScoreCategory, ValidationError, MIN_IDEA_LEN,
};
