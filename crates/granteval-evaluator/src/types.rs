use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::normalizer::coerce_number;

/// Minimum trimmed length of a freeform idea accepted at the boundary
pub const MIN_IDEA_LEN: usize = 10;

/// Request to evaluate an existing structured proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalEvaluationRequest {
    pub title: String,
    pub description: String,
    /// Requested funding; accepts a JSON number or a numeric string
    #[serde(deserialize_with = "deserialize_amount", serialize_with = "serialize_number")]
    pub amount: f64,
}

/// Request to draft a proposal from a freeform idea
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaDraftRequest {
    pub idea: String,
}

/// Anything the evaluation engine accepts
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationRequest {
    Proposal(ProposalEvaluationRequest),
    IdeaDraft(IdeaDraftRequest),
}

/// Discriminant of a request (and of the result it produces)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Proposal,
    IdeaDraft,
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestKind::Proposal => write!(f, "proposal"),
            RequestKind::IdeaDraft => write!(f, "idea_draft"),
        }
    }
}

/// Boundary validation failures. The engine itself never rejects a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Idea must be a non-empty string of at least {min} characters (got {actual})")]
    IdeaTooShort { min: usize, actual: usize },
}

impl ProposalEvaluationRequest {
    pub fn new(title: impl Into<String>, description: impl Into<String>, amount: f64) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            amount,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description"));
        }
        Ok(())
    }
}

impl IdeaDraftRequest {
    pub fn new(idea: impl Into<String>) -> Self {
        Self { idea: idea.into() }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let actual = self.idea.trim().chars().count();
        if actual < MIN_IDEA_LEN {
            return Err(ValidationError::IdeaTooShort {
                min: MIN_IDEA_LEN,
                actual,
            });
        }
        Ok(())
    }
}

impl EvaluationRequest {
    pub fn proposal(title: impl Into<String>, description: impl Into<String>, amount: f64) -> Self {
        Self::Proposal(ProposalEvaluationRequest::new(title, description, amount))
    }

    pub fn idea(idea: impl Into<String>) -> Self {
        Self::IdeaDraft(IdeaDraftRequest::new(idea))
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Proposal(_) => RequestKind::Proposal,
            Self::IdeaDraft(_) => RequestKind::IdeaDraft,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Proposal(req) => req.validate(),
            Self::IdeaDraft(req) => req.validate(),
        }
    }
}

impl From<ProposalEvaluationRequest> for EvaluationRequest {
    fn from(req: ProposalEvaluationRequest) -> Self {
        Self::Proposal(req)
    }
}

impl From<IdeaDraftRequest> for EvaluationRequest {
    fn from(req: IdeaDraftRequest) -> Self {
        Self::IdeaDraft(req)
    }
}

/// The standard scoring categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreCategory {
    MarketFit,
    TeamQuality,
    Innovation,
    Scalability,
    RiskLevel,
}

impl ScoreCategory {
    pub const ALL: [ScoreCategory; 5] = [
        ScoreCategory::MarketFit,
        ScoreCategory::TeamQuality,
        ScoreCategory::Innovation,
        ScoreCategory::Scalability,
        ScoreCategory::RiskLevel,
    ];

    /// Label used in prompts and results
    pub fn label(&self) -> &'static str {
        match self {
            ScoreCategory::MarketFit => "Market Fit",
            ScoreCategory::TeamQuality => "Team Quality",
            ScoreCategory::Innovation => "Innovation",
            ScoreCategory::Scalability => "Scalability",
            ScoreCategory::RiskLevel => "Risk Level",
        }
    }
}

impl std::fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ScoreCategory {
    type Err = String;

    /// Accepts the label ("Market Fit") as well as "MarketFit" or "market_fit"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "marketfit" => Ok(ScoreCategory::MarketFit),
            "teamquality" => Ok(ScoreCategory::TeamQuality),
            "innovation" => Ok(ScoreCategory::Innovation),
            "scalability" => Ok(ScoreCategory::Scalability),
            "risklevel" => Ok(ScoreCategory::RiskLevel),
            _ => Err(format!("Unknown score category: {}", s)),
        }
    }
}

/// A single category score. Unknown categories are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub category: String,
    #[serde(serialize_with = "serialize_number")]
    pub score: f64,
}

impl Score {
    pub fn new(category: impl Into<String>, score: f64) -> Self {
        Self {
            category: category.into(),
            score,
        }
    }

    /// The standard category this score belongs to, if any
    pub fn standard_category(&self) -> Option<ScoreCategory> {
        self.category.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub item: String,
    #[serde(serialize_with = "serialize_number")]
    pub cost: f64,
}

/// Evaluation of an existing proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalEvaluation {
    pub summary: String,
    pub recommendations: String,
    pub scores: Vec<Score>,
}

/// Proposal drafted from a freeform idea
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDraft {
    pub title: String,
    pub description: String,
    #[serde(serialize_with = "serialize_number")]
    pub amount_suggestion: f64,
    pub milestones: Vec<Milestone>,
    pub budget: Vec<BudgetItem>,
    pub ai_summary: String,
    pub ai_scores: Vec<Score>,
    pub recommendations: String,
}

/// Canonical engine output, one variant per request kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EvaluationResult {
    Proposal(ProposalEvaluation),
    IdeaDraft(ProposalDraft),
}

impl EvaluationResult {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Proposal(_) => RequestKind::Proposal,
            Self::IdeaDraft(_) => RequestKind::IdeaDraft,
        }
    }

    /// `summary` for evaluations, `aiSummary` for drafts
    pub fn summary(&self) -> &str {
        match self {
            Self::Proposal(eval) => &eval.summary,
            Self::IdeaDraft(draft) => &draft.ai_summary,
        }
    }

    pub fn recommendations(&self) -> &str {
        match self {
            Self::Proposal(eval) => &eval.recommendations,
            Self::IdeaDraft(draft) => &draft.recommendations,
        }
    }

    /// `scores` for evaluations, `aiScores` for drafts
    pub fn scores(&self) -> &[Score] {
        match self {
            Self::Proposal(eval) => &eval.scores,
            Self::IdeaDraft(draft) => &draft.ai_scores,
        }
    }

    pub fn as_evaluation(&self) -> Option<&ProposalEvaluation> {
        match self {
            Self::Proposal(eval) => Some(eval),
            Self::IdeaDraft(_) => None,
        }
    }

    pub fn as_draft(&self) -> Option<&ProposalDraft> {
        match self {
            Self::Proposal(_) => None,
            Self::IdeaDraft(draft) => Some(draft),
        }
    }
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_number(&value))
}

/// Whole numbers go out as JSON integers so `91` stays `91` on the wire.
fn serialize_number<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_amount_accepts_number_or_string() {
        let req: ProposalEvaluationRequest =
            serde_json::from_value(json!({"title": "t", "description": "d", "amount": "2500"}))
                .unwrap();
        assert_eq!(req.amount, 2500.0);

        let req: ProposalEvaluationRequest =
            serde_json::from_value(json!({"title": "t", "description": "d", "amount": 12.5}))
                .unwrap();
        assert_eq!(req.amount, 12.5);
    }

    #[test]
    fn test_proposal_validation() {
        assert!(ProposalEvaluationRequest::new("Solar", "Panels", 10.0)
            .validate()
            .is_ok());
        assert_eq!(
            ProposalEvaluationRequest::new("  ", "Panels", 10.0).validate(),
            Err(ValidationError::MissingField("title"))
        );
        assert_eq!(
            ProposalEvaluationRequest::new("Solar", "", 10.0).validate(),
            Err(ValidationError::MissingField("description"))
        );
    }

    #[test]
    fn test_idea_validation_counts_trimmed_chars() {
        assert!(IdeaDraftRequest::new("a community solar co-op").validate().is_ok());
        assert_eq!(
            IdeaDraftRequest::new("   short    ").validate(),
            Err(ValidationError::IdeaTooShort { min: 10, actual: 5 })
        );
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Market Fit".parse::<ScoreCategory>(), Ok(ScoreCategory::MarketFit));
        assert_eq!("RiskLevel".parse::<ScoreCategory>(), Ok(ScoreCategory::RiskLevel));
        assert_eq!("team_quality".parse::<ScoreCategory>(), Ok(ScoreCategory::TeamQuality));
        assert!("Feasibility".parse::<ScoreCategory>().is_err());
        assert_eq!(Score::new("Impact", 3.0).standard_category(), None);
    }

    #[test]
    fn test_whole_numbers_serialize_as_integers() {
        let draft = ProposalDraft {
            title: "t".into(),
            description: "d".into(),
            amount_suggestion: 50000.0,
            milestones: vec![],
            budget: vec![BudgetItem {
                item: "GPU".into(),
                cost: 1250.5,
            }],
            ai_summary: String::new(),
            ai_scores: vec![Score::new("Innovation", 91.0)],
            recommendations: String::new(),
        };
        let value = serde_json::to_value(EvaluationResult::IdeaDraft(draft)).unwrap();
        assert_eq!(value["amountSuggestion"], json!(50000));
        assert_eq!(value["budget"][0]["cost"], json!(1250.5));
        assert_eq!(value["aiScores"][0], json!({"category": "Innovation", "score": 91}));
    }
}
