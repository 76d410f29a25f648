use crate::{EvaluationRequest, IdeaDraftRequest, ProposalEvaluationRequest, ScoreCategory};

/// Prompt templates for the evaluation backend
pub struct EvaluationPrompts;

impl EvaluationPrompts {
    /// Build the prompt for any request
    pub fn build(request: &EvaluationRequest) -> String {
        match request {
            EvaluationRequest::Proposal(req) => Self::build_evaluation_prompt(req),
            EvaluationRequest::IdeaDraft(req) => Self::build_draft_prompt(req),
        }
    }

    /// Build the prompt that scores an existing proposal
    pub fn build_evaluation_prompt(request: &ProposalEvaluationRequest) -> String {
        format!(
            r#"You are an expert VC analyst. Analyze the following grant proposal and return a concise JSON with fields: summary (string), recommendations (string), and scores (array of objects with category and score 0-100) for categories [{categories}].

Title: {title}
Amount requested: {amount}
Description: {description}

Return ONLY a compact JSON object with exactly this shape, no extra text, no markdown, no code fences:
{{
  "summary": string,
  "recommendations": string,
  "scores": [ {{ "category": {category_enum}, "score": number }} ]
}}"#,
            categories = category_list(),
            title = request.title,
            amount = request.amount,
            description = request.description,
            category_enum = category_enum(),
        )
    }

    /// Build the prompt that turns a freeform idea into a proposal draft
    pub fn build_draft_prompt(request: &IdeaDraftRequest) -> String {
        format!(
            r#"You are an expert VC analyst and proposal writer. Based on the user's idea below, construct a concise, structured grant proposal.

User Idea:
{idea}

Return ONLY a compact JSON object with the following fields, no extra text, no markdown, no code fences:
{{
  "title": string,
  "description": string,
  "amountSuggestion": number,
  "milestones": [ {{ "title": string, "description": string }} ],
  "budget": [ {{ "item": string, "cost": number }} ],
  "aiSummary": string,
  "aiScores": [ {{ "category": {category_enum}, "score": number }} ],
  "recommendations": string
}}"#,
            idea = request.idea,
            category_enum = category_enum(),
        )
    }
}

fn category_list() -> String {
    ScoreCategory::ALL
        .iter()
        .map(ScoreCategory::label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `"Market Fit"|"Team Quality"|...`
fn category_enum() -> String {
    ScoreCategory::ALL
        .iter()
        .map(|c| format!("\"{}\"", c.label()))
        .collect::<Vec<_>>()
        .join("|")
}
