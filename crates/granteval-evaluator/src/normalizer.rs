//! Coerces a [`Candidate`] into the canonical result schema.
//!
//! Normalization cannot fail: every declared field is filled, with `""`,
//! `0` or `[]` standing in for anything missing or of the wrong shape.

use serde_json::Value;

use crate::{
    BudgetItem, Candidate, EvaluationResult, Milestone, ProposalDraft, ProposalEvaluation,
    RequestKind, Score,
};

/// Normalize a candidate into the result variant for `kind`
pub fn normalize(candidate: &Candidate, kind: RequestKind) -> EvaluationResult {
    match kind {
        RequestKind::Proposal => EvaluationResult::Proposal(ProposalEvaluation {
            summary: string_field(candidate, "summary"),
            recommendations: string_field(candidate, "recommendations"),
            scores: scores(candidate.get("scores")),
        }),
        RequestKind::IdeaDraft => EvaluationResult::IdeaDraft(ProposalDraft {
            title: string_field(candidate, "title"),
            description: string_field(candidate, "description"),
            amount_suggestion: number_field(candidate, "amountSuggestion"),
            milestones: array(candidate.get("milestones"))
                .iter()
                .map(|m| Milestone {
                    title: member_string(m, "title"),
                    description: member_string(m, "description"),
                })
                .collect(),
            budget: array(candidate.get("budget"))
                .iter()
                .map(|b| BudgetItem {
                    item: member_string(b, "item"),
                    cost: member_number(b, "cost"),
                })
                .collect(),
            ai_summary: string_field(candidate, "aiSummary"),
            ai_scores: scores(candidate.get("aiScores")),
            recommendations: string_field(candidate, "recommendations"),
        }),
    }
}

/// Text form of a scalar; `""` for null, arrays and objects
pub fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Numeric form of a scalar; `0` for anything non-numeric or non-finite
pub fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

fn string_field(candidate: &Candidate, key: &str) -> String {
    candidate.get(key).map(coerce_string).unwrap_or_default()
}

fn number_field(candidate: &Candidate, key: &str) -> f64 {
    candidate.get(key).map(coerce_number).unwrap_or(0.0)
}

fn member_string(element: &Value, key: &str) -> String {
    element.get(key).map(coerce_string).unwrap_or_default()
}

fn member_number(element: &Value, key: &str) -> f64 {
    element.get(key).map(coerce_number).unwrap_or(0.0)
}

fn array(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

/// Order and count are preserved; no dedup, no category check
fn scores(value: Option<&Value>) -> Vec<Score> {
    array(value)
        .iter()
        .map(|el| Score {
            category: member_string(el, "category"),
            score: member_number(el, "score"),
        })
        .collect()
}
