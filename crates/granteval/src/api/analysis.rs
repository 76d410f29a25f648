use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use granteval_evaluator::normalizer::{coerce_number, coerce_string};
use granteval_evaluator::{EvaluationRequest, EvaluationResult, IdeaDraftRequest};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalysisBody {
    pub title: Option<Value>,
    pub description: Option<Value>,
    /// `None` only when the key is absent; an explicit `null` coerces to 0
    #[serde(default, deserialize_with = "present")]
    pub amount: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct IdeaBody {
    pub idea: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Serialize)]
pub struct AnalysisResponse {
    pub ok: bool,
    pub analysis: EvaluationResult,
}

#[derive(Serialize)]
pub struct ProposalResponse {
    pub ok: bool,
    pub proposal: EvaluationResult,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// POST /api/analysis
pub async fn analyze_proposal(
    State(state): State<AppState>,
    Json(body): Json<AnalysisBody>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    const REQUIRED: &str = "title, description, amount are required";

    let title = body.title.as_ref().map(coerce_string).unwrap_or_default();
    let description = body
        .description
        .as_ref()
        .map(coerce_string)
        .unwrap_or_default();
    let amount = body
        .amount
        .as_ref()
        .map(coerce_number)
        .ok_or_else(|| bad_request(REQUIRED))?;

    let request = EvaluationRequest::proposal(title, description, amount);
    request.validate().map_err(|_| bad_request(REQUIRED))?;

    debug!("Analyzing proposal");
    let analysis = state.engine.evaluate(&request).await;

    Ok(Json(AnalysisResponse { ok: true, analysis }))
}

/// POST /api/analysis/idea
pub async fn draft_from_idea(
    State(state): State<AppState>,
    Json(body): Json<IdeaBody>,
) -> Result<Json<ProposalResponse>, ApiError> {
    let idea = match body.idea {
        Some(Value::String(idea)) => idea,
        _ => return Err(bad_request("idea (string) is required")),
    };

    let request = IdeaDraftRequest::new(idea);
    request.validate().map_err(|e| bad_request(e.to_string()))?;

    debug!("Drafting proposal from idea");
    let proposal = state.engine.evaluate(&request.into()).await;

    Ok(Json(ProposalResponse { ok: true, proposal }))
}
