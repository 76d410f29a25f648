mod analysis;
mod health;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use granteval_core::EvaluationEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<EvaluationEngine>,
}

pub fn create_router(engine: Arc<EvaluationEngine>) -> Router {
    let state = AppState { engine };

    Router::new()
        .route("/health", get(health::health))
        .route("/api/analysis", post(analysis::analyze_proposal))
        .route("/api/analysis/idea", post(analysis::draft_from_idea))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
