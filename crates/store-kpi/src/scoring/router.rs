use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::report::{EvaluationInput, EvaluationOutcome, StoreEvaluation};
use super::weights::ComplaintWeight;
use super::ScoringEngine;

/// Batch of store/period evaluations sharing one weight table.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationBatchRequest {
    /// Replaces the configured channel weights for this batch only.
    #[serde(default)]
    pub weights: Option<Vec<ComplaintWeight>>,
    pub evaluations: Vec<EvaluationInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationBatchResponse {
    pub scored: usize,
    pub no_data: usize,
    pub evaluations: Vec<StoreEvaluation>,
}

impl EvaluationBatchResponse {
    pub fn new(evaluations: Vec<StoreEvaluation>) -> Self {
        let scored = evaluations
            .iter()
            .filter(|evaluation| matches!(evaluation.outcome, EvaluationOutcome::Scored(_)))
            .count();

        Self {
            scored,
            no_data: evaluations.len() - scored,
            evaluations,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightTableView {
    pub default_weight: f64,
    pub weights: Vec<ComplaintWeight>,
}

/// Router builder exposing the scoring endpoints.
pub fn evaluation_router(engine: Arc<ScoringEngine>) -> Router {
    Router::new()
        .route("/api/v1/kpi/evaluations", post(evaluate_handler))
        .route("/api/v1/kpi/weights", get(weights_handler))
        .with_state(engine)
}

pub(crate) async fn evaluate_handler(
    State(engine): State<Arc<ScoringEngine>>,
    Json(request): Json<EvaluationBatchRequest>,
) -> Response {
    let override_table = match request.weights {
        Some(weights) => match engine.weights().with_weights(weights) {
            Ok(table) => Some(table),
            Err(error) => {
                let payload = json!({ "error": error.to_string() });
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
            }
        },
        None => None,
    };

    match engine.evaluate_batch(&request.evaluations, override_table.as_ref()) {
        Ok(evaluations) => {
            (StatusCode::OK, Json(EvaluationBatchResponse::new(evaluations))).into_response()
        }
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
                "index": error.index,
                "store_id": error.store_id,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn weights_handler(State(engine): State<Arc<ScoringEngine>>) -> Response {
    let table = engine.weights();
    let view = WeightTableView {
        default_weight: table.default_weight(),
        weights: table.weights().to_vec(),
    };
    (StatusCode::OK, Json(view)).into_response()
}
