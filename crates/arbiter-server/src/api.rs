use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get, routing::post};
use serde_json::Value;

use arbiter_judge::service::EvaluationService;
use arbiter_judge::types::VerifyRequest;

use crate::error::AppError;

pub fn routes(service: Arc<EvaluationService>) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/verify", post(verify))
        .with_state(service)
}

async fn liveness() -> &'static str {
    "arbiter: ok"
}

/// Judge a user answer against the expected answer under the deployment's
/// policy. If the inbound connection drops, axum drops this future and the
/// in-flight provider call is cancelled with it.
async fn verify(
    State(service): State<Arc<EvaluationService>>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<Value>, AppError> {
    let verdict = service.evaluate(&request).await?;
    Ok(Json(verdict.to_response_json()))
}
