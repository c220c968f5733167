use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use arbiter_core::error::{ArbiterError, ModelError};

/// Application error type that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Arbiter(ArbiterError),
}

impl From<ArbiterError> for AppError {
    fn from(err: ArbiterError) -> Self {
        AppError::Arbiter(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // Upstream never finished in time.
            AppError::Arbiter(ArbiterError::Model(ModelError::Timeout { .. })) => {
                (StatusCode::GATEWAY_TIMEOUT, "model call timed out".into())
            }
            // A rejected provider key is the operator's problem, not the
            // caller's, so it is not surfaced as 401.
            AppError::Arbiter(ArbiterError::Model(err)) => {
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            // Contract violation by the model. The raw output is already in
            // the logs; the response stays generic.
            AppError::Arbiter(ArbiterError::Coerce(_)) => (
                StatusCode::BAD_GATEWAY,
                "model returned output that does not match the grading policy".into(),
            ),
            // Template failures are deploy-time defects caught by startup
            // validation; reaching here is an internal bug.
            AppError::Arbiter(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
