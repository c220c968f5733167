pub mod api;
pub mod config;
pub mod error;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use arbiter_judge::service::EvaluationService;

pub fn app_router(service: Arc<EvaluationService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::routes(service).layer(cors)
}
