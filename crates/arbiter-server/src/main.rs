use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arbiter_judge::policy::Policy;
use arbiter_judge::service::EvaluationService;
use arbiter_llm::groq::GroqChatModel;
use arbiter_server::config::ServerConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arbiter_server=info".into()),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    let model = Arc::new(GroqChatModel::new(
        config.api_key.clone(),
        config.model_id.clone(),
    ));
    let service = Arc::new(EvaluationService::new(
        model,
        Policy::new(config.policy),
        config.timeout,
    ));
    if let Err(err) = service.validate() {
        tracing::error!("policy template error: {err}");
        std::process::exit(1);
    }

    let app = arbiter_server::app_router(service);

    tracing::info!(
        policy = %config.policy,
        model = %config.model_id,
        "arbiter listening on {}",
        config.addr
    );

    let listener = tokio::net::TcpListener::bind(&config.addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
