//! Settle Sherpa service entry point.

use std::sync::Arc;
use std::time::Duration;

use http::HeaderValue;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use settle_sherpa::adapters::ai::{AnthropicConfig, AnthropicProvider, MockAIProvider};
use settle_sherpa::adapters::classifier::{HttpClassifier, HttpClassifierConfig, MockClassifier};
use settle_sherpa::adapters::http::api_router;
use settle_sherpa::adapters::http::negotiation::NegotiationHandlers;
use settle_sherpa::adapters::storage::InMemorySessionStore;
use settle_sherpa::application::handlers::negotiation::{
    GetSessionHandler, ProcessTurnHandler, StartSessionHandler, SubmitDocumentsHandler,
};
use settle_sherpa::config::AppConfig;
use settle_sherpa::ports::{AIProvider, DocumentClassifier, SessionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    let policy = config.negotiation.to_policy();

    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    let provider: Arc<dyn AIProvider> = match &config.ai.anthropic_api_key {
        Some(key) if !key.is_empty() => {
            tracing::info!(model = %config.ai.model, "using Anthropic provider");
            Arc::new(AnthropicProvider::new(
                AnthropicConfig::new(key.clone())
                    .with_model(config.ai.model.clone())
                    .with_timeout(config.ai.timeout()),
            ))
        }
        _ => {
            tracing::warn!("no model API key configured; using mock provider");
            Arc::new(MockAIProvider::new())
        }
    };

    let classifier: Arc<dyn DocumentClassifier> = match &config.classifier.base_url {
        Some(url) if !url.is_empty() => {
            tracing::info!(url = %url, "using HTTP document classifier");
            Arc::new(HttpClassifier::new(
                HttpClassifierConfig::new(url.clone()).with_timeout(config.classifier.timeout()),
            ))
        }
        _ => {
            tracing::warn!("no classifier endpoint configured; using mock classifier");
            Arc::new(MockClassifier::new())
        }
    };

    let handlers = NegotiationHandlers::new(
        Arc::new(StartSessionHandler::new(store.clone())),
        Arc::new(ProcessTurnHandler::new(
            store.clone(),
            provider,
            classifier.clone(),
            policy.clone(),
            config.ai.timeout(),
            config.classifier.timeout(),
        )),
        Arc::new(SubmitDocumentsHandler::new(
            store.clone(),
            classifier,
            &policy,
            config.classifier.timeout(),
        )),
        Arc::new(GetSessionHandler::new(store)),
    );

    let cors = if config.server.cors_origins_list().is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = config
            .server
            .cors_origins_list()
            .iter()
            .filter_map(|origin| origin.parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    let app = api_router(handlers).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(cors),
    );

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "settle-sherpa listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
