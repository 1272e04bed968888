//! Application startup and lifecycle management.
//!
//! Wires configuration into the pipeline (prompt builder, model invoker,
//! response mapper), builds the HTTP router and owns the listener.

use crate::config::{AiConfig, CorsOrigins};
use crate::handlers::{ai, health};
use crate::services::auth::ConfiguredTokenVerifier;
use crate::services::metrics::init_metrics;
use crate::services::providers::{RemoteConfig, RemoteTextProvider, StubTextProvider};
use crate::services::{
    BackendKind, MedicalAssistant, ModelInvoker, PromptBuilder, TextProvider, TokenVerifier,
};
use axum::http::{header, Method};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AiConfig,
    pub assistant: MedicalAssistant,
    pub token_verifier: Arc<dyn TokenVerifier>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the backend selected by configuration.
    pub async fn build(config: AiConfig) -> Result<Self, AppError> {
        let text_provider = build_text_provider(&config)?;
        Self::build_with_provider(config, text_provider).await
    }

    /// Build the application around an already constructed backend.
    pub async fn build_with_provider(
        config: AiConfig,
        text_provider: Arc<dyn TextProvider>,
    ) -> Result<Self, AppError> {
        init_metrics();

        tracing::info!(
            provider = text_provider.name(),
            model = %config.model.model_name,
            "Initialized text-generation backend"
        );

        let invoker = ModelInvoker::new(
            text_provider,
            config.model.temperature,
            config.model.max_tokens,
        );
        let prompts = PromptBuilder::new(config.model.response_language.clone());
        let assistant = MedicalAssistant::new(prompts, invoker);

        if config.auth.api_tokens.is_empty() {
            tracing::info!("No API tokens configured; trusting any bearer token from the gateway");
        }
        let token_verifier: Arc<dyn TokenVerifier> =
            Arc::new(ConfiguredTokenVerifier::new(config.auth.api_tokens.clone()));

        let state = AppState {
            config: config.clone(),
            assistant,
            token_verifier,
        };

        // Port 0 = random port for testing
        let http_addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let http_listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", http_addr, e);
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!("AI service: HTTP on port {}", http_port);

        Ok(Self {
            http_port,
            http_listener,
            state,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Run the server until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        let router = build_router(self.state);

        axum::serve(self.http_listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

fn build_text_provider(config: &AiConfig) -> Result<Arc<dyn TextProvider>, AppError> {
    match config.model.backend_kind() {
        BackendKind::Remote => {
            let api_key = config.model.api_key.clone().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!(
                    "remote backend selected without OPENAI_API_KEY"
                ))
            })?;
            let provider = RemoteTextProvider::new(RemoteConfig {
                api_key,
                model: config.model.model_name.clone(),
                api_base: config.model.api_base.clone(),
                timeout: config.model.timeout,
            })
            .map_err(|e| {
                tracing::error!("Failed to initialize remote backend: {}", e);
                AppError::ConfigError(anyhow::anyhow!(e))
            })?;
            Ok(Arc::new(provider))
        }
        BackendKind::Stub => {
            tracing::warn!("No OPENAI_API_KEY configured; serving deterministic stub responses");
            Ok(Arc::new(StubTextProvider::new()))
        }
    }
}

/// Router with every route and the shared middleware stack.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors.allowed_origins);

    let api = Router::new()
        .route("/analyze-symptoms", post(ai::analyze_symptoms))
        .route("/medical-question", post(ai::medical_question))
        .route("/diagnosis-assistance", post(ai::diagnosis_assistance))
        .route("/info", get(ai::ai_info));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/api/info", get(health::service_info))
        .route("/metrics", get(health::metrics_endpoint))
        .nest("/api/ai", api)
        .fallback(health::not_found)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match origins {
        // Credentials cannot be combined with a wildcard origin.
        CorsOrigins::Any => layer.allow_origin(AllowOrigin::any()),
        CorsOrigins::List(list) => layer
            .allow_origin(AllowOrigin::list(list.iter().cloned()))
            .allow_credentials(true),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
