#![allow(dead_code)]

use ai_service::config::{AiConfig, AuthConfig, CorsConfig, ModelConfig, ObservabilityConfig};
use ai_service::services::providers::{
    GenerationParams, ProviderError, ProviderResponse, StubTextProvider, TextProvider,
};
use ai_service::startup::Application;
use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub const TEST_TOKEN: &str = "test-token";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn with the deterministic stub backend and gateway trust.
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config(), Arc::new(StubTextProvider::new())).await
    }

    pub async fn spawn_with_provider(provider: Arc<dyn TextProvider>) -> Self {
        Self::spawn_with(test_config(), provider).await
    }

    pub async fn spawn_with(config: AiConfig, provider: Arc<dyn TextProvider>) -> Self {
        let app = Application::build_with_provider(config, provider)
            .await
            .expect("Failed to build test application");

        let port = app.http_port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// POST with the test bearer token.
    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .bearer_auth(TEST_TOKEN)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json_anonymous(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// Config for tests: random port, no credential, no token allow-list.
pub fn test_config() -> AiConfig {
    AiConfig {
        common: CoreConfig { port: 0 },
        model: ModelConfig::default(),
        auth: AuthConfig::default(),
        cors: CorsConfig::default(),
        observability: ObservabilityConfig::default(),
    }
}

pub fn config_with_tokens(tokens: &[&str]) -> AiConfig {
    let mut config = test_config();
    config.auth.api_tokens = tokens
        .iter()
        .map(|t| SecretString::new(t.to_string()))
        .collect();
    config
}

/// Backend that always fails like an unreachable remote.
pub struct FailingProvider;

#[async_trait]
impl TextProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::NetworkError(
            "connection refused (api key sk-secret)".to_string(),
        ))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Err(ProviderError::NetworkError("connection refused".to_string()))
    }
}

/// Backend that returns the same text for every call.
pub struct FixedTextProvider(pub String);

#[async_trait]
impl TextProvider for FixedTextProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        Ok(ProviderResponse {
            text: self.0.clone(),
            model: "fixed-model".to_string(),
            input_tokens: 10,
            output_tokens: 20,
            finish_reason: ai_service::services::providers::FinishReason::Complete,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
