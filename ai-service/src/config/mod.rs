use crate::services::providers::BackendKind;
use axum::http::HeaderValue;
use secrecy::SecretString;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_RESPONSE_LANGUAGE: &str = "Czech";
const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://frontend:3000"];

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub common: core_config::Config,
    pub model: ModelConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Credential for the remote backend. Absent selects the stub.
    pub api_key: Option<SecretString>,
    /// Explicit backend choice; `None` derives it from `api_key`.
    pub backend: Option<BackendKind>,
    pub model_name: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub api_base: String,
    pub timeout: Duration,
    /// Language the model is asked to answer in.
    pub response_language: String,
}

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Accepted bearer tokens. Empty accepts any well-formed bearer token.
    pub api_tokens: Vec<SecretString>,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: CorsOrigins,
}

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    /// `*`: any origin, without credentials.
    Any,
    List(Vec<HeaderValue>),
}

impl CorsConfig {
    /// Parse configured origins. `*` must stand alone; every other entry must
    /// be an `http(s)://` origin that is a valid header value.
    pub fn from_origins(origins: &[String]) -> Result<Self, AppError> {
        if origins.iter().any(|o| o == "*") {
            if origins.len() > 1 {
                return Err(config_error(
                    "CORS_ALLOWED_ORIGINS: '*' cannot be combined with explicit origins",
                ));
            }
            return Ok(Self {
                allowed_origins: CorsOrigins::Any,
            });
        }

        let parsed = origins
            .iter()
            .map(|origin| {
                if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                    return Err(config_error(format!(
                        "CORS_ALLOWED_ORIGINS: '{}' is not an http(s) origin",
                        origin
                    )));
                }
                HeaderValue::from_str(origin).map_err(|e| {
                    config_error(format!(
                        "CORS_ALLOWED_ORIGINS: '{}' is not a valid origin: {}",
                        origin, e
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            allowed_origins: CorsOrigins::List(parsed),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl ModelConfig {
    /// Backend that will serve requests.
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.unwrap_or(if self.api_key.is_some() {
            BackendKind::Remote
        } else {
            BackendKind::Stub
        })
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.max_tokens == 0 {
            return Err(config_error("MAX_TOKENS must be a positive integer"));
        }
        if self.timeout.is_zero() {
            return Err(config_error(
                "AI_REQUEST_TIMEOUT_SECS must be a positive number of seconds",
            ));
        }
        if !self.temperature.is_finite() || !(0.0..=2.0).contains(&self.temperature) {
            return Err(config_error("TEMPERATURE must be between 0 and 2"));
        }
        if self.backend == Some(BackendKind::Remote) && self.api_key.is_none() {
            return Err(config_error(
                "AI_BACKEND=remote requires OPENAI_API_KEY to be set",
            ));
        }
        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            backend: None,
            model_name: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            response_language: DEFAULT_RESPONSE_LANGUAGE.to_string(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: CorsOrigins::List(
                DEFAULT_CORS_ORIGINS
                    .into_iter()
                    .map(HeaderValue::from_static)
                    .collect(),
            ),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            otlp_endpoint: None,
        }
    }
}

impl AiConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let model = ModelConfig {
            api_key: get_optional_env("OPENAI_API_KEY").map(SecretString::new),
            backend: get_optional_env("AI_BACKEND")
                .map(|raw| BackendKind::from_str(&raw).map_err(config_error))
                .transpose()?,
            model_name: get_env("AI_MODEL_NAME", Some(DEFAULT_MODEL), is_prod)?,
            max_tokens: parse_env("MAX_TOKENS", DEFAULT_MAX_TOKENS, is_prod)?,
            temperature: parse_env("TEMPERATURE", DEFAULT_TEMPERATURE, is_prod)?,
            api_base: get_env("AI_API_BASE", Some(DEFAULT_API_BASE), false)?,
            timeout: Duration::from_secs(parse_env(
                "AI_REQUEST_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
                false,
            )?),
            response_language: get_env(
                "AI_RESPONSE_LANGUAGE",
                Some(DEFAULT_RESPONSE_LANGUAGE),
                false,
            )?,
        };
        model.validate()?;

        let auth = AuthConfig {
            api_tokens: get_optional_env("AI_API_TOKENS")
                .map(|raw| split_list(&raw).into_iter().map(SecretString::new).collect())
                .unwrap_or_default(),
        };

        let cors = match get_optional_env("CORS_ALLOWED_ORIGINS") {
            Some(raw) => CorsConfig::from_origins(&split_list(&raw))?,
            None => CorsConfig::default(),
        };

        let observability = ObservabilityConfig {
            log_level: get_env("LOG_LEVEL", Some("info"), false)?,
            otlp_endpoint: get_optional_env("OTLP_ENDPOINT"),
        };

        Ok(AiConfig {
            common,
            model,
            auth,
            cors,
            observability,
        })
    }
}

fn config_error(msg: impl Into<String>) -> AppError {
    AppError::ConfigError(anyhow::anyhow!(msg.into()))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn get_optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match get_optional_env(key) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(config_error(format!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(config_error(format!("{} is required but not set", key)))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: T, is_prod: bool) -> Result<T, AppError>
where
    T: FromStr + ToString,
    T::Err: std::fmt::Display,
{
    get_env(key, Some(&default.to_string()), is_prod)?
        .trim()
        .parse()
        .map_err(|e| config_error(format!("{} has an invalid value: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_follows_credential_presence() {
        let mut model = ModelConfig::default();
        assert_eq!(model.backend_kind(), BackendKind::Stub);

        model.api_key = Some(SecretString::new("sk-test".to_string()));
        assert_eq!(model.backend_kind(), BackendKind::Remote);

        model.backend = Some(BackendKind::Stub);
        assert_eq!(model.backend_kind(), BackendKind::Stub);
    }

    #[test]
    fn remote_without_credential_is_rejected() {
        let model = ModelConfig {
            backend: Some(BackendKind::Remote),
            ..Default::default()
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn out_of_range_settings_are_rejected() {
        let zero_tokens = ModelConfig {
            max_tokens: 0,
            ..Default::default()
        };
        assert!(zero_tokens.validate().is_err());

        let hot = ModelConfig {
            temperature: 3.5,
            ..Default::default()
        };
        assert!(hot.validate().is_err());

        let no_timeout = ModelConfig {
            timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(no_timeout.validate().is_err());

        assert!(ModelConfig::default().validate().is_ok());
    }

    #[test]
    fn split_list_trims_and_drops_blanks() {
        assert_eq!(
            split_list(" http://a:3000, ,http://b:3000 "),
            vec!["http://a:3000", "http://b:3000"]
        );
    }

    #[test]
    fn backend_kind_parses_aliases() {
        assert_eq!("OpenAI".parse::<BackendKind>().unwrap(), BackendKind::Remote);
        assert_eq!("mock".parse::<BackendKind>().unwrap(), BackendKind::Stub);
        assert!("gemini".parse::<BackendKind>().is_err());
    }

    fn origins(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn wildcard_origin_allows_any() {
        let cors = CorsConfig::from_origins(&origins(&["*"])).unwrap();
        assert_eq!(cors.allowed_origins, CorsOrigins::Any);
    }

    #[test]
    fn wildcard_mixed_with_origins_is_rejected() {
        let err = CorsConfig::from_origins(&origins(&["*", "http://localhost:3000"])).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn invalid_origins_are_rejected() {
        for bad in ["localhost:3000", "http://bad\norigin", "ftp://files.example"] {
            let err = CorsConfig::from_origins(&origins(&[bad])).unwrap_err();
            assert!(matches!(err, AppError::ConfigError(_)), "{bad} was accepted");
        }
    }

    #[test]
    fn explicit_origins_are_parsed() {
        let cors = CorsConfig::from_origins(&origins(&[
            "http://localhost:3000",
            "https://app.example.cz",
        ]))
        .unwrap();
        assert_eq!(
            cors.allowed_origins,
            CorsOrigins::List(vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("https://app.example.cz"),
            ])
        );
        assert_eq!(
            CorsConfig::default().allowed_origins,
            CorsOrigins::List(vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://frontend:3000"),
            ])
        );
    }
}
