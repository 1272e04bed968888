use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Config {
    /// Load the common settings.
    ///
    /// Precedence: `APP__*` environment variables, then the optional
    /// `configuration` file, then a plain `PORT` variable, then defaults.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let fallback_port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("PORT must be a valid port number: {}", e))
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let config = Cfg::builder()
            .set_default("port", i64::from(fallback_port))?
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
