use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Deserialize)]
pub struct ContactConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    /// `None` runs the service without persistence.
    pub mongodb: Option<MongoConfig>,
    pub telegram: TelegramConfig,
    pub cors: CorsConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: Secret<String>,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Missing token disables delivery; every dispatch then reports failure.
    pub bot_token: Option<Secret<String>>,
    pub chat_ids: Vec<String>,
    pub api_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl ContactConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let mongodb = match non_empty_env("MONGO_URL") {
            Some(uri) => Some(MongoConfig {
                uri: Secret::new(uri),
                database: get_env("DB_NAME", Some("contact_db"), is_prod)?,
            }),
            None => None,
        };

        Ok(ContactConfig {
            common: common_config,
            mongodb,
            telegram: TelegramConfig {
                bot_token: non_empty_env("TELEGRAM_BOT_TOKEN").map(Secret::new),
                chat_ids: split_list(&env::var("TELEGRAM_CHAT_IDS").unwrap_or_default()),
                api_base_url: get_env("TELEGRAM_API_URL", Some(DEFAULT_TELEGRAM_API_URL), false)?,
            },
            cors: CorsConfig {
                allowed_origins: split_list(&get_env("CORS_ORIGINS", Some("*"), false)?),
            },
            observability: ObservabilityConfig {
                log_level: get_env("LOG_LEVEL", Some("info"), false)?,
                otlp_endpoint: non_empty_env("OTLP_ENDPOINT"),
            },
        })
    }

    pub fn persistence_enabled(&self) -> bool {
        self.mongodb.is_some()
    }
}

/// Split a comma-separated list, trimming entries and dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
