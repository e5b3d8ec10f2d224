//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;
use trip_scout_core::retry::RetryPolicy;
use trip_scout_core::PipelineSettings;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// `None` runs the service on process-local stores.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub scout_model: String,
    pub scout_model_label: String,
    /// `None` disables venue verification and day maps.
    pub places_api_key: Option<String>,
    pub cache_ttl: Duration,
    pub session_ttl: Duration,
    pub job_ttl: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub cors_origin: String,
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional_var(name) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        None => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Server and storage ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = optional_var("DATABASE_URL");

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Model ---
        let openai_api_key = optional_var("OPENAI_API_KEY")
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;
        let openai_base_url = optional_var("OPENAI_BASE_URL");
        let scout_model =
            optional_var("SCOUT_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());
        let scout_model_label =
            optional_var("SCOUT_MODEL_LABEL").unwrap_or_else(|| scout_model.clone());

        // --- Places ---
        let places_api_key = optional_var("GOOGLE_PLACES_API_KEY");

        // --- Pipeline tuning ---
        let cache_ttl = Duration::from_secs(parsed_var("CACHE_TTL_SECONDS", 3600u64)?);
        let session_ttl = Duration::from_secs(parsed_var("SESSION_TTL_SECONDS", 3600u64)?);
        let job_ttl = Duration::from_secs(parsed_var("JOB_TTL_SECONDS", 3600u64)?);
        let max_retries = parsed_var("SCOUT_MAX_RETRIES", 2u32)?;
        let retry_delay = Duration::from_millis(parsed_var("SCOUT_RETRY_DELAY_MS", 1000u64)?);

        let cors_origin = optional_var("CORS_ORIGIN")
            .unwrap_or_else(|| "http://localhost:3000".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            openai_api_key,
            openai_base_url,
            scout_model,
            scout_model_label,
            places_api_key,
            cache_ttl,
            session_ttl,
            job_ttl,
            max_retries,
            retry_delay,
            cors_origin,
        })
    }

    /// The plain settings value handed to the pipeline.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            cache_ttl: self.cache_ttl,
            session_ttl: self.session_ttl,
            job_ttl: self.job_ttl,
            retry: RetryPolicy::new(self.max_retries, self.retry_delay),
            model_label: self.scout_model_label.clone(),
            ..PipelineSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_var_falls_back_and_rejects_garbage() {
        std::env::remove_var("TRIP_SCOUT_TEST_UNSET");
        assert_eq!(parsed_var("TRIP_SCOUT_TEST_UNSET", 7u32).unwrap(), 7);

        std::env::set_var("TRIP_SCOUT_TEST_BAD", "seven");
        let err = parsed_var("TRIP_SCOUT_TEST_BAD", 7u32).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "TRIP_SCOUT_TEST_BAD"));

        std::env::set_var("TRIP_SCOUT_TEST_GOOD", " 12 ");
        assert_eq!(parsed_var("TRIP_SCOUT_TEST_GOOD", 7u32).unwrap(), 12);
    }

    #[test]
    fn settings_carry_retry_and_label() {
        let config = Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            database_url: None,
            log_level: Level::INFO,
            openai_api_key: "sk-test".into(),
            openai_base_url: None,
            scout_model: "gpt-4o-mini".into(),
            scout_model_label: "GPT-4o mini".into(),
            places_api_key: None,
            cache_ttl: Duration::from_secs(10),
            session_ttl: Duration::from_secs(20),
            job_ttl: Duration::from_secs(30),
            max_retries: 4,
            retry_delay: Duration::from_millis(5),
            cors_origin: "http://localhost:3000".into(),
        };
        let settings = config.pipeline_settings();
        assert_eq!(settings.retry.max_retries, 4);
        assert_eq!(settings.retry.total_attempts(), 5);
        assert_eq!(settings.session_ttl, Duration::from_secs(20));
        assert_eq!(settings.model_label, "GPT-4o mini");
    }
}
