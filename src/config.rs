//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::i18n::Locale;
use crate::session::ChatEncoding;

/// Runtime configuration for the assistant.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the remote eligibility/chat service.
    pub api_url: String,
    /// Directory backing durable local storage.
    pub data_dir: PathBuf,
    /// Locale active at startup.
    pub locale: Locale,
    /// Timeout for a single remote exchange.
    pub request_timeout: Duration,
    /// How chat requests carry their parameters.
    pub chat_encoding: ChatEncoding,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000".to_string(),
            data_dir: PathBuf::from("./data"),
            locale: Locale::Nl,
            request_timeout: Duration::from_secs(30),
            chat_encoding: ChatEncoding::Query,
        }
    }
}

impl AppConfig {
    /// Build a config from `HULPWIJZER_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("HULPWIJZER_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(dir) = lookup("HULPWIJZER_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(locale) = lookup("HULPWIJZER_LOCALE") {
            config.locale = locale.parse().map_err(|_| ConfigError::InvalidValue {
                key: "HULPWIJZER_LOCALE".into(),
                message: format!("unsupported locale '{locale}' (expected en or nl)"),
            })?;
        }
        if let Some(secs) = lookup("HULPWIJZER_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| ConfigError::InvalidValue {
                key: "HULPWIJZER_REQUEST_TIMEOUT_SECS".into(),
                message: format!("'{secs}' is not a whole number of seconds"),
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(encoding) = lookup("HULPWIJZER_CHAT_ENCODING") {
            config.chat_encoding = encoding.parse().map_err(|_| ConfigError::InvalidValue {
                key: "HULPWIJZER_CHAT_ENCODING".into(),
                message: format!("'{encoding}' is not one of query, json"),
            })?;
        }

        Ok(config)
    }
}
