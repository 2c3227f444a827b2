use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;

const DEFAULT_PROVIDERS_FILE: &str = "resources/providers.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub providers_file: PathBuf,
    pub provider_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            providers_file: env::var("PROVIDERS_FILE")
                .unwrap_or_else(|_| DEFAULT_PROVIDERS_FILE.to_string())
                .into(),
            provider_timeout_seconds: env::var("PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// The provider configuration document, as read from disk.
///
/// Entries stay as raw JSON until the registry is built so that a single
/// malformed entry can be dropped without rejecting the whole file.
#[derive(Debug, Clone)]
pub struct ProvidersFile {
    pub default: String,
    pub providers: Vec<Value>,
}

impl ProvidersFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ProvidersFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_json(&raw).map_err(|e| match e {
            ConfigError::ProvidersFile { reason, .. } => ConfigError::ProvidersFile {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let document: Value =
            serde_json::from_str(raw).map_err(|e| ConfigError::ProvidersFile {
                path: "<inline>".to_string(),
                reason: e.to_string(),
            })?;

        let default = document
            .get("default")
            .and_then(Value::as_str)
            .ok_or(ConfigError::MissingDefaultProvider)?
            .to_string();

        let providers = document
            .get("providers")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(Self { default, providers })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server port")]
    InvalidPort,
    #[error("Could not read providers file {path}: {reason}")]
    ProvidersFile { path: String, reason: String },
    #[error("Providers file must name a \"default\" provider")]
    MissingDefaultProvider,
    #[error("Could not build HTTP client: {0}")]
    HttpClient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_providers_file_from_json() {
        let file = ProvidersFile::from_json(
            r#"{
                "default": "mailgun",
                "providers": [
                    {"name": "mailgun", "type": "mailgun", "url": "http://a", "api_key": "k"},
                    {"name": "missing_url", "type": "mailgun", "api_key": "k"}
                ]
            }"#,
        )
        .expect("Should parse providers file");

        assert_eq!(file.default, "mailgun");
        assert_eq!(file.providers.len(), 2);
    }

    #[test]
    fn test_providers_file_requires_default() {
        let err = ProvidersFile::from_json(r#"{"providers": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDefaultProvider));
    }

    #[test]
    fn test_providers_file_without_list_is_empty() {
        let file = ProvidersFile::from_json(r#"{"default": "x", "providers": 3}"#).unwrap();
        assert!(file.providers.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ProvidersFile::load("/nonexistent/providers.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/providers.json"));
    }
}
