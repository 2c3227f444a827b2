use std::collections::HashSet;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use super::{EmailProvider, MailgunProvider, MandrillProvider};
use crate::config::{ConfigError, ProvidersFile};
use crate::error::{AppError, Result};
use crate::models::{ProviderConfig, ProviderKind};

/// Configured providers in file order, plus the name tried first.
///
/// Built once at startup and never mutated; share it behind an `Arc`.
pub struct ProviderRegistry {
    default: String,
    providers: Vec<ProviderConfig>,
    client: Client,
}

impl ProviderRegistry {
    /// Build from a loaded providers file with a shared HTTP client.
    pub fn new(file: ProvidersFile, timeout: Duration) -> std::result::Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self::from_entries(file.default, &file.providers, client))
    }

    /// Keep every usable entry; unusable ones are logged and skipped.
    pub fn from_entries(default: String, entries: &[Value], client: Client) -> Self {
        let mut seen = HashSet::new();
        let mut providers = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            let config = match ProviderConfig::from_value(entry) {
                Ok(config) => config,
                Err(reason) => {
                    let name = entry.get("name").and_then(Value::as_str).unwrap_or("?");
                    tracing::warn!(index, name, reason = %reason, "Dropping provider entry");
                    continue;
                }
            };

            if !seen.insert(config.name.clone()) {
                tracing::warn!(index, name = %config.name, "Dropping duplicate provider entry");
                continue;
            }

            providers.push(config);
        }

        tracing::info!(
            default = %default,
            providers = providers.len(),
            dropped = entries.len() - providers.len(),
            "Provider registry built"
        );

        Self {
            default,
            providers,
            client,
        }
    }

    pub fn default_name(&self) -> &str {
        &self.default
    }

    pub fn providers(&self) -> &[ProviderConfig] {
        &self.providers
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Construct the adapter for `name`.
    pub fn resolve(&self, name: &str) -> Result<Box<dyn EmailProvider>> {
        let config = self
            .get(name)
            .ok_or_else(|| AppError::UnknownProvider(format!("Could not instantiate {}.", name)))?;

        match &config.kind {
            ProviderKind::Mailgun => Ok(Box::new(MailgunProvider::new(config, self.client.clone()))),
            ProviderKind::Mandrill => {
                Ok(Box::new(MandrillProvider::new(config, self.client.clone())))
            }
            ProviderKind::Unsupported(kind) => Err(AppError::UnknownProvider(format!(
                "Provider {} has unsupported type {}.",
                name, kind
            ))),
        }
    }
}
