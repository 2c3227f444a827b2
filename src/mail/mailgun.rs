use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{read_outcome, EmailProvider};
use crate::error::Result;
use crate::models::{DeliveryOutcome, MessagePayload, ProviderConfig};

/// Basic-auth user name Mailgun expects alongside the API key
const MAILGUN_USER: &str = "api";

/// Mailgun-style backend: form-encoded POST, key as basic-auth password
#[derive(Clone)]
pub struct MailgunProvider {
    name: String,
    url: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct MailgunForm<'a> {
    from: String,
    to: String,
    subject: &'a str,
    text: String,
}

impl MailgunProvider {
    pub fn new(config: &ProviderConfig, client: Client) -> Self {
        Self {
            name: config.name.clone(),
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            client,
        }
    }
}

#[async_trait]
impl EmailProvider for MailgunProvider {
    async fn send(&self, payload: &MessagePayload) -> Result<DeliveryOutcome> {
        let text = payload.derive_text()?;

        let form = MailgunForm {
            from: payload.from_mailbox(),
            to: payload.to_mailbox(),
            subject: &payload.subject,
            text,
        };

        tracing::debug!(
            provider = %self.name,
            to = %payload.to,
            subject = %payload.subject,
            "Sending message via mailgun"
        );

        let response = self
            .client
            .post(&self.url)
            .basic_auth(MAILGUN_USER, Some(&self.api_key))
            .form(&form)
            .send()
            .await?;

        read_outcome(response).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
