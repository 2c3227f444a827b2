use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{read_outcome, EmailProvider};
use crate::error::Result;
use crate::models::{DeliveryOutcome, MessagePayload, ProviderConfig};

/// Mandrill-style backend: JSON POST, key travels in the body
#[derive(Clone)]
pub struct MandrillProvider {
    name: String,
    url: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct MandrillRequest<'a> {
    key: &'a str,
    message: MandrillMessage<'a>,
}

#[derive(Debug, Serialize)]
struct MandrillMessage<'a> {
    text: String,
    subject: &'a str,
    from_email: &'a str,
    from_name: &'a str,
    to: Vec<Recipient<'a>>,
}

#[derive(Debug, Serialize)]
struct Recipient<'a> {
    email: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

impl MandrillProvider {
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
impl EmailProvider for MandrillProvider {
    async fn send(&self, payload: &MessagePayload) -> Result<DeliveryOutcome> {
        let text = payload.derive_text()?;

        let request = MandrillRequest {
            key: &self.api_key,
            message: MandrillMessage {
                text,
                subject: &payload.subject,
                from_email: &payload.from,
                from_name: &payload.from_name,
                to: vec![Recipient {
                    email: &payload.to,
                    name: &payload.to_name,
                    kind: "to",
                }],
            },
        };

        tracing::debug!(
            provider = %self.name,
            to = %payload.to,
            subject = %payload.subject,
            "Sending message via mandrill"
        );

        let response = self.client.post(&self.url).json(&request).send().await?;

        read_outcome(response).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
