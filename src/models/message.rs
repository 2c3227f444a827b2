use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::markup;

/// Payload fields in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 6] = ["to", "to_name", "from", "from_name", "subject", "body"];

/// A send request as submitted by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub to: String,
    pub to_name: String,
    pub from: String,
    pub from_name: String,
    pub subject: String,
    /// Markup; the plain-text rendering is derived from it per attempt
    pub body: String,
}

impl MessagePayload {
    /// Build a payload from an inbound JSON document.
    ///
    /// Fields are checked in [`REQUIRED_FIELDS`] order and the first one that is
    /// absent or not a string is reported. A caller-supplied `text` is ignored.
    /// Presence is all that is checked; empty strings and any other content pass.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            AppError::Validation("Incoming payload must be a JSON object.".to_string())
        })?;

        for name in REQUIRED_FIELDS {
            match object.get(name) {
                None | Some(Value::Null) => {
                    return Err(AppError::Validation(format!(
                        "Incoming payload is missing the required field, {}.",
                        name
                    )))
                }
                Some(Value::String(_)) => {}
                Some(_) => {
                    return Err(AppError::Validation(format!(
                        "Incoming payload field {} must be a string.",
                        name
                    )))
                }
            }
        }

        Self::deserialize(value).map_err(|e| AppError::Validation(e.to_string()))
    }

    /// Plain-text rendering of `body`
    pub fn derive_text(&self) -> Result<String> {
        markup::extract_text(&self.body)
    }

    /// `Name<address>` form of the sender
    pub fn from_mailbox(&self) -> String {
        format!("{}<{}>", self.from_name, self.from)
    }

    /// `Name<address>` form of the recipient
    pub fn to_mailbox(&self) -> String {
        format!("{}<{}>", self.to_name, self.to)
    }
}

/// Result of one delivery attempt: the provider's status and raw response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryOutcome {
    pub status_code: u16,
    pub body: String,
}

impl DeliveryOutcome {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    /// Only a plain 200 counts as delivered.
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Envelope returned to HTTP callers
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "to": "fake@example.com",
            "to_name": "Ms. Fake",
            "from": "noreply@example.com",
            "from_name": "Example",
            "subject": "A message from Example.",
            "body": "<h1>Your billing amount:</h1><p>$10</p>"
        })
    }

    #[test]
    fn test_from_value_accepts_complete_payload() {
        let payload = MessagePayload::from_value(&sample()).expect("Should validate");
        assert_eq!(payload.to, "fake@example.com");
        assert_eq!(payload.from_mailbox(), "Example<noreply@example.com>");
        assert_eq!(payload.to_mailbox(), "Ms. Fake<fake@example.com>");
    }

    #[test]
    fn test_each_missing_field_is_named() {
        for field in REQUIRED_FIELDS {
            let mut value = sample();
            value.as_object_mut().unwrap().remove(field);

            let err = MessagePayload::from_value(&value).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
            assert_eq!(
                err.to_string(),
                format!("Incoming payload is missing the required field, {}.", field)
            );
        }
    }

    #[test]
    fn test_first_missing_field_wins() {
        let err = MessagePayload::from_value(&json!({"to": "a@b.c"})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Incoming payload is missing the required field, to_name."
        );
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = MessagePayload::from_value(&json!(["to", "from"])).unwrap_err();
        assert_eq!(err.to_string(), "Incoming payload must be a JSON object.");
    }

    #[test]
    fn test_non_string_field_is_rejected() {
        let mut value = sample();
        value["subject"] = json!(42);
        let err = MessagePayload::from_value(&value).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Incoming payload field subject must be a string."
        );
    }

    #[test]
    fn test_caller_text_is_ignored() {
        let mut value = sample();
        value["text"] = json!("spoofed");
        let payload = MessagePayload::from_value(&value).unwrap();
        assert_eq!(payload.derive_text().unwrap(), "Your billing amount:$10");
    }

    #[test]
    fn test_field_content_is_not_restricted() {
        let mut value = sample();
        value["to_name"] = json!("Ms.\nFake");
        value["subject"] = json!("");

        let payload = MessagePayload::from_value(&value).expect("Presence is enough");
        assert_eq!(payload.to_name, "Ms.\nFake");
        assert_eq!(payload.subject, "");
    }

    #[test]
    fn test_payload_struct_matches_required_fields() {
        let value = serde_json::to_value(MessagePayload::from_value(&sample()).unwrap()).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        let mut expected = REQUIRED_FIELDS.to_vec();
        keys.sort_unstable();
        expected.sort_unstable();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_outcome_success_is_exactly_200() {
        assert!(DeliveryOutcome::new(200, "ok").is_success());
        assert!(!DeliveryOutcome::new(202, "queued").is_success());
        assert!(!DeliveryOutcome::new(401, "Forbidden").is_success());
    }
}
