use std::fmt;

use serde_json::Value;

/// Wire format a provider speaks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    /// Form-encoded POST with HTTP basic auth
    Mailgun,
    /// JSON POST with the key in the body
    Mandrill,
    /// Kept so the entry loads; resolving it fails
    Unsupported(String),
}

impl ProviderKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "mailgun" => ProviderKind::Mailgun,
            "mandrill" => ProviderKind::Mandrill,
            other => ProviderKind::Unsupported(other.to_string()),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Mailgun => f.write_str("mailgun"),
            ProviderKind::Mandrill => f.write_str("mandrill"),
            ProviderKind::Unsupported(raw) => f.write_str(raw),
        }
    }
}

/// One configured delivery backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub name: String,
    pub kind: ProviderKind,
    pub url: String,
    pub api_key: String,
}

impl ProviderConfig {
    /// Read an entry from the providers file.
    ///
    /// On failure returns the reason the entry is unusable.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let object = value
            .as_object()
            .ok_or_else(|| "entry is not an object".to_string())?;

        let field = |key: &str| match object.get(key).and_then(Value::as_str) {
            Some(s) if !s.is_empty() => Ok(s.to_string()),
            _ => Err(format!("missing or empty \"{}\"", key)),
        };

        Ok(Self {
            name: field("name")?,
            kind: ProviderKind::parse(&field("type")?),
            url: field("url")?,
            api_key: field("api_key")?,
        })
    }
}
