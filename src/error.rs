use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Inbound payload is not an object, or a required field is absent
    #[error("{0}")]
    Validation(String),

    #[error("Message body is not well-formed markup: {0}")]
    MarkupParse(String),

    /// Name not configured, or configured with a type we cannot build
    #[error("{0}")]
    UnknownProvider(String),

    /// Provider could not be reached or its response could not be read
    #[error("{0}")]
    Transport(String),

    #[error("JSON data is not valid.")]
    InvalidJson,

    /// The whole request overran its time budget
    #[error("Request timed out.")]
    Timeout,
}

impl AppError {
    /// Errors the failover pass may absorb by moving on to the next provider.
    /// Everything else is an input or configuration defect and aborts the request.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Transport(_))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Transport(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Validation(_)
            | AppError::MarkupParse(_)
            | AppError::UnknownProvider(_)
            | AppError::InvalidJson => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<quick_xml::Error> for AppError {
    fn from(err: quick_xml::Error) -> Self {
        AppError::MarkupParse(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Transport(format!("Provider request timed out: {}", err))
        } else {
            AppError::Transport(format!("Provider request failed: {}", err))
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_is_transient() {
        assert!(AppError::Transport("down".into()).is_transient());
        assert!(!AppError::Validation("x".into()).is_transient());
        assert!(!AppError::MarkupParse("x".into()).is_transient());
        assert!(!AppError::UnknownProvider("x".into()).is_transient());
        assert!(!AppError::InvalidJson.is_transient());
        assert!(!AppError::Timeout.is_transient());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::UnknownProvider("Could not instantiate fake.".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Transport("refused".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(AppError::InvalidJson.to_string(), "JSON data is not valid.");
    }
}
