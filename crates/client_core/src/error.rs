use reqwest::StatusCode;
use shared::error::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),
    #[error("invalid api base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("server responded with status {status}")]
    Status { status: StatusCode },
    #[error("malformed response body: {0}")]
    Malformed(String),
    #[error("server rejected the request: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },
}

impl ApiClientError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }
}

impl From<reqwest::Error> for ApiClientError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Malformed(value.to_string())
        } else if let Some(status) = value.status() {
            Self::Status { status }
        } else {
            Self::Transport(value)
        }
    }
}
