use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the marketplace client.
///
/// The listing filter never produces one of these; everything that talks to
/// the backend, the payment function or validates user input does.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("failed to decode {entity}: {source}")]
    Decode {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("user is not logged in")]
    NotAuthenticated,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("payment failed: {0}")]
    Payment(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ClientError::Validation(msg.into())
    }

    pub fn decode(entity: &'static str, source: serde_json::Error) -> Self {
        ClientError::Decode { entity, source }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
