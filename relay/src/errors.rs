use crate::config::ValidationError;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

/// Errors that can occur while relaying a profile lookup
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Bot token is not a valid header value")]
    InvalidToken,

    #[error("Upstream request failed for {0}: {1}")]
    UpstreamRequestFailed(String, String),

    #[error("Upstream timeout for {0}")]
    UpstreamTimeout(String),

    #[error("Failed to read response body: {0}")]
    ResponseBodyError(String),

    #[error("Failed to decode upstream payload: {0}")]
    DecodeError(String),

    #[error("Upstream payload is not a valid user: {0}")]
    InvalidPayload(String),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RelayError::InvalidPayload(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used to tag error metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::InvalidToken => "invalid_token",
            RelayError::UpstreamRequestFailed(..) => "transport",
            RelayError::UpstreamTimeout(_) => "timeout",
            RelayError::ResponseBodyError(_) => "body",
            RelayError::DecodeError(_) => "decode",
            RelayError::InvalidPayload(_) => "invalid_payload",
            RelayError::HttpClientError(_) => "client",
            RelayError::Config(_) => "config",
            RelayError::Io(_) => "io",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = status.canonical_reason().unwrap_or("an error occurred");

        (status, message).into_response()
    }
}
