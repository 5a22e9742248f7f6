//! Error types shared by the HTTP providers.

use reqwest::StatusCode;
use thiserror::Error;

use crate::providers::ProviderError;

/// Convenient result alias returning [`HttpProviderError`] failures.
pub type HttpResult<T> = Result<T, HttpProviderError>;

/// Failures that can occur while talking to the puzzle or genre endpoints.
#[derive(Debug, Error)]
pub enum HttpProviderError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build provider HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A configured endpoint is not a usable base URL.
    #[error("invalid provider URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    /// The request could not be sent.
    #[error("failed to send request to `{url}`")]
    RequestSend {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint answered with an unexpected status code.
    #[error("unexpected response status {status} for `{url}`")]
    RequestStatus { url: String, status: StatusCode },
    /// Response payload could not be decoded.
    #[error("failed to decode response for `{url}`")]
    DecodeResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The payload decoded but does not describe a playable puzzle.
    #[error("invalid payload from `{url}`: {reason}")]
    InvalidPayload { url: String, reason: String },
}

impl From<HttpProviderError> for ProviderError {
    fn from(err: HttpProviderError) -> Self {
        match err {
            HttpProviderError::RequestStatus { url, status } if status == StatusCode::NOT_FOUND => {
                ProviderError::NotFound(url)
            }
            HttpProviderError::InvalidPayload { url, reason } => {
                ProviderError::InvalidShape(format!("{url}: {reason}"))
            }
            HttpProviderError::DecodeResponse { url, source } => {
                ProviderError::InvalidShape(format!("{url}: {source}"))
            }
            other => ProviderError::unavailable(other.to_string(), other),
        }
    }
}
