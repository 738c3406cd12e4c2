//! Fetch error definitions.

use thiserror::Error;

use crate::codec::CodecError;
use crate::document::DocumentError;

/// Errors that can occur while fetching or resolving a subscription.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The URL could not be turned into a request.
    #[error("invalid subscription URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Transport failure: DNS, connect, TLS, body read.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with a non-success status.
    #[error("{url} responded with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The body looked encoded but did not decode.
    #[error(transparent)]
    Decode(#[from] CodecError),

    /// The body is not a valid document.
    #[error(transparent)]
    Parse(#[from] DocumentError),

    /// Neither the URL extension nor the body content identified a format.
    #[error("unsupported subscription format at {url}")]
    UnsupportedFormat { url: String },
}

/// Coarse classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    InvalidUrl,
    Network,
    Decode,
    Parse,
    UnsupportedFormat,
}

impl FetchErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchErrorKind::InvalidUrl => "invalid_url",
            FetchErrorKind::Network => "network",
            FetchErrorKind::Decode => "decode",
            FetchErrorKind::Parse => "parse",
            FetchErrorKind::UnsupportedFormat => "unsupported_format",
        }
    }
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::InvalidUrl { .. } => FetchErrorKind::InvalidUrl,
            FetchError::Client(_) | FetchError::Network { .. } | FetchError::Status { .. } => {
                FetchErrorKind::Network
            }
            FetchError::Decode(_) => FetchErrorKind::Decode,
            FetchError::Parse(_) => FetchErrorKind::Parse,
            FetchError::UnsupportedFormat { .. } => FetchErrorKind::UnsupportedFormat,
        }
    }
}
