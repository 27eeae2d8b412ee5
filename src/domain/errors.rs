//! Domain errors for the shopbridge system.

use thiserror::Error;

/// Errors surfaced by backend fetches and tool operations.
///
/// Transport and backend failures abort the whole fetch they occur in and
/// carry the resource name so tool callers can tell what went wrong.
/// Cache I/O failures never reach this type; they are logged and absorbed
/// where they happen.
#[derive(Debug, Error)]
pub enum ShopError {
    #[error("{resource} request failed: {source}")]
    Transport {
        resource: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{resource} returned {status}: {body}")]
    Backend {
        resource: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to decode {resource} response: {reason}")]
    Decode {
        resource: &'static str,
        reason: String,
    },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ShopError {
    /// Transport error for the named resource.
    pub fn transport(resource: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { resource, source }
    }

    /// Non-success HTTP status for the named resource.
    pub fn backend(resource: &'static str, status: u16, body: String) -> Self {
        Self::Backend { resource, status, body }
    }

    /// Malformed response body for the named resource.
    pub fn decode(resource: &'static str, reason: impl Into<String>) -> Self {
        Self::Decode {
            resource,
            reason: reason.into(),
        }
    }
}

pub type ShopResult<T> = Result<T, ShopError>;

impl From<serde_json::Error> for ShopError {
    fn from(err: serde_json::Error) -> Self {
        ShopError::Serialization(err.to_string())
    }
}
