//! Error types for the RPC client.
//!
//! # Design
//! Every variant displays the same opaque message, so a caller printing the
//! error learns only that the call failed. The real cause goes to the
//! client's logger at error level; callers that need to branch can still
//! match on the variant or read `detail()`.

use thiserror::Error;

/// Text shown for every failed call.
pub const GENERIC_MESSAGE: &str = "internal protocol error; enable debug to view details";

/// Failure reported by a `Transport` (connection refused, unreadable body, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors returned by `RpcClient::invoke` and friends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The call could not be built, e.g. a wildcard path without a value.
    #[error("{}", GENERIC_MESSAGE)]
    Configuration(String),

    /// The (endpoint, method) pair is not declared in the endpoint map.
    #[error("{}", GENERIC_MESSAGE)]
    UnknownRoute { endpoint: String, method: String },

    /// Non-200 response carrying an `{error}` envelope.
    #[error("{}", GENERIC_MESSAGE)]
    Server { status: u16, message: String },

    /// The response body did not match the expected envelope.
    #[error("{}", GENERIC_MESSAGE)]
    Parse(String),

    /// The parameter could not be encoded as JSON.
    #[error("{}", GENERIC_MESSAGE)]
    Serialization(String),

    #[error("{}", GENERIC_MESSAGE)]
    Transport(#[from] TransportError),
}

impl RpcError {
    /// Full description of the failure, as written to the error log.
    pub fn detail(&self) -> String {
        match self {
            RpcError::Configuration(msg) => format!("configuration error: {msg}"),
            RpcError::UnknownRoute { endpoint, method } => {
                format!("unknown route: {method} {endpoint}")
            }
            RpcError::Server { status, message } => {
                format!("server error {status}: {message}")
            }
            RpcError::Parse(msg) => format!("parse error: {msg}"),
            RpcError::Serialization(msg) => format!("serialization error: {msg}"),
            RpcError::Transport(err) => err.to_string(),
        }
    }

    /// HTTP status for `Server` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            RpcError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_displays_the_generic_message() {
        let errors = [
            RpcError::Configuration("x".to_string()),
            RpcError::UnknownRoute {
                endpoint: "/a".to_string(),
                method: "GET".to_string(),
            },
            RpcError::Server {
                status: 404,
                message: "not found".to_string(),
            },
            RpcError::Parse("x".to_string()),
            RpcError::Serialization("x".to_string()),
            RpcError::Transport(TransportError::new("refused")),
        ];
        for err in errors {
            assert_eq!(err.to_string(), GENERIC_MESSAGE);
        }
    }

    #[test]
    fn detail_keeps_server_status_and_message() {
        let err = RpcError::Server {
            status: 404,
            message: "not found".to_string(),
        };
        assert_eq!(err.detail(), "server error 404: not found");
        assert_eq!(err.status(), Some(404));
        assert_eq!(RpcError::Parse("x".to_string()).status(), None);
    }
}
