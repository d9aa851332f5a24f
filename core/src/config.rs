use serde::Deserialize;

use crate::error::RpcError;

/// Connection settings for an `RpcClient`.
///
/// `host` is prepended verbatim to every endpoint path, so it normally carries
/// the scheme and no trailing slash (`http://localhost:3000`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub host: String,
    #[serde(default)]
    pub debug: bool,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            debug: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Parse a config document such as `{"host": "http://localhost:3000"}`.
    pub fn from_json(raw: &str) -> Result<Self, RpcError> {
        serde_json::from_str(raw).map_err(|e| RpcError::Configuration(e.to_string()))
    }
}
