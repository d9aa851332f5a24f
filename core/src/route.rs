//! Endpoint declarations.
//!
//! # Design
//! Two forms describe which (endpoint, method) pairs exist:
//! - `Route` binds a pair to its parameter and return types at compile time,
//!   so a typed call site cannot name an undeclared pair.
//! - `EndpointMap` is the runtime registry consulted by
//!   `RpcClient::invoke_dynamic`, for callers that only know the pair as
//!   strings.
//!
//! Neither form changes how a request is built. A parameter that serializes
//! to `null` (`()` or `None`) counts as absent.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::RpcError;
use crate::http::HttpMethod;

/// A declared (endpoint, method) pair and its parameter and return types.
///
/// ```
/// use typed_rpc::{HttpMethod, Route};
///
/// struct GetNote;
///
/// impl Route for GetNote {
///     const ENDPOINT: &'static str = "/notes/*";
///     const METHOD: HttpMethod = HttpMethod::Get;
///     type Param = ();
///     type Return = serde_json::Value;
/// }
///
/// assert_eq!(GetNote::ENDPOINT, "/notes/*");
/// ```
pub trait Route {
    /// Path appended to the host. May contain one `*` wildcard marker.
    const ENDPOINT: &'static str;
    const METHOD: HttpMethod;
    type Param: Serialize;
    type Return: DeserializeOwned;
}

/// Runtime registry of endpoint paths and the method names each accepts.
///
/// `from_json` reads `{"/notes": ["get", "post"], "/notes/*": ["get"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointMap {
    routes: BTreeMap<String, BTreeSet<HttpMethod>>,
}

impl EndpointMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, endpoint: impl Into<String>, method: HttpMethod) -> Self {
        self.insert(endpoint, method);
        self
    }

    pub fn insert(&mut self, endpoint: impl Into<String>, method: HttpMethod) {
        self.routes
            .entry(endpoint.into())
            .or_default()
            .insert(method);
    }

    pub fn contains(&self, endpoint: &str, method: HttpMethod) -> bool {
        self.routes
            .get(endpoint)
            .is_some_and(|methods| methods.contains(&method))
    }

    /// Methods declared for `endpoint`, or an empty list for unknown paths.
    pub fn methods(&self, endpoint: &str) -> Vec<HttpMethod> {
        self.routes
            .get(endpoint)
            .map(|methods| methods.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Resolve a method name for `endpoint`, rejecting pairs not in the map.
    pub fn resolve(&self, endpoint: &str, method: &str) -> Result<HttpMethod, RpcError> {
        let unknown = || RpcError::UnknownRoute {
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        };
        let verb = HttpMethod::parse(method).map_err(|_| unknown())?;
        if self.contains(endpoint, verb) {
            Ok(verb)
        } else {
            Err(unknown())
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, RpcError> {
        let raw: BTreeMap<String, Vec<String>> =
            serde_json::from_str(raw).map_err(|e| RpcError::Configuration(e.to_string()))?;
        let mut map = EndpointMap::new();
        for (endpoint, methods) in raw {
            for method in methods {
                map.insert(endpoint.clone(), HttpMethod::parse(&method)?);
            }
        }
        Ok(map)
    }
}
