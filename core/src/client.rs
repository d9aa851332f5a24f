//! Typed RPC client over envelope-speaking HTTP endpoints.
//!
//! # Design
//! A call is split like a request/response pair: `build_request` turns the
//! endpoint, method, parameter and token into an `HttpRequest`, the
//! `Transport` executes it, and `parse_response` unwraps the `{value}` or
//! `{error}` envelope. `invoke` and `invoke_dynamic` run the three steps and
//! route every failure through one place that logs the detail.
//!
//! The only state shared between calls is the bearer token. Each call reads it
//! once before building its request, so a concurrent `set_token` affects the
//! next call, never one already underway.

use parking_lot::RwLock;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::RpcError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::log::{RpcLogger, TracingLogger};
use crate::route::{EndpointMap, Route};
use crate::transport::{Transport, UreqTransport};

/// Marker in an endpoint path replaced by the call's wildcard argument.
pub const WILDCARD: char = '*';

/// The only status treated as success.
pub const STATUS_OK: u16 = 200;

/// Take `key` out of a JSON object body. Anything that is not an object with
/// that key, including arrays, is rejected.
fn envelope_field(body: &str, key: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(body).ok()? {
        Value::Object(mut fields) => fields.remove(key),
        _ => None,
    }
}

pub struct RpcClient<T = UreqTransport> {
    config: ClientConfig,
    token: RwLock<Option<String>>,
    transport: T,
    logger: Box<dyn RpcLogger>,
}

impl RpcClient<UreqTransport> {
    /// Client over a ureq transport, logging through `tracing`. Trace lines
    /// are emitted only when `config.debug` is set.
    pub fn new(config: ClientConfig) -> Self {
        let logger = TracingLogger::new(config.debug);
        Self::with_transport(config, UreqTransport::new(), logger)
    }
}

impl<T: Transport> RpcClient<T> {
    pub fn with_transport(
        config: ClientConfig,
        transport: T,
        logger: impl RpcLogger + 'static,
    ) -> Self {
        let logger: Box<dyn RpcLogger> = Box::new(logger);
        logger.trace("initializing client");
        Self {
            config,
            token: RwLock::new(None),
            transport,
            logger,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Replace the bearer token, or clear it with `None`. The value is not
    /// validated.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// Call a declared route, decoding the envelope value into its return
    /// type. The value is only checked for being decodable as that type.
    pub fn invoke<R: Route>(
        &self,
        param: &R::Param,
        wildcard: Option<&str>,
    ) -> Result<R::Return, RpcError> {
        let result = serde_json::to_value(param)
            .map_err(|e| RpcError::Serialization(e.to_string()))
            .and_then(|param| self.call(R::ENDPOINT, R::METHOD, &param, wildcard))
            .and_then(|value| {
                serde_json::from_value(value).map_err(|e| {
                    RpcError::Parse(format!("response value does not match return type: {e}"))
                })
            });
        self.report(result)
    }

    /// Call an endpoint named at runtime. The pair must be declared in `map`;
    /// the envelope value is returned undecoded.
    pub fn invoke_dynamic(
        &self,
        map: &EndpointMap,
        endpoint: &str,
        method: &str,
        param: Value,
        wildcard: Option<&str>,
    ) -> Result<Value, RpcError> {
        let result = map
            .resolve(endpoint, method)
            .and_then(|verb| self.call(endpoint, verb, &param, wildcard));
        self.report(result)
    }

    /// Build the outgoing request for one call.
    ///
    /// A GET with a parameter carries it in the query string; every other
    /// call carries `{"param": ...}` as a JSON body, with the key omitted when
    /// the parameter is absent (`null`).
    pub fn build_request(
        &self,
        endpoint: &str,
        method: HttpMethod,
        param: &Value,
        wildcard: Option<&str>,
        token: Option<&str>,
    ) -> Result<HttpRequest, RpcError> {
        self.logger.trace("initializing new request");
        let mut headers = Vec::new();

        // An empty token counts as no token.
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.logger.trace("found token, adding authorization header");
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }

        let mut url = format!("{}{}", self.config.host, endpoint);
        if url.contains(WILDCARD) {
            let wildcard = wildcard.ok_or_else(|| {
                RpcError::Configuration(
                    "wildcard url used without a wildcard parameter".to_string(),
                )
            })?;
            url = url.replacen(WILDCARD, wildcard, 1);
        }

        let mut body = None;
        if method == HttpMethod::Get && !param.is_null() {
            url.push_str("?param=");
            url.push_str(&query_value(param));
        } else {
            let mut envelope = serde_json::Map::new();
            if !param.is_null() {
                envelope.insert("param".to_string(), param.clone());
            }
            let encoded = serde_json::to_string(&envelope)
                .map_err(|e| RpcError::Serialization(e.to_string()))?;
            headers.push(("content-type".to_string(), "application/json".to_string()));
            body = Some(encoded);
            self.logger.trace("set body");
        }

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Unwrap a response envelope: `{"value": ...}` on 200, `{"error": ...}`
    /// on anything else.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, RpcError> {
        self.logger.trace(&format!(
            "received response with status code '{}'",
            response.status
        ));

        if response.status != STATUS_OK {
            return match envelope_field(&response.body, "error") {
                Some(Value::String(message)) => Err(RpcError::Server {
                    status: response.status,
                    message,
                }),
                _ => Err(RpcError::Parse(format!(
                    "response status was {} and the error could not be parsed",
                    response.status
                ))),
            };
        }

        self.logger.trace("parsing response");
        let value = envelope_field(&response.body, "value")
            .ok_or_else(|| RpcError::Parse("could not parse response".to_string()))?;
        self.logger.trace("parsed response");
        Ok(value)
    }

    fn call(
        &self,
        endpoint: &str,
        method: HttpMethod,
        param: &Value,
        wildcard: Option<&str>,
    ) -> Result<Value, RpcError> {
        let token = self.token();
        let request = self.build_request(endpoint, method, param, wildcard, token.as_deref())?;
        self.logger.trace("sending request");
        let response = self.transport.send(&request)?;
        self.parse_response(response)
    }

    fn report<V>(&self, result: Result<V, RpcError>) -> Result<V, RpcError> {
        if let Err(err) = &result {
            self.logger.error(&err.detail());
        }
        result
    }
}

/// Query-string form of a parameter: strings are used as-is, anything else as
/// its JSON text. The result is form-urlencoded.
fn query_value(param: &Value) -> String {
    let raw = match param {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}
