//! Typed client for HTTP endpoints that answer with JSON envelopes.
//!
//! # Overview
//! Endpoints are declared up front, either as `Route` types binding an
//! (endpoint, method) pair to its parameter and return types, or as an
//! `EndpointMap` consulted at runtime. `RpcClient::invoke` builds the request,
//! attaches the bearer token if one is set, sends it through a `Transport` and
//! unwraps the `{"value": ...}` / `{"error": ...}` envelope.
//!
//! # Design
//! - `build_request` and `parse_response` are pure, so request shaping and
//!   envelope handling are testable without a network.
//! - Failures all display one generic message; the cause is logged at error
//!   level through the client's own `RpcLogger` and kept in the variant.
//! - No retries, timeouts, caching or connection management live here.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod log;
pub mod route;
pub mod transport;

pub use client::RpcClient;
pub use config::ClientConfig;
pub use error::{RpcError, TransportError, GENERIC_MESSAGE};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use log::{MemoryLogger, RpcLogger, TracingLogger};
pub use route::{EndpointMap, Route};
pub use transport::{Transport, UreqTransport};
