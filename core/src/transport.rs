//! Sending requests over the wire.
//!
//! # Design
//! `Transport` is the only seam between the client and the network. The
//! client never retries, times out or pools connections itself; whatever the
//! transport does in that regard is what the caller gets.

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport: Send + Sync {
    /// Execute `request` and return the response as data. Non-2xx statuses
    /// are responses, not errors.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport built on a ureq agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = req.url.as_str();
        let body = req.body.as_deref();

        // GET and DELETE builders carry no body unless forced.
        let with_body = match req.method {
            HttpMethod::Get => with_headers(self.agent.get(url), req).force_send_body(),
            HttpMethod::Delete => with_headers(self.agent.delete(url), req).force_send_body(),
            HttpMethod::Post => with_headers(self.agent.post(url), req),
            HttpMethod::Put => with_headers(self.agent.put(url), req),
            HttpMethod::Patch => with_headers(self.agent.patch(url), req),
        };

        let result = match body {
            Some(body) => with_body.send(body.as_bytes()),
            None => with_body.send_empty(),
        };
        let mut response = result.map_err(|e| TransportError::new(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::new(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, req: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (name, value) in &req.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
