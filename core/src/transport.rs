//! HTTP execution of a single [`Request`].
//!
//! # Design
//! `Transport` is the seam between the worker loops and the network. The
//! production implementation, [`HttpTransport`], performs one synchronous
//! exchange with `ureq` under a total-time budget covering connect, send,
//! and receive. Tests substitute scripted implementations to exercise the
//! workers deterministically.
//!
//! A non-2xx status is a failure here, on purpose: the broker reports "no
//! message available" with a client-error status, and folding that into the
//! same failure path keeps the puller loop uniform: any absence of payload
//! means "poll again."

use std::time::Duration;

use crate::error::TransportError;
use crate::request::{HttpMethod, Request};

/// Executes one request synchronously, returning the response body.
pub trait Transport: Send + Sync + 'static {
    /// Perform `request` with a total deadline of `timeout`.
    ///
    /// Requires `request.method` and `request.url` to be present.
    fn perform(&self, request: &Request, timeout: Duration) -> Result<String, TransportError>;
}

/// Production [`Transport`] backed by `ureq`.
///
/// Each call builds a fresh agent configured with the requested deadline, so
/// the timeout stays a per-call parameter. Connection reuse across exchanges
/// is not a goal of this client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport;

impl HttpTransport {
    pub fn new() -> Self {
        HttpTransport
    }
}

impl Transport for HttpTransport {
    fn perform(&self, request: &Request, timeout: Duration) -> Result<String, TransportError> {
        let method = request.method.ok_or(TransportError::MissingMethod)?;
        let url = request
            .url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(TransportError::MissingUrl)?;

        // 4xx/5xx come back as plain responses; status interpretation
        // happens below rather than inside ureq.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();

        let result = match (method, request.body.as_deref()) {
            (HttpMethod::Get, _) => agent.get(url).call(),
            (HttpMethod::Delete, _) => agent.delete(url).call(),
            // ureq announces the exact Content-Length for a byte slice and
            // sends a zero-length body for send_empty.
            (HttpMethod::Put, Some(body)) => agent.put(url).send(body.as_bytes()),
            (HttpMethod::Put, None) => agent.put(url).send_empty(),
        };

        let mut response = result.map_err(|err| TransportError::Failed(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .body_mut()
            .read_to_string()
            .map_err(|err| TransportError::Failed(err.to_string()))
    }
}
