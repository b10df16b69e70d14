//! The unit of work flowing through the client's queues.
//!
//! # Design
//! A `Request` is plain data with owned fields. On the outgoing side it
//! describes a pending HTTP call (method + URL, optional payload); on the
//! incoming side it wraps a message body received from the broker, with
//! method and URL absent. Keeping one type for both directions means the
//! queues never care which side of the exchange they are buffering.

/// HTTP method for an outgoing exchange.
///
/// The broker's wire contract only uses these three; there is no POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Delete,
}

impl HttpMethod {
    /// Wire name of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// One queued unit of work.
///
/// All fields are optional at the type level: outgoing requests always carry
/// `method` and `url`, while messages delivered by the broker carry only
/// `body`. Once pushed onto a queue the Request is owned by that queue;
/// popping transfers ownership back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub method: Option<HttpMethod>,
    pub url: Option<String>,
    pub body: Option<String>,
}

impl Request {
    /// Build an outgoing request with no payload.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Request {
            method: Some(method),
            url: Some(url.into()),
            body: None,
        }
    }

    /// Attach a payload to an outgoing request.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Wrap a received message body for the incoming queue.
    pub fn message(body: impl Into<String>) -> Self {
        Request {
            body: Some(body.into()),
            ..Default::default()
        }
    }
}
