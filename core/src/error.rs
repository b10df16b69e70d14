//! Error types for the SMQ client.
//!
//! # Design
//! Transport failures are benign at this layer: the workers treat every
//! variant identically ("try again"), so `TransportError` exists mainly for
//! logging and for callers driving a `Transport` directly. `ClientError`
//! covers the one fallible step of client construction: spawning the
//! worker threads.

use std::fmt;
use std::io;

/// Errors returned by [`Transport::perform`](crate::transport::Transport).
#[derive(Debug)]
pub enum TransportError {
    /// The request had no method; only fully formed requests are dispatched.
    MissingMethod,

    /// The request had no URL.
    MissingUrl,

    /// The server answered with a non-2xx status. The broker signals
    /// "no message available" this way, so the puller sees it constantly.
    Status(u16),

    /// The exchange failed before a usable response arrived: connect error,
    /// send error, or the total-time budget ran out.
    Failed(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::MissingMethod => write!(f, "request has no method"),
            TransportError::MissingUrl => write!(f, "request has no url"),
            TransportError::Status(status) => write!(f, "HTTP {status}"),
            TransportError::Failed(msg) => write!(f, "exchange failed: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Errors returned by [`SmqClient::create`](crate::client::SmqClient::create).
#[derive(Debug)]
pub enum ClientError {
    /// A background worker thread could not be spawned. Any partially
    /// started state has already been released when this is returned.
    WorkerSpawn(io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::WorkerSpawn(err) => {
                write!(f, "failed to spawn worker thread: {err}")
            }
        }
    }
}

impl std::error::Error for ClientError {}
