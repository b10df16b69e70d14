//! Client library for a Simple Message Queue (SMQ) broker.
//!
//! # Overview
//! Decouples an application's publish/retrieve calls from the network I/O
//! needed to exchange messages with the broker over HTTP. Application
//! threads enqueue outbound work and dequeue inbound messages through
//! non-blocking (or blocking-with-timeout) calls; two background workers
//! move Requests between the local queues and the broker.
//!
//! # Design
//! - [`SmqClient`] owns two [`RequestQueue`]s and two worker threads. The
//!   pusher drains the outgoing queue into broker exchanges, retrying failed
//!   sends by requeueing at the tail; the puller long-polls the client's
//!   mailbox and feeds the incoming queue.
//! - [`Transport`] is the I/O seam: production uses the `ureq`-backed
//!   [`HttpTransport`], tests script their own.
//! - Delivery is best-effort, at-least-once when the broker acknowledges but
//!   the client cannot tell; retries may reorder failed sends behind newer
//!   work. Nothing persists across process restarts.
//!
//! ```no_run
//! use smq_core::SmqClient;
//!
//! let client = SmqClient::create("alice", "localhost", 8080)?;
//! client.subscribe("chat");
//! client.publish("chat", "hello");
//! if let Some(message) = client.retrieve() {
//!     println!("{message}");
//! }
//! client.shutdown();
//! # Ok::<(), smq_core::ClientError>(())
//! ```

pub mod client;
pub mod error;
pub mod queue;
pub mod request;
pub mod transport;
mod worker;

pub use client::{ClientOptions, SmqClient, DEFAULT_TIMEOUT};
pub use error::{ClientError, TransportError};
pub use queue::RequestQueue;
pub use request::{HttpMethod, Request};
pub use transport::{HttpTransport, Transport};
