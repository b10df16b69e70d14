//! The SMQ client: public API, queue ownership, and worker lifecycle.
//!
//! # Design
//! `SmqClient` is a thin handle over an `Arc`-shared state block. The two
//! worker threads hold their own `Arc` to that block, so application threads
//! and workers never borrow from each other; the client can even be dropped
//! while a worker is mid-exchange without invalidating anything.
//!
//! Shutdown is a barrier: it closes both queues, flips the running flag, and
//! joins both workers while holding the handle slot's lock, so *every*
//! caller of `shutdown` returns only once the workers are gone. Dropping the
//! client runs the same shutdown if the caller never did.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::ClientError;
use crate::queue::RequestQueue;
use crate::request::{HttpMethod, Request};
use crate::transport::{HttpTransport, Transport};
use crate::worker;

/// Timeout applied to both queue waits and HTTP exchanges unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Tuning knobs for a client, all optional.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Budget for each queue wait and each HTTP exchange.
    pub timeout: Duration,

    /// Extra sleep after a failed exchange: the pusher sleeps before
    /// requeueing, the puller before its next poll. Off by default: the
    /// stock retry policy is immediate requeue at tail and unpaced polling.
    pub retry_backoff: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            timeout: DEFAULT_TIMEOUT,
            retry_backoff: None,
        }
    }
}

/// State shared between the client handle and its two workers.
pub(crate) struct Shared {
    pub(crate) name: String,
    pub(crate) server_url: String,
    pub(crate) timeout: Duration,
    pub(crate) retry_backoff: Option<Duration>,
    running: Mutex<bool>,
    pub(crate) outgoing: RequestQueue,
    pub(crate) incoming: RequestQueue,
}

impl Shared {
    pub(crate) fn is_running(&self) -> bool {
        *self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop(&self) {
        *self.running.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }
}

/// A process-local handle to one mailbox identity on the broker.
///
/// Owns the outgoing and incoming queues and the pusher/puller workers that
/// bridge them to the broker over HTTP. Safe to share across application
/// threads behind a reference or an `Arc`.
pub struct SmqClient {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl SmqClient {
    /// Create a client for mailbox `name` against `host:port` with default
    /// options, and start both workers.
    pub fn create(name: &str, host: &str, port: u16) -> Result<Self, ClientError> {
        Self::create_with_options(name, host, port, ClientOptions::default())
    }

    /// [`create`](Self::create) with an explicit timeout.
    pub fn create_with_timeout(
        name: &str,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        Self::create_with_options(
            name,
            host,
            port,
            ClientOptions {
                timeout,
                ..Default::default()
            },
        )
    }

    /// [`create`](Self::create) with full options.
    pub fn create_with_options(
        name: &str,
        host: &str,
        port: u16,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        Self::create_with_transport(name, host, port, options, Arc::new(HttpTransport::new()))
    }

    /// Create a client over a caller-supplied [`Transport`].
    ///
    /// This is the seam tests use to script exchanges deterministically; it
    /// also lets embedders swap the HTTP stack.
    pub fn create_with_transport(
        name: &str,
        host: &str,
        port: u16,
        options: ClientOptions,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        let shared = Arc::new(Shared {
            name: name.to_string(),
            server_url: server_url(host, port),
            timeout: options.timeout,
            retry_backoff: options.retry_backoff,
            running: Mutex::new(true),
            outgoing: RequestQueue::new(),
            incoming: RequestQueue::new(),
        });

        let pusher = {
            let worker_shared = Arc::clone(&shared);
            let transport = Arc::clone(&transport);
            thread::Builder::new()
                .name("smq-pusher".to_string())
                .spawn(move || worker::pusher(worker_shared, transport))
                .map_err(ClientError::WorkerSpawn)?
        };

        let puller = {
            let worker_shared = Arc::clone(&shared);
            let spawned = thread::Builder::new()
                .name("smq-puller".to_string())
                .spawn(move || worker::puller(worker_shared, transport));
            match spawned {
                Ok(handle) => handle,
                Err(err) => {
                    // Roll back the half-started client before reporting.
                    shared.outgoing.shutdown();
                    shared.incoming.shutdown();
                    shared.stop();
                    let _ = pusher.join();
                    return Err(ClientError::WorkerSpawn(err));
                }
            }
        };

        Ok(SmqClient {
            shared,
            workers: Mutex::new(vec![pusher, puller]),
        })
    }

    /// Mailbox identity this client registered with the broker.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Base URL of the broker, scheme included.
    pub fn server_url(&self) -> &str {
        &self.shared.server_url
    }

    /// Queue one message for delivery to `topic`. No-op once shut down.
    pub fn publish(&self, topic: &str, body: &str) {
        if !self.is_running() {
            return;
        }
        let url = format!("{}/topic/{}", self.shared.server_url, topic);
        let request = Request::new(HttpMethod::Put, url).with_body(body);
        let _ = self.shared.outgoing.push(request);
    }

    /// Queue a subscription of this mailbox to `topic`.
    pub fn subscribe(&self, topic: &str) {
        let url = format!(
            "{}/subscription/{}/{}",
            self.shared.server_url, self.shared.name, topic
        );
        let _ = self.shared.outgoing.push(Request::new(HttpMethod::Put, url));
    }

    /// Queue removal of this mailbox's subscription to `topic`.
    pub fn unsubscribe(&self, topic: &str) {
        let url = format!(
            "{}/subscription/{}/{}",
            self.shared.server_url, self.shared.name, topic
        );
        let _ = self
            .shared
            .outgoing
            .push(Request::new(HttpMethod::Delete, url));
    }

    /// Take the next received message body, waiting up to the client's
    /// timeout. Returns `None` on timeout or once the client is shut down.
    /// The returned string is owned by the caller and outlives the client.
    pub fn retrieve(&self) -> Option<String> {
        if !self.is_running() {
            return None;
        }
        let request = self.shared.incoming.pop(self.shared.timeout)?;
        request.body
    }

    /// Whether the client is still accepting work.
    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// Stop both queues, then join both workers. Idempotent; every caller
    /// returns only after the workers have exited, which can take up to one
    /// queue wait plus one HTTP deadline.
    pub fn shutdown(&self) {
        self.shared.outgoing.shutdown();
        self.shared.incoming.shutdown();
        self.shared.stop();

        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        for handle in workers.drain(..) {
            if handle.join().is_err() {
                tracing::debug!("worker exited via panic");
            }
        }
    }
}

impl Drop for SmqClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Join host and port into a base URL, supplying a scheme when the host has
/// none. The HTTP stack only dispatches absolute URLs.
fn server_url(host: &str, port: u16) -> String {
    if host.contains("://") {
        format!("{host}:{port}")
    } else {
        format!("http://{host}:{port}")
    }
}
