//! The two background loops bridging the queues to the transport.
//!
//! Both loops re-check the client's running flag between iterations; that is
//! the only cancellation point, so shutdown can take up to one queue wait
//! plus one HTTP deadline to be observed.

use std::sync::Arc;
use std::thread;

use crate::client::Shared;
use crate::request::{HttpMethod, Request};
use crate::transport::Transport;

/// Drain the outgoing queue into broker exchanges.
///
/// A failed exchange requeues the same Request at the tail, behind any newer
/// work: retries are uncapped and out-of-order relative to fresh publishes.
pub(crate) fn pusher(shared: Arc<Shared>, transport: Arc<dyn Transport>) {
    tracing::debug!("pusher started");
    while shared.is_running() {
        let Some(request) = shared.outgoing.pop(shared.timeout) else {
            continue;
        };
        match transport.perform(&request, shared.timeout) {
            // The broker's ack body carries nothing the client needs.
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(error = %err, "exchange failed, requeueing");
                if let Some(backoff) = shared.retry_backoff {
                    thread::sleep(backoff);
                }
                if shared.outgoing.push(request).is_err() {
                    tracing::debug!("outgoing queue shut down, dropping unsent request");
                }
            }
        }
    }
    tracing::debug!("pusher stopped");
}

/// Long-poll the client's mailbox and feed the incoming queue.
///
/// Every failure (timeout, connection error, or the broker's "no message"
/// status) just means "poll again." A 2xx with an empty body is delivered
/// as an empty message; filtering those is the broker's contract to get
/// right, not ours.
pub(crate) fn puller(shared: Arc<Shared>, transport: Arc<dyn Transport>) {
    tracing::debug!("puller started");
    let poll = Request::new(
        HttpMethod::Get,
        format!("{}/queue/{}", shared.server_url, shared.name),
    );
    while shared.is_running() {
        match transport.perform(&poll, shared.timeout) {
            Ok(body) => {
                if shared.incoming.push(Request::message(body)).is_err() {
                    tracing::debug!("incoming queue shut down, dropping received message");
                }
            }
            // An idle mailbox answers promptly, so an unpaced loop would
            // poll as fast as the network allows.
            Err(_) => {
                if let Some(backoff) = shared.retry_backoff {
                    thread::sleep(backoff);
                }
            }
        }
    }
    tracing::debug!("puller stopped");
}
