//! In-memory SMQ broker implementing the client's wire contract.
//!
//! # Design
//! This is a recording mock, not a real broker: PUTs and DELETEs are logged
//! into shared state for tests to inspect, and `GET /queue/{name}` serves
//! bodies from a per-mailbox scripted list instead of doing topic fan-out.
//! An empty mailbox answers 404, the "no message" signal the client's
//! transport folds into its failure path. Tests can also arm fail-next
//! counters to make the next N exchanges answer 500, which is how retry
//! behavior gets exercised end-to-end.
//!
//! State uses `std::sync` primitives so synchronous test threads can script
//! and inspect it while the axum handlers run on the server's runtime; no
//! lock is held across an await.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::Router;
use tokio::net::TcpListener;

/// One recorded `PUT /topic/{topic}` exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub body: String,
}

/// One recorded subscription change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent {
    Subscribed { name: String, topic: String },
    Unsubscribed { name: String, topic: String },
}

/// Shared broker state: what was received, what will be served.
#[derive(Debug, Default)]
pub struct BrokerState {
    published: Mutex<Vec<PublishedMessage>>,
    subscriptions: Mutex<Vec<SubscriptionEvent>>,
    mailboxes: Mutex<HashMap<String, VecDeque<String>>>,
    fail_puts: AtomicUsize,
    fail_gets: AtomicUsize,
}

impl BrokerState {
    pub fn new() -> Arc<Self> {
        Arc::new(BrokerState::default())
    }

    /// Script `body` as the next message `GET /queue/{name}` will serve.
    pub fn enqueue_message(&self, name: &str, body: &str) {
        lock(&self.mailboxes)
            .entry(name.to_string())
            .or_default()
            .push_back(body.to_string());
    }

    /// Every `PUT /topic/..` received so far, in arrival order.
    pub fn published(&self) -> Vec<PublishedMessage> {
        lock(&self.published).clone()
    }

    /// Every subscription change received so far, in arrival order.
    pub fn subscriptions(&self) -> Vec<SubscriptionEvent> {
        lock(&self.subscriptions).clone()
    }

    /// Answer the next `n` topic/subscription PUTs and DELETEs with 500.
    pub fn fail_next_puts(&self, n: usize) {
        self.fail_puts.store(n, Ordering::SeqCst);
    }

    /// Answer the next `n` mailbox GETs with 500.
    pub fn fail_next_gets(&self, n: usize) {
        self.fail_gets.store(n, Ordering::SeqCst);
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Build the broker router over `state`.
pub fn app(state: Arc<BrokerState>) -> Router {
    Router::new()
        .route("/topic/{topic}", put(publish))
        .route(
            "/subscription/{name}/{topic}",
            put(subscribe).delete(unsubscribe),
        )
        .route("/queue/{name}", get(poll_queue))
        .with_state(state)
}

/// Serve `state` on `listener` until the task is dropped.
pub async fn run(listener: TcpListener, state: Arc<BrokerState>) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

async fn publish(
    State(state): State<Arc<BrokerState>>,
    Path(topic): Path<String>,
    body: String,
) -> StatusCode {
    if BrokerState::take_failure(&state.fail_puts) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    lock(&state.published).push(PublishedMessage { topic, body });
    StatusCode::OK
}

async fn subscribe(
    State(state): State<Arc<BrokerState>>,
    Path((name, topic)): Path<(String, String)>,
) -> StatusCode {
    if BrokerState::take_failure(&state.fail_puts) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    lock(&state.subscriptions).push(SubscriptionEvent::Subscribed { name, topic });
    StatusCode::OK
}

async fn unsubscribe(
    State(state): State<Arc<BrokerState>>,
    Path((name, topic)): Path<(String, String)>,
) -> StatusCode {
    if BrokerState::take_failure(&state.fail_puts) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    lock(&state.subscriptions).push(SubscriptionEvent::Unsubscribed { name, topic });
    StatusCode::OK
}

async fn poll_queue(
    State(state): State<Arc<BrokerState>>,
    Path(name): Path<String>,
) -> Result<String, StatusCode> {
    if BrokerState::take_failure(&state.fail_gets) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    lock(&state.mailboxes)
        .get_mut(&name)
        .and_then(|mailbox| mailbox.pop_front())
        .ok_or(StatusCode::NOT_FOUND)
}
