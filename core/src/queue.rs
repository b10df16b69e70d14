//! Thread-safe FIFO of Requests with bounded-wait pop and shutdown.
//!
//! # Design
//! One mutex guards the whole queue state (items + running flag); two
//! condition variables pair with it. `produced` wakes a consumer per push.
//! `consumed` is signalled on every pop but nothing waits on it yet; it is
//! the hook for a bounded-capacity variant where producers would block.
//!
//! Shutdown is deliberately quiet: it flips `running` and wakes nobody.
//! Blocked consumers drain through their own deadlines, and Requests already
//! queued stay poppable: shutdown stops intake, not delivery.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::request::Request;

/// FIFO of [`Request`]s shared between application threads and one worker.
pub struct RequestQueue {
    inner: Mutex<Inner>,
    produced: Condvar,
    consumed: Condvar,
}

struct Inner {
    items: VecDeque<Request>,
    running: bool,
}

impl RequestQueue {
    /// Create an empty, running queue.
    pub fn new() -> Self {
        RequestQueue {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                running: true,
            }),
            produced: Condvar::new(),
            consumed: Condvar::new(),
        }
    }

    /// Append `request` at the tail and wake one waiting consumer.
    ///
    /// After [`shutdown`](Self::shutdown) the queue accepts nothing; the
    /// rejected Request is handed back so the caller keeps ownership and
    /// decides whether to drop or repurpose it.
    pub fn push(&self, request: Request) -> Result<(), Request> {
        let mut inner = self.lock();
        if !inner.running {
            return Err(request);
        }
        inner.items.push_back(request);
        self.produced.notify_one();
        Ok(())
    }

    /// Detach and return the head, waiting up to `timeout` for one to appear.
    ///
    /// The wait uses an absolute deadline, so spurious wakeups never extend
    /// it. Returns `None` once the deadline passes with the queue still
    /// empty. A queue that was shut down while non-empty keeps returning its
    /// remaining Requests.
    pub fn pop(&self, timeout: Duration) -> Option<Request> {
        let inner = self.lock();
        let (mut inner, _) = self
            .produced
            .wait_timeout_while(inner, timeout, |inner| inner.items.is_empty())
            .unwrap_or_else(PoisonError::into_inner);

        let request = inner.items.pop_front()?;
        self.consumed.notify_one();
        Some(request)
    }

    /// Stop accepting new Requests. Waiters are not woken; they drain via
    /// their own deadlines.
    pub fn shutdown(&self) {
        self.lock().running = false;
    }

    /// Number of Requests currently queued.
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Whether the queue still accepts pushes.
    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    // A poisoned lock means a worker panicked mid-operation; the queue state
    // itself is still coherent (every critical section completes its edits
    // before unlocking), so continue rather than propagate the panic.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        RequestQueue::new()
    }
}
