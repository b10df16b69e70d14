//! End-to-end scenarios against the live mock broker.
//!
//! # Design
//! Each test boots the mock broker on a random port inside a background
//! thread (current-thread tokio runtime), then drives a real `SmqClient`
//! over HTTP. Broker state is scripted and inspected directly through the
//! shared `BrokerState` handle. Clients use a short timeout so worker joins
//! stay fast; the one timing-contract test uses the stock 2000 ms default.

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use mock_broker::{BrokerState, PublishedMessage, SubscriptionEvent};
use smq_core::SmqClient;

const SHORT: Duration = Duration::from_millis(200);

fn start_broker() -> (SocketAddr, Arc<BrokerState>) {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let state = BrokerState::new();
    let server_state = state.clone();
    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_broker::run(listener, server_state).await
        })
        .unwrap();
    });

    (addr, state)
}

fn client(name: &str, addr: SocketAddr) -> SmqClient {
    SmqClient::create_with_timeout(name, "127.0.0.1", addr.port(), SHORT).unwrap()
}

/// Poll `cond` until it holds or `deadline` elapses.
fn wait_until(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    cond()
}

/// Retry `retrieve` across several timeouts so a slow poll cannot flake.
fn retrieve_with_retries(client: &SmqClient) -> Option<String> {
    for _ in 0..25 {
        if let Some(body) = client.retrieve() {
            return Some(body);
        }
    }
    None
}

#[test]
fn publish_reaches_the_broker_exactly_once() {
    let (addr, state) = start_broker();
    let client = client("alice", addr);

    client.publish("t", "hello");

    assert!(wait_until(Duration::from_secs(5), || state.published().len() == 1));
    // Give the pusher room to misbehave before checking for duplicates.
    thread::sleep(Duration::from_millis(300));
    assert_eq!(
        state.published(),
        vec![PublishedMessage {
            topic: "t".to_string(),
            body: "hello".to_string(),
        }]
    );

    client.shutdown();
}

#[test]
fn subscribe_then_receive_scripted_messages_in_order() {
    let (addr, state) = start_broker();
    let client = client("bob", addr);

    client.subscribe("chat");
    state.enqueue_message("bob", "hi");
    state.enqueue_message("bob", "there");

    assert_eq!(retrieve_with_retries(&client).as_deref(), Some("hi"));
    assert_eq!(retrieve_with_retries(&client).as_deref(), Some("there"));

    assert!(wait_until(Duration::from_secs(5), || {
        state.subscriptions().contains(&SubscriptionEvent::Subscribed {
            name: "bob".to_string(),
            topic: "chat".to_string(),
        })
    }));

    client.shutdown();
}

#[test]
fn unsubscribe_issues_a_delete_for_the_mailbox() {
    let (addr, state) = start_broker();
    let client = client("bob", addr);

    client.unsubscribe("chat");

    assert!(wait_until(Duration::from_secs(5), || {
        state
            .subscriptions()
            .contains(&SubscriptionEvent::Unsubscribed {
                name: "bob".to_string(),
                topic: "chat".to_string(),
            })
    }));

    client.shutdown();
}

#[test]
fn polling_survives_broker_failures_without_duplicating_delivery() {
    let (addr, state) = start_broker();
    state.enqueue_message("carol", "ok");
    state.fail_next_gets(3);

    let client = client("carol", addr);

    assert_eq!(retrieve_with_retries(&client).as_deref(), Some("ok"));
    assert!(client.retrieve().is_none(), "message delivered twice");

    client.shutdown();
}

#[test]
fn publishing_survives_broker_failures_without_losing_the_message() {
    let (addr, state) = start_broker();
    state.fail_next_puts(3);

    let client = client("alice", addr);
    client.publish("t", "durable");

    assert!(wait_until(Duration::from_secs(10), || state.published().len() == 1));
    assert_eq!(state.published()[0].body, "durable");

    client.shutdown();
}

#[test]
fn retrieve_on_an_idle_mailbox_honors_the_default_timeout() {
    let (addr, _state) = start_broker();
    let client = SmqClient::create("dave", "127.0.0.1", addr.port()).unwrap();

    let start = Instant::now();
    assert!(client.retrieve().is_none());
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(1900), "returned early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(3500), "overslept: {elapsed:?}");

    client.shutdown();
}

#[test]
fn an_empty_broker_body_is_delivered_as_an_empty_message() {
    let (addr, state) = start_broker();
    state.enqueue_message("erin", "");

    let client = client("erin", addr);

    assert_eq!(retrieve_with_retries(&client).as_deref(), Some(""));

    client.shutdown();
}

#[test]
fn immediate_shutdown_with_queued_publishes_does_not_hang() {
    let (addr, _state) = start_broker();
    let client = client("alice", addr);

    client.publish("t", "one");
    client.publish("t", "two");
    client.shutdown();

    assert!(!client.is_running());
    client.publish("t", "ignored");
    assert!(client.retrieve().is_none());
    drop(client);
}
