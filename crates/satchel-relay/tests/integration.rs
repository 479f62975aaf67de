//! End-to-end tests: a real session against an in-process mock router.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use satchel_core::{ApiRequest, ClientEvent, RequestId, ServerEvent};
use satchel_relay::dispatch::handlers::register_all;
use satchel_relay::{AgentContext, MethodRegistry, RelayError, RelaySession, SessionConfig};
use satchel_store::DocumentStore;

const TIMEOUT: Duration = Duration::from_secs(5);

type RouterStream = tokio_tungstenite::WebSocketStream<TcpStream>;

struct TestAgent {
    _dir: tempfile::TempDir,
    shutdown: CancellationToken,
    handle: JoinHandle<Result<(), RelayError>>,
}

async fn bind_router() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    (listener, url)
}

fn spawn_agent(router_url: &str) -> TestAgent {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::open(dir.path().join("database.json"));
    let ctx = Arc::new(AgentContext::new(store, "itest-user"));

    let mut registry = MethodRegistry::new();
    register_all(&mut registry);

    let shutdown = CancellationToken::new();
    let session = RelaySession::new(
        SessionConfig {
            router_url: router_url.to_owned(),
            heartbeat_interval: Duration::from_secs(30),
        },
        registry,
        ctx,
        shutdown.clone(),
    );
    let handle = tokio::spawn(session.run());

    TestAgent {
        _dir: dir,
        shutdown,
        handle,
    }
}

async fn accept_agent(listener: &TcpListener) -> RouterStream {
    let (stream, _) = timeout(TIMEOUT, listener.accept())
        .await
        .expect("agent should dial in")
        .unwrap();
    tokio_tungstenite::accept_async(stream).await.unwrap()
}

async fn recv_event(ws: &mut RouterStream) -> ClientEvent {
    loop {
        let message = timeout(TIMEOUT, ws.next())
            .await
            .expect("agent should send a frame")
            .expect("stream should stay open")
            .unwrap();
        if let Message::Text(text) = message {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn send_event(ws: &mut RouterStream, event: &ServerEvent) {
    let text = serde_json::to_string(event).unwrap();
    ws.send(Message::Text(text.into())).await.unwrap();
}

fn api_request(id: &str, method: &str, path: &str, body: Option<serde_json::Value>) -> ServerEvent {
    ServerEvent::ApiRequest(ApiRequest {
        id: RequestId::from(id),
        method: method.into(),
        path: path.into(),
        body,
    })
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn authenticates_then_serves_post_and_get() {
    let (listener, url) = bind_router().await;
    let agent = spawn_agent(&url);
    let mut ws = accept_agent(&listener).await;

    match recv_event(&mut ws).await {
        ClientEvent::Authenticate { username, user_id } => {
            assert_eq!(username, "itest-user");
            assert_eq!(user_id, "itest-user");
        }
        other => panic!("expected authenticate, got {other:?}"),
    }
    send_event(&mut ws, &ServerEvent::Authenticated {}).await;

    send_event(
        &mut ws,
        &api_request("r1", "POST", "/items", Some(json!({"name": "x"}))),
    )
    .await;
    let created = match recv_event(&mut ws).await {
        ClientEvent::ApiResponse(resp) => resp,
        other => panic!("expected api_response, got {other:?}"),
    };
    assert_eq!(created.request_id, RequestId::from("r1"));
    assert_eq!(created.status_code, 201);
    let body = created.body.unwrap();
    assert_eq!(body["name"], "x");
    let id = body["id"].as_str().unwrap().to_owned();

    send_event(&mut ws, &api_request("r2", "GET", &format!("/items/{id}"), None)).await;
    let read = match recv_event(&mut ws).await {
        ClientEvent::ApiResponse(resp) => resp,
        other => panic!("expected api_response, got {other:?}"),
    };
    assert_eq!(read.request_id, RequestId::from("r2"));
    assert_eq!(read.status_code, 200);
    assert_eq!(read.body.unwrap(), body);

    agent.shutdown.cancel();
    let result = timeout(TIMEOUT, agent.handle).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn snapshot_returns_full_tree() {
    let (listener, url) = bind_router().await;
    let agent = spawn_agent(&url);
    let mut ws = accept_agent(&listener).await;

    let _ = recv_event(&mut ws).await; // authenticate
    send_event(&mut ws, &ServerEvent::Authenticated {}).await;

    send_event(
        &mut ws,
        &api_request("r1", "POST", "/items", Some(json!({"name": "x"}))),
    )
    .await;
    let _ = recv_event(&mut ws).await;

    send_event(
        &mut ws,
        &ServerEvent::GetDataSnapshot {
            request_id: RequestId::from("snap-1"),
        },
    )
    .await;
    match recv_event(&mut ws).await {
        ClientEvent::DataSnapshot {
            request_id,
            snapshot,
        } => {
            assert_eq!(request_id, RequestId::from("snap-1"));
            let items = snapshot["items"].as_object().unwrap();
            assert_eq!(items.len(), 1);
            let (_, item) = items.iter().next().unwrap();
            assert_eq!(item["name"], "x");
        }
        other => panic!("expected data_snapshot, got {other:?}"),
    }

    agent.shutdown.cancel();
    let result = timeout(TIMEOUT, agent.handle).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn auth_rejection_is_fatal_and_not_retried() {
    let (listener, url) = bind_router().await;
    let agent = spawn_agent(&url);
    let mut ws = accept_agent(&listener).await;

    let _ = recv_event(&mut ws).await; // authenticate
    send_event(
        &mut ws,
        &ServerEvent::AuthError {
            message: "unknown user".into(),
        },
    )
    .await;

    let result = timeout(TIMEOUT, agent.handle).await.unwrap().unwrap();
    match result {
        Err(RelayError::AuthRejected { message }) => assert_eq!(message, "unknown user"),
        other => panic!("expected AuthRejected, got {other:?}"),
    }

    // No reconnect attempt follows a rejected identity.
    let second = timeout(Duration::from_millis(300), listener.accept()).await;
    assert!(second.is_err(), "agent should not dial back in");
}

#[tokio::test]
async fn reconnects_after_transport_drop() {
    let (listener, url) = bind_router().await;
    let agent = spawn_agent(&url);

    let mut ws = accept_agent(&listener).await;
    let _ = recv_event(&mut ws).await; // authenticate
    send_event(&mut ws, &ServerEvent::Authenticated {}).await;
    drop(ws);

    // The agent comes back after backoff and re-authenticates.
    let mut ws = accept_agent(&listener).await;
    match recv_event(&mut ws).await {
        ClientEvent::Authenticate { username, .. } => assert_eq!(username, "itest-user"),
        other => panic!("expected authenticate on reconnect, got {other:?}"),
    }

    agent.shutdown.cancel();
    let result = timeout(TIMEOUT, agent.handle).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn requests_before_authentication_are_ignored() {
    let (listener, url) = bind_router().await;
    let agent = spawn_agent(&url);
    let mut ws = accept_agent(&listener).await;

    let _ = recv_event(&mut ws).await; // authenticate

    // Relayed before the handshake completes: must get no reply.
    send_event(&mut ws, &api_request("early", "GET", "/x", None)).await;
    send_event(&mut ws, &ServerEvent::Authenticated {}).await;
    send_event(&mut ws, &api_request("late", "GET", "/x", None)).await;

    // The first reply correlates to the post-handshake request.
    match recv_event(&mut ws).await {
        ClientEvent::ApiResponse(resp) => {
            assert_eq!(resp.request_id, RequestId::from("late"));
            assert_eq!(resp.status_code, 404);
        }
        other => panic!("expected api_response, got {other:?}"),
    }

    agent.shutdown.cancel();
    let result = timeout(TIMEOUT, agent.handle).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn heartbeats_flow_while_connected() {
    let (listener, url) = bind_router().await;

    // Shorten the interval so the test observes a tick quickly.
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::open(dir.path().join("database.json"));
    let ctx = Arc::new(AgentContext::new(store, "itest-user"));
    let mut registry = MethodRegistry::new();
    register_all(&mut registry);
    let shutdown = CancellationToken::new();
    let session = RelaySession::new(
        SessionConfig {
            router_url: url,
            heartbeat_interval: Duration::from_millis(100),
        },
        registry,
        ctx,
        shutdown.clone(),
    );
    let handle = tokio::spawn(session.run());

    let mut ws = accept_agent(&listener).await;
    let _ = recv_event(&mut ws).await; // authenticate
    send_event(&mut ws, &ServerEvent::Authenticated {}).await;

    match recv_event(&mut ws).await {
        ClientEvent::Heartbeat {} => {}
        other => panic!("expected heartbeat, got {other:?}"),
    }

    shutdown.cancel();
    let result = timeout(TIMEOUT, handle).await.unwrap().unwrap();
    assert!(result.is_ok());
}
