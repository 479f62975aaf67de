//! Relay session lifecycle — connects to the routing service, authenticates,
//! heartbeats, and feeds relayed requests through the dispatcher.
//!
//! One `tokio::select!` loop per connection: an inbound frame is fully
//! processed (dispatched, stored, responded) before the next is read.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use satchel_core::{ClientEvent, ServerEvent};

use crate::backoff;
use crate::dispatch::context::AgentContext;
use crate::dispatch::registry::MethodRegistry;
use crate::errors::RelayError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection parameters for a [`RelaySession`].
pub struct SessionConfig {
    /// WebSocket URL of the routing service.
    pub router_url: String,
    /// Interval between outbound heartbeat frames.
    pub heartbeat_interval: Duration,
}

/// Lifecycle state of the relay connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionState {
    Connecting,
    /// Transport is up, handshake not yet acknowledged.
    Connected,
    /// Handshake accepted; request and snapshot events are served.
    Authenticated,
}

/// How a single connection ended.
enum ConnectionOutcome {
    /// The shutdown token fired; do not reconnect.
    Shutdown,
    /// The transport dropped; reconnect after backoff.
    Disconnected,
}

/// The agent's session with the routing service.
///
/// [`RelaySession::run`] loops over connections until shutdown, reconnecting
/// with exponential backoff. An authentication rejection is fatal and ends
/// the loop with an error.
pub struct RelaySession {
    config: SessionConfig,
    registry: MethodRegistry,
    ctx: Arc<AgentContext>,
    shutdown: CancellationToken,
}

impl RelaySession {
    /// Create a session over the given context and dispatch registry.
    pub fn new(
        config: SessionConfig,
        registry: MethodRegistry,
        ctx: Arc<AgentContext>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            registry,
            ctx,
            shutdown,
        }
    }

    /// Run until shutdown or a fatal authentication rejection.
    pub async fn run(self) -> Result<(), RelayError> {
        let mut attempt: u32 = 0;
        loop {
            if self.shutdown.is_cancelled() {
                return Ok(());
            }
            match self.run_connection().await {
                Ok(ConnectionOutcome::Shutdown) => return Ok(()),
                Ok(ConnectionOutcome::Disconnected) => {
                    info!("disconnected from routing service");
                    attempt = 0;
                }
                Err(RelayError::AuthRejected { message }) => {
                    return Err(RelayError::AuthRejected { message });
                }
                Err(error) => warn!(%error, "connection attempt failed"),
            }

            let delay = Duration::from_millis(backoff::backoff_delay_ms(
                attempt,
                rand::random::<f64>() * 2.0 - 1.0,
            ));
            attempt = attempt.saturating_add(1);
            debug!(?delay, attempt, "reconnecting after backoff");
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = self.shutdown.cancelled() => return Ok(()),
            }
        }
    }

    /// Drive one connection from dial to disconnect.
    async fn run_connection(&self) -> Result<ConnectionOutcome, RelayError> {
        let mut state = SessionState::Connecting;
        debug!(?state, url = %self.config.router_url, "connecting to routing service");
        let (ws, _) = connect_async(&self.config.router_url).await?;
        let (mut ws_tx, mut ws_rx) = ws.split();
        state = SessionState::Connected;
        info!("connected to routing service");

        send_event(
            &mut ws_tx,
            &ClientEvent::Authenticate {
                username: self.ctx.username.clone(),
                user_id: self.ctx.username.clone(),
            },
        )
        .await?;

        let mut heartbeat = tokio::time::interval(self.config.heartbeat_interval);
        // Skip the immediate first tick
        let _ = heartbeat.tick().await;

        loop {
            tokio::select! {
                message = ws_rx.next() => {
                    let text = match message {
                        Some(Ok(Message::Text(text))) => text.to_string(),
                        Some(Ok(Message::Binary(data))) => {
                            match String::from_utf8(data.to_vec()) {
                                Ok(text) => text,
                                Err(_) => {
                                    warn!(len = data.len(), "non-UTF8 binary frame ignored");
                                    continue;
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            return Ok(ConnectionOutcome::Disconnected);
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(error)) => {
                            warn!(%error, "transport read failed");
                            return Ok(ConnectionOutcome::Disconnected);
                        }
                    };
                    let Some(event) = parse_frame(&text) else { continue };
                    if let Some(reply) = self.handle_event(event, &mut state)? {
                        send_event(&mut ws_tx, &reply).await?;
                    }
                }
                _ = heartbeat.tick() => {
                    send_event(&mut ws_tx, &ClientEvent::Heartbeat {}).await?;
                }
                () = self.shutdown.cancelled() => {
                    info!("shutting down, closing connection");
                    let _ = ws_tx.send(Message::Close(None)).await;
                    return Ok(ConnectionOutcome::Shutdown);
                }
            }
        }
    }

    /// Process one inbound event, returning the frame to send back, if any.
    fn handle_event(
        &self,
        event: ServerEvent,
        state: &mut SessionState,
    ) -> Result<Option<ClientEvent>, RelayError> {
        match event {
            ServerEvent::Authenticated {} => {
                *state = SessionState::Authenticated;
                info!(username = %self.ctx.username, "authentication successful");
                Ok(None)
            }
            ServerEvent::AuthError { message } => Err(RelayError::AuthRejected { message }),
            ServerEvent::ApiRequest(request) => {
                if *state != SessionState::Authenticated {
                    warn!(id = %request.id, "api_request before authentication, ignoring");
                    return Ok(None);
                }
                debug!(
                    method = %request.method,
                    path = %request.path,
                    id = %request.id,
                    "serving relayed request"
                );
                let response = self.registry.dispatch(&request, &self.ctx);
                Ok(Some(ClientEvent::ApiResponse(response)))
            }
            ServerEvent::GetDataSnapshot { request_id } => {
                if *state != SessionState::Authenticated {
                    warn!(id = %request_id, "snapshot request before authentication, ignoring");
                    return Ok(None);
                }
                let snapshot = self.ctx.store.lock().snapshot();
                debug!(id = %request_id, "sending data snapshot");
                Ok(Some(ClientEvent::DataSnapshot {
                    request_id,
                    snapshot,
                }))
            }
        }
    }
}

/// Parse an inbound frame; unrecognized frames are logged and dropped.
fn parse_frame(text: &str) -> Option<ServerEvent> {
    match serde_json::from_str(text) {
        Ok(event) => Some(event),
        Err(error) => {
            warn!(%error, "unrecognized frame ignored");
            None
        }
    }
}

async fn send_event(
    ws_tx: &mut SplitSink<WsStream, Message>,
    event: &ClientEvent,
) -> Result<(), RelayError> {
    let text = serde_json::to_string(event)?;
    ws_tx.send(Message::Text(text.into())).await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
