//! WebSocket transport gateway.
//!
//! The only module that touches the socket layer. Accepts connections,
//! extracts the caller's identity from the handshake query, registers the
//! connection, and dispatches inbound frames to the signal router and the
//! timer coordinator. Everything the server sends back flows through the
//! per-connection writer task owned here.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use signal_proto::event::{ClientEvent, ServerEvent};

use crate::registry::Tx;
use crate::state::AppState;
use crate::{presence, signaling, timer};

#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    /// Verified user identity, supplied by the platform shell at connect
    /// time. `userId` is the name the original browser clients send.
    #[serde(alias = "userId")]
    identity: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, params.identity))
}

async fn handle_socket(socket: WebSocket, state: AppState, identity: Option<String>) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let token = Uuid::new_v4();

    match &identity {
        Some(id) => {
            state.registry.register(id, token, tx.clone());
            tracing::info!(identity = %id, %token, "connection registered");
            presence::broadcast_online_users(&state.registry);
        }
        None => {
            // Accepted, but never registered: not a routing target and not
            // part of the online set. It still gets a one-shot snapshot.
            tracing::info!(%token, "anonymous connection accepted");
            let snapshot = ServerEvent::GetOnlineUsers(state.registry.online_identities());
            deliver(&[tx.clone()], &snapshot);
        }
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    let dispatch_state = state.clone();
    let dispatch_tx = tx.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            match message {
                Message::Text(text) => dispatch(&dispatch_state, &dispatch_tx, &text),
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    // Whatever ended the session, unregister and rebroadcast. Duplicate
    // disconnects fall through as a no-op inside the registry.
    if let Some(id) = state.registry.unregister(token) {
        tracing::info!(identity = %id, %token, "connection closed");
    }
    presence::broadcast_online_users(&state.registry);
}

fn dispatch(state: &AppState, origin: &Tx, text: &str) {
    match ClientEvent::decode(text) {
        Ok(ClientEvent::CallUser(offer)) => signaling::route_offer(&state.registry, offer),
        Ok(ClientEvent::AnswerCall(answer)) => signaling::route_answer(&state.registry, answer),
        Ok(ClientEvent::EndCall(end)) => signaling::route_end(&state.registry, end),
        Ok(ClientEvent::TimerStart(request)) => timer::start_timer(&state.registry, origin, request),
        Ok(ClientEvent::TimerCancel(request)) => {
            timer::cancel_timer(&state.registry, origin, request)
        }
        Err(err) => tracing::debug!(error = %err, "ignoring client frame"),
    }
}

/// Sends one encoded event to each target connection. A send only fails when
/// the target's writer task is gone; that connection is skipped and the rest
/// of the fan-out still goes through.
pub(crate) fn deliver(targets: &[Tx], event: &ServerEvent) {
    let text = serde_json::to_string(event).unwrap();
    for tx in targets {
        if tx.send(Message::Text(text.clone())).is_err() {
            tracing::debug!("delivery skipped for a closed connection");
        }
    }
}
