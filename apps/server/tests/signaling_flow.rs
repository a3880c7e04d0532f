//! End-to-end signaling flows against a live server on an ephemeral port.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use signal_proto::event::ServerEvent;
use signal_server::state::AppState;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server() -> SocketAddr {
    let app = signal_server::app(AppState::new());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn connect_as(addr: SocketAddr, identity: &str) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/ws?identity={identity}"))
        .await
        .unwrap();
    client
}

async fn next_event(client: &mut Client) -> ServerEvent {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for a server event")
            .expect("connection closed")
            .unwrap();
        if let Message::Text(text) = message {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn expect_silence(client: &mut Client) {
    let result = tokio::time::timeout(Duration::from_millis(300), client.next()).await;
    assert!(result.is_err(), "expected no event, got {result:?}");
}

fn online_set(event: ServerEvent) -> Vec<String> {
    match event {
        ServerEvent::GetOnlineUsers(mut users) => {
            users.sort();
            users
        }
        other => panic!("expected getOnlineUsers, got {other:?}"),
    }
}

async fn send(client: &mut Client, frame: serde_json::Value) {
    client
        .send(Message::Text(frame.to_string()))
        .await
        .unwrap();
}

#[tokio::test]
async fn call_and_timer_flow_between_two_users() {
    let addr = spawn_server().await;

    let mut u1 = connect_as(addr, "u1").await;
    assert_eq!(online_set(next_event(&mut u1).await), vec!["u1"]);

    let mut u2 = connect_as(addr, "u2").await;
    assert_eq!(online_set(next_event(&mut u2).await), vec!["u1", "u2"]);
    assert_eq!(online_set(next_event(&mut u1).await), vec!["u1", "u2"]);

    // u1 calls u2.
    send(
        &mut u1,
        json!({
            "type": "callUser",
            "data": {"userToCall": "u2", "signalData": {"sdp": "X"}, "from": "u1", "name": "Ann"},
        }),
    )
    .await;
    match next_event(&mut u2).await {
        ServerEvent::CallUser(invite) => {
            assert_eq!(invite.signal, json!({"sdp": "X"}));
            assert_eq!(invite.from, "u1");
            assert_eq!(invite.name, "Ann");
        }
        other => panic!("expected callUser, got {other:?}"),
    }

    // u2 answers.
    send(
        &mut u2,
        json!({
            "type": "answerCall",
            "data": {"to": "u1", "signal": {"sdp": "Y"}},
        }),
    )
    .await;
    match next_event(&mut u1).await {
        ServerEvent::CallAccepted(signal) => assert_eq!(signal, json!({"sdp": "Y"})),
        other => panic!("expected callAccepted, got {other:?}"),
    }

    // u1 starts a 10 minute shared countdown; both sides get one deadline.
    let before = chrono::Utc::now().timestamp_millis();
    send(
        &mut u1,
        json!({"type": "timer-start", "data": {"to": "u2", "duration": 10}}),
    )
    .await;
    let u2_deadline = match next_event(&mut u2).await {
        ServerEvent::TimerUpdate(update) => update.end_time,
        other => panic!("expected timer-update, got {other:?}"),
    };
    let u1_deadline = match next_event(&mut u1).await {
        ServerEvent::TimerUpdate(update) => update.end_time,
        other => panic!("expected timer-update, got {other:?}"),
    };
    assert_eq!(u1_deadline, u2_deadline);
    let expected = before + 10 * 60_000;
    assert!(
        (u2_deadline - expected).abs() < 1_000,
        "deadline {u2_deadline} drifted from expected {expected}"
    );

    // u2 hangs up.
    send(
        &mut u2,
        json!({"type": "endCall", "data": {"to": "u1", "from": "u2"}}),
    )
    .await;
    match next_event(&mut u1).await {
        ServerEvent::CallEnded(end) => assert_eq!(end.from, "u2"),
        other => panic!("expected callEnded, got {other:?}"),
    }

    // u2 disconnects; u1 sees the shrunken presence set.
    u2.close(None).await.unwrap();
    assert_eq!(online_set(next_event(&mut u1).await), vec!["u1"]);
}

#[tokio::test]
async fn offers_reach_every_tab_of_the_callee() {
    let addr = spawn_server().await;

    let mut u1 = connect_as(addr, "u1").await;
    assert_eq!(online_set(next_event(&mut u1).await), vec!["u1"]);

    let mut tab_a = connect_as(addr, "u2").await;
    assert_eq!(online_set(next_event(&mut tab_a).await), vec!["u1", "u2"]);
    assert_eq!(online_set(next_event(&mut u1).await), vec!["u1", "u2"]);

    // Second tab of the same identity: presence still lists u2 once.
    let mut tab_b = connect_as(addr, "u2").await;
    assert_eq!(online_set(next_event(&mut tab_b).await), vec!["u1", "u2"]);
    assert_eq!(online_set(next_event(&mut tab_a).await), vec!["u1", "u2"]);
    assert_eq!(online_set(next_event(&mut u1).await), vec!["u1", "u2"]);

    send(
        &mut u1,
        json!({
            "type": "callUser",
            "data": {"userToCall": "u2", "signalData": {"sdp": "X"}, "from": "u1", "name": "Ann"},
        }),
    )
    .await;

    for tab in [&mut tab_a, &mut tab_b] {
        match next_event(tab).await {
            ServerEvent::CallUser(invite) => assert_eq!(invite.signal, json!({"sdp": "X"})),
            other => panic!("expected callUser, got {other:?}"),
        }
    }

    // One tab closing keeps u2 online.
    tab_b.close(None).await.unwrap();
    assert_eq!(online_set(next_event(&mut u1).await), vec!["u1", "u2"]);
    assert_eq!(online_set(next_event(&mut tab_a).await), vec!["u1", "u2"]);
}

#[tokio::test]
async fn junk_frames_and_offline_targets_do_not_disturb_the_server() {
    let addr = spawn_server().await;

    let mut u1 = connect_as(addr, "u1").await;
    assert_eq!(online_set(next_event(&mut u1).await), vec!["u1"]);

    // Not JSON, unknown event kind, and an offer to nobody.
    u1.send(Message::Text("not json at all".to_string()))
        .await
        .unwrap();
    send(&mut u1, json!({"type": "selfDestruct", "data": {}})).await;
    send(
        &mut u1,
        json!({
            "type": "callUser",
            "data": {"userToCall": "ghost", "signalData": {"sdp": "X"}, "from": "u1", "name": "Ann"},
        }),
    )
    .await;
    expect_silence(&mut u1).await;

    // The server is still routing: a fresh connect triggers presence.
    let mut u2 = connect_as(addr, "u2").await;
    assert_eq!(online_set(next_event(&mut u2).await), vec!["u1", "u2"]);
    assert_eq!(online_set(next_event(&mut u1).await), vec!["u1", "u2"]);
}

#[tokio::test]
async fn anonymous_connections_observe_but_never_join_presence() {
    let addr = spawn_server().await;

    let mut u1 = connect_as(addr, "u1").await;
    assert_eq!(online_set(next_event(&mut u1).await), vec!["u1"]);

    // No identity in the handshake: one snapshot, then nothing.
    let (mut anon, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    assert_eq!(online_set(next_event(&mut anon).await), vec!["u1"]);

    let mut u2 = connect_as(addr, "u2").await;
    assert_eq!(online_set(next_event(&mut u2).await), vec!["u1", "u2"]);
    assert_eq!(online_set(next_event(&mut u1).await), vec!["u1", "u2"]);
    expect_silence(&mut anon).await;
}
