//! End-to-end tests: real WebSocket clients against a running server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use typerace_engine::{FixedParagraph, GameConfig};
use typerace_protocol::{ClientEvent, ConnectionId, ServerEvent};
use typerace_server::TypeRaceServer;

type Ws = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

// =========================================================================
// Helpers
// =========================================================================

/// Starts a server over a fixed paragraph; returns its address.
async fn start(paragraph: &str) -> String {
    start_with(paragraph, GameConfig::default()).await
}

async fn start_with(paragraph: &str, config: GameConfig) -> String {
    let server = TypeRaceServer::builder()
        .bind("127.0.0.1:0")
        .config(config)
        .paragraphs(FixedParagraph::new(paragraph))
        .build()
        .await
        .unwrap();
    let addr = server.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn ws(addr: &str) -> Ws {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .unwrap();
    ws
}

async fn send(ws: &mut Ws, event: &ClientEvent) {
    let json = serde_json::to_string(event).unwrap();
    ws.send(Message::Text(json.into())).await.unwrap();
}

async fn recv(ws: &mut Ws) -> ServerEvent {
    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for event")
        .expect("socket closed")
        .unwrap();
    match msg {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        Message::Binary(data) => serde_json::from_slice(&data).unwrap(),
        other => panic!("unexpected frame: {other:?}"),
    }
}

async fn join(ws: &mut Ws, room: &str, name: &str) {
    send(
        ws,
        &ClientEvent::Join {
            room_id: room.into(),
            name: name.into(),
        },
    )
    .await;
}

/// Joins as room creator and drains the four join events; returns the
/// creator's connection id (learned from the player-joined broadcast).
async fn join_as_creator(ws: &mut Ws, room: &str, name: &str) -> ConnectionId {
    join(ws, room, name).await;
    let id = match recv(ws).await {
        ServerEvent::PlayerJoined { id, .. } => id,
        other => panic!("expected player-joined, got {other:?}"),
    };
    assert!(matches!(recv(ws).await, ServerEvent::Players { .. }));
    assert!(matches!(recv(ws).await, ServerEvent::NewHost { .. }));
    assert!(matches!(recv(ws).await, ServerEvent::GameCreated { .. }));
    id
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_join_sequence_over_websocket() {
    let addr = start("the quick brown fox").await;
    let mut c1 = ws(&addr).await;

    join(&mut c1, "race-1", "ada").await;

    let joined = recv(&mut c1).await;
    let id = match joined {
        ServerEvent::PlayerJoined {
            id,
            ref name,
            score: 0,
            precision,
        } if name == "ada" && precision == 0.0 => id,
        other => panic!("expected player-joined, got {other:?}"),
    };
    match recv(&mut c1).await {
        ServerEvent::Players { players } => {
            assert_eq!(players.len(), 1);
            assert_eq!(players[0].id, id);
        }
        other => panic!("expected players, got {other:?}"),
    }
    assert!(matches!(
        recv(&mut c1).await,
        ServerEvent::NewHost { id: host } if host == id
    ));
    assert!(matches!(
        recv(&mut c1).await,
        ServerEvent::GameCreated { room_id } if room_id.as_str() == "race-1"
    ));
}

#[tokio::test]
async fn test_invalid_room_id_yields_error_and_no_membership() {
    let addr = start("cat").await;
    let mut c1 = ws(&addr).await;

    join(&mut c1, "bad room!", "ada").await;
    assert!(matches!(
        recv(&mut c1).await,
        ServerEvent::Error { message } if message.contains("room id")
    ));

    // The same connection can still join properly afterwards.
    let _ = join_as_creator(&mut c1, "good-room", "ada").await;
}

#[tokio::test]
async fn test_malformed_frame_yields_error() {
    let addr = start("cat").await;
    let mut c1 = ws(&addr).await;

    c1.send(Message::Text("this is not an event".into()))
        .await
        .unwrap();
    assert!(matches!(
        recv(&mut c1).await,
        ServerEvent::Error { message } if message.contains("malformed")
    ));
}

#[tokio::test]
async fn test_start_outside_any_room_yields_error() {
    let addr = start("cat").await;
    let mut c1 = ws(&addr).await;

    send(&mut c1, &ClientEvent::Start).await;
    assert!(matches!(
        recv(&mut c1).await,
        ServerEvent::Error { message } if message.contains("not in a game")
    ));
}

#[tokio::test]
async fn test_non_host_start_is_rejected() {
    let addr = start("cat dog").await;
    let mut c1 = ws(&addr).await;
    let mut c2 = ws(&addr).await;

    let _host = join_as_creator(&mut c1, "race", "ada").await;
    join(&mut c2, "race", "bob").await;
    // c2: the broadcast about themselves, then snapshot and host notice.
    assert!(matches!(recv(&mut c2).await, ServerEvent::PlayerJoined { .. }));
    assert!(matches!(recv(&mut c2).await, ServerEvent::Players { .. }));
    assert!(matches!(recv(&mut c2).await, ServerEvent::NewHost { .. }));

    send(&mut c2, &ClientEvent::Start).await;
    assert!(matches!(
        recv(&mut c2).await,
        ServerEvent::Error { message } if message.contains("host")
    ));
}

#[tokio::test]
async fn test_full_race_to_completion() {
    let paragraph = "the quick brown fox";
    let addr = start(paragraph).await;
    let mut c1 = ws(&addr).await;
    let mut c2 = ws(&addr).await;

    let host = join_as_creator(&mut c1, "race", "ada").await;
    join(&mut c2, "race", "bob").await;
    let bob = match recv(&mut c2).await {
        ServerEvent::PlayerJoined { id, .. } => id,
        other => panic!("expected player-joined, got {other:?}"),
    };
    assert!(matches!(recv(&mut c2).await, ServerEvent::Players { .. }));
    assert!(matches!(recv(&mut c2).await, ServerEvent::NewHost { id } if id == host));
    // c1 sees bob arrive.
    assert!(matches!(
        recv(&mut c1).await,
        ServerEvent::PlayerJoined { id, .. } if id == bob
    ));

    // Host starts the round: reset snapshot, then the paragraph.
    send(&mut c1, &ClientEvent::Start).await;
    for client in [&mut c1, &mut c2] {
        assert!(matches!(
            recv(client).await,
            ServerEvent::Players { players }
                if players.len() == 2 && players.iter().all(|p| p.score == 0)
        ));
        assert!(matches!(
            recv(client).await,
            ServerEvent::GameStarted { paragraph: p } if p == paragraph
        ));
    }

    // Bob types a partial prefix with one wrong word.
    send(
        &mut c2,
        &ClientEvent::Typed {
            text: "the quick red".into(),
        },
    )
    .await;
    for client in [&mut c1, &mut c2] {
        assert!(matches!(
            recv(client).await,
            ServerEvent::PlayerScore { id, score: 2, .. } if id == bob
        ));
    }

    // Ada types the full paragraph: score, finish, final snapshot.
    send(
        &mut c1,
        &ClientEvent::Typed {
            text: paragraph.into(),
        },
    )
    .await;
    for client in [&mut c1, &mut c2] {
        assert!(matches!(
            recv(client).await,
            ServerEvent::PlayerScore { id, score: 4, precision }
                if id == host && precision == 100.0
        ));
        assert!(matches!(recv(client).await, ServerEvent::GameFinished));
        match recv(client).await {
            ServerEvent::Players { players } => {
                let ada = players.iter().find(|p| p.id == host).unwrap();
                assert_eq!(ada.score, 4);
                let bob_snap = players.iter().find(|p| p.id == bob).unwrap();
                assert_eq!(bob_snap.score, 2);
            }
            other => panic!("expected final players snapshot, got {other:?}"),
        }
    }

    // Typing after the finish is rejected.
    send(
        &mut c2,
        &ClientEvent::Typed { text: "the".into() },
    )
    .await;
    assert!(matches!(
        recv(&mut c2).await,
        ServerEvent::Error { message } if message.contains("not started")
    ));
}

#[tokio::test]
async fn test_disconnect_broadcasts_player_left_and_transfers_host() {
    let addr = start("cat dog").await;
    let mut c1 = ws(&addr).await;
    let mut c2 = ws(&addr).await;

    let host = join_as_creator(&mut c1, "race", "ada").await;
    join(&mut c2, "race", "bob").await;
    let bob = match recv(&mut c2).await {
        ServerEvent::PlayerJoined { id, .. } => id,
        other => panic!("expected player-joined, got {other:?}"),
    };
    assert!(matches!(recv(&mut c2).await, ServerEvent::Players { .. }));
    assert!(matches!(recv(&mut c2).await, ServerEvent::NewHost { .. }));
    assert!(matches!(recv(&mut c1).await, ServerEvent::PlayerJoined { .. }));

    // The host's socket drops; bob inherits the room.
    c1.close(None).await.unwrap();
    assert!(matches!(
        recv(&mut c2).await,
        ServerEvent::PlayerLeft { id } if id == host
    ));
    assert!(matches!(
        recv(&mut c2).await,
        ServerEvent::NewHost { id } if id == bob
    ));

    // And the new host may start a round.
    send(&mut c2, &ClientEvent::Start).await;
    assert!(matches!(recv(&mut c2).await, ServerEvent::Players { .. }));
    assert!(matches!(recv(&mut c2).await, ServerEvent::GameStarted { .. }));
}

#[tokio::test]
async fn test_round_timeout_over_websocket() {
    let config = GameConfig {
        round_duration: Duration::from_millis(100),
        ..GameConfig::default()
    };
    let addr = start_with("cat dog", config).await;
    let mut c1 = ws(&addr).await;
    let _ = join_as_creator(&mut c1, "race", "ada").await;

    send(&mut c1, &ClientEvent::Start).await;
    assert!(matches!(recv(&mut c1).await, ServerEvent::Players { .. }));
    assert!(matches!(recv(&mut c1).await, ServerEvent::GameStarted { .. }));

    // Nobody types; the round times out on its own.
    assert!(matches!(recv(&mut c1).await, ServerEvent::GameFinished));
    assert!(matches!(recv(&mut c1).await, ServerEvent::Players { .. }));
}
