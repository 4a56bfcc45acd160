//! Per-connection handler: decode inbound events, pump outbound ones.
//!
//! Each accepted connection gets its own Tokio task running this handler
//! plus a small writer task draining the connection's outbound channel.
//! The handler never touches room state directly — everything goes
//! through the [`Controller`].

use std::sync::Arc;

use tokio::sync::mpsc;

use typerace_engine::ParagraphSource;
use typerace_protocol::{ClientEvent, Codec, ConnectionId, ServerEvent};
use typerace_transport::{Connection, WebSocketConnection};

use crate::controller::Controller;
use crate::ServerError;

/// Drop guard that runs the disconnect path when the handler exits —
/// clean close, error, or panic all end up here exactly once. `Drop` is
/// synchronous, so the async cleanup is spawned fire-and-forget.
struct DisconnectGuard<S: ParagraphSource> {
    id: ConnectionId,
    controller: Arc<Controller<S>>,
}

impl<S: ParagraphSource> Drop for DisconnectGuard<S> {
    fn drop(&mut self) {
        let id = self.id;
        let controller = Arc::clone(&self.controller);
        tokio::spawn(async move {
            controller.disconnect(id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S, C>(
    conn: WebSocketConnection,
    controller: Arc<Controller<S>>,
    codec: C,
) -> Result<(), ServerError>
where
    S: ParagraphSource,
    C: Codec + Clone,
{
    let id = conn.id();
    tracing::debug!(%id, "handling new connection");

    // The outbound channel: room actors (and this handler, for errors)
    // push ServerEvents in; the writer task drains them onto the socket.
    let (events, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();

    let writer_conn = conn.clone();
    let writer_codec = codec.clone();
    let writer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let bytes = match writer_codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode outbound event");
                    continue;
                }
            };
            if writer_conn.send(&bytes).await.is_err() {
                break;
            }
        }
    });

    let guard = DisconnectGuard {
        id,
        controller: Arc::clone(&controller),
    };

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%id, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%id, error = %e, "failed to decode client event");
                let _ = events.send(ServerEvent::Error {
                    message: "malformed event".into(),
                });
                continue;
            }
        };

        // Rule violations go back to the sender as an error event;
        // nothing here ends the connection.
        let result = match event {
            ClientEvent::Join { room_id, name } => {
                controller.join(id, events.clone(), &room_id, &name).await
            }
            ClientEvent::Start => controller.start(id).await,
            ClientEvent::Typed { text } => controller.typed(id, text).await,
        };
        if let Err(err) = result {
            let _ = events.send(ServerEvent::Error {
                message: err.to_string(),
            });
        }
    }

    // Run the disconnect path first: the room actor delivers the final
    // player-left/game-ended events and drops its sender. Only then can
    // the writer drain out and exit on channel close.
    drop(guard);
    drop(events);
    let _ = writer.await;
    Ok(())
}
