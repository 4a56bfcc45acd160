//! The controller: translates connection-level requests into room
//! operations and owns the process-wide maps.
//!
//! This is the only layer that sees both the transport side (connection
//! ids, outbound channels) and the engine side (registry, room handles).
//! The registry and connection index live behind one mutex; the lock is
//! held for map operations only and never across a room await, so a slow
//! room cannot stall requests for any other room.

use tokio::sync::Mutex;

use typerace_engine::{
    ConnectionIndex, EventSender, GameConfig, GameError, ParagraphSource, Race,
    RoomHandle, RoomRegistry,
};
use typerace_protocol::{ConnectionId, ProtocolError, RoomId};

/// Attempts to join before giving up when racing room teardowns.
const JOIN_ATTEMPTS: usize = 3;

/// The request-handling layer between connection handlers and rooms.
pub struct Controller<S: ParagraphSource> {
    state: Mutex<ControllerState>,
    config: GameConfig,
    source: S,
}

struct ControllerState {
    registry: RoomRegistry,
    index: ConnectionIndex,
}

impl<S: ParagraphSource> Controller<S> {
    /// Creates a controller with empty maps. `source` is cloned into
    /// every room this controller creates.
    pub fn new(config: GameConfig, source: S) -> Self {
        Self {
            state: Mutex::new(ControllerState {
                registry: RoomRegistry::new(),
                index: ConnectionIndex::new(),
            }),
            config,
            source,
        }
    }

    /// Handles a join request: validate shape, find or create the room,
    /// join it, and only then index the connection.
    ///
    /// A failed join leaves no partial state. A rejected join never
    /// strands an empty room either: the creator's own join is validated
    /// up front, so it can only be rejected when other connections got
    /// into the room first — and a populated room must stay registered.
    pub async fn join(
        &self,
        conn: ConnectionId,
        sender: EventSender,
        room_id: &str,
        name: &str,
    ) -> Result<(), GameError> {
        // Shape checks come first — before any room exists to reject us.
        let room_id = RoomId::parse(room_id).map_err(|e| match e {
            ProtocolError::InvalidRoomId(reason) => GameError::InvalidRoomId(reason),
            other => GameError::InvalidRoomId(other.to_string()),
        })?;
        Race::validate_name(name)?;

        {
            let state = self.state.lock().await;
            if state.index.get(conn).is_some() {
                return Err(GameError::AlreadyInRoom);
            }
        }

        for _ in 0..JOIN_ATTEMPTS {
            let (handle, _is_new) = {
                let mut state = self.state.lock().await;
                state.registry.get_or_create(
                    &room_id,
                    conn,
                    self.config.clone(),
                    self.source.clone(),
                )
            };

            match handle.join(conn, name.to_string(), sender.clone()).await {
                Ok(()) => {
                    let mut state = self.state.lock().await;
                    state.index.set(conn, room_id.clone());
                    return Ok(());
                }
                Err(GameError::RoomClosed) => {
                    // Raced a room that emptied out mid-join. Its registry
                    // entry may still linger; drop it (instance-guarded)
                    // and try again against a fresh room.
                    let mut state = self.state.lock().await;
                    state.registry.remove_if(&room_id, handle.instance());
                }
                Err(err) => return Err(err),
            }
        }

        tracing::warn!(%conn, %room_id, "join gave up after repeated teardown races");
        Err(GameError::JoinFailed)
    }

    /// Starts a round in the sender's current room.
    pub async fn start(&self, conn: ConnectionId) -> Result<(), GameError> {
        let handle = self.room_of(conn).await?;
        handle.start(conn).await
    }

    /// Scores typed text in the sender's current room.
    pub async fn typed(&self, conn: ConnectionId, text: String) -> Result<(), GameError> {
        let handle = self.room_of(conn).await?;
        handle.typed(conn, text).await
    }

    /// Handles a disconnect: removes the index entry, leaves the room,
    /// and tears the room down when it emptied. Safe to call for a
    /// connection that never joined, or twice for the same one.
    pub async fn disconnect(&self, conn: ConnectionId) {
        let entry = {
            let mut state = self.state.lock().await;
            let room_id = state.index.remove(conn);
            room_id.and_then(|room_id| {
                state.registry.get(&room_id).map(|handle| (room_id, handle))
            })
        };
        let Some((room_id, handle)) = entry else {
            return;
        };

        let outcome = handle.leave(conn).await;
        if outcome.empty {
            let mut state = self.state.lock().await;
            state.registry.remove_if(&room_id, handle.instance());
        }
    }

    /// Number of live rooms, for logging and tests.
    pub async fn room_count(&self) -> usize {
        self.state.lock().await.registry.len()
    }

    /// Resolves the room a connection is in via the index.
    async fn room_of(&self, conn: ConnectionId) -> Result<RoomHandle, GameError> {
        let state = self.state.lock().await;
        let room_id = state.index.get(conn).ok_or(GameError::NotInRoom)?;
        state.registry.get(&room_id).ok_or(GameError::NotInRoom)
    }
}

// =========================================================================
// Tests
// =========================================================================
