//! Room actor: an isolated Tokio task that owns one race.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. All mutation of a room's state flows through
//! that one task, which is what serializes concurrent joins, keystrokes,
//! departures, and the round timeout against each other — and rooms being
//! separate tasks is what lets different rooms proceed fully in parallel.
//!
//! The round timer is not a separate task: it is a `select!` branch on
//! the armed deadline. Cancellation is clearing the deadline, and a
//! timeout racing a natural completion is impossible — both run here.

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use typerace_protocol::{ConnectionId, RoomId, ServerEvent};

use crate::text::ParagraphSource;
use crate::{GameConfig, GameError, Race};

/// Channel sender for delivering outbound events to one member's
/// connection handler.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel. Variants carrying a
/// `oneshot::Sender` are request/response; the caller awaits the reply.
pub(crate) enum RoomCommand {
    /// Add a player and register their outbound channel.
    Join {
        id: ConnectionId,
        name: String,
        sender: EventSender,
        reply: oneshot::Sender<Result<(), GameError>>,
    },

    /// Start a round (host only).
    Start {
        id: ConnectionId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },

    /// Score the sender's typed text.
    Typed {
        id: ConnectionId,
        text: String,
        reply: oneshot::Sender<Result<(), GameError>>,
    },

    /// Remove a player (disconnect).
    Leave {
        id: ConnectionId,
        reply: oneshot::Sender<LeaveOutcome>,
    },
}

/// What a leave observed, for the controller's teardown decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeaveOutcome {
    /// The connection actually was a member and has been removed.
    pub removed: bool,
    /// The room is now empty; its registry entry must go.
    pub empty: bool,
}

/// Handle to a running room actor. Cheap to clone — an `mpsc::Sender`
/// plus identity.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    instance: u64,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// The room's id.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// The actor instance number. Registry teardown is guarded on this,
    /// so a stale teardown can't remove a successor room that reused the
    /// same room id.
    pub fn instance(&self) -> u64 {
        self.instance
    }

    /// Sends a join request to the room.
    ///
    /// # Errors
    /// Any rejection from the race rules, or [`GameError::RoomClosed`]
    /// when the actor is already gone (room being torn down).
    pub async fn join(
        &self,
        id: ConnectionId,
        name: String,
        sender: EventSender,
    ) -> Result<(), GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                id,
                name,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| GameError::RoomClosed)?;
        reply_rx.await.map_err(|_| GameError::RoomClosed)?
    }

    /// Asks the room to start a round on behalf of `id`.
    pub async fn start(&self, id: ConnectionId) -> Result<(), GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Start { id, reply: reply_tx })
            .await
            .map_err(|_| GameError::RoomClosed)?;
        reply_rx.await.map_err(|_| GameError::RoomClosed)?
    }

    /// Delivers typed text from `id` for scoring.
    pub async fn typed(
        &self,
        id: ConnectionId,
        text: String,
    ) -> Result<(), GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Typed {
                id,
                text,
                reply: reply_tx,
            })
            .await
            .map_err(|_| GameError::RoomClosed)?;
        reply_rx.await.map_err(|_| GameError::RoomClosed)?
    }

    /// Removes a player. Safe to call for a connection that already left
    /// or a room that already died — both come back as a no-op outcome.
    pub async fn leave(&self, id: ConnectionId) -> LeaveOutcome {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .sender
            .send(RoomCommand::Leave { id, reply: reply_tx })
            .await
            .is_err()
        {
            return LeaveOutcome::default();
        }
        reply_rx.await.unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor<S> {
    race: Race,
    /// Per-member outbound channels, keyed like the player map.
    senders: std::collections::BTreeMap<ConnectionId, EventSender>,
    /// Armed while a round is running; cleared on any exit from it.
    deadline: Option<Instant>,
    source: S,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Whether `game-created` has been announced for this room.
    announced: bool,
}

impl<S: ParagraphSource> RoomActor<S> {
    /// Runs the actor loop until the room empties or all handles drop.
    async fn run(mut self) {
        tracing::info!(room_id = %self.race.room_id(), "room opened");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if self.handle(cmd).await {
                        break;
                    }
                }
                _ = Self::sleep_until(self.deadline), if self.deadline.is_some() => {
                    self.handle_timeout();
                }
            }
        }

        tracing::info!(room_id = %self.race.room_id(), "room closed");
    }

    /// Pends forever when no deadline is armed; the `select!` guard keeps
    /// the branch disabled in that case anyway.
    async fn sleep_until(deadline: Option<Instant>) {
        match deadline {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending::<()>().await,
        }
    }

    /// Processes one command. Returns `true` when the room emptied and
    /// the actor must stop.
    async fn handle(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join {
                id,
                name,
                sender,
                reply,
            } => {
                let result = self.handle_join(id, &name, sender);
                let _ = reply.send(result);
                false
            }
            RoomCommand::Start { id, reply } => {
                let result = self.handle_start(id).await;
                let _ = reply.send(result);
                false
            }
            RoomCommand::Typed { id, text, reply } => {
                let result = self.handle_typed(id, &text);
                let _ = reply.send(result);
                false
            }
            RoomCommand::Leave { id, reply } => {
                let outcome = self.handle_leave(id);
                let _ = reply.send(outcome);
                outcome.empty
            }
        }
    }

    fn handle_join(
        &mut self,
        id: ConnectionId,
        name: &str,
        sender: EventSender,
    ) -> Result<(), GameError> {
        let player = self.race.add_player(id, name)?.snapshot();
        self.senders.insert(id, sender);

        self.broadcast(ServerEvent::PlayerJoined {
            id: player.id,
            name: player.name,
            score: player.score,
            precision: player.precision,
        });
        self.send_to(id, ServerEvent::Players {
            players: self.race.snapshot(),
        });
        self.send_to(id, ServerEvent::NewHost {
            id: self.race.host(),
        });

        if !self.announced {
            self.announced = true;
            self.broadcast(ServerEvent::GameCreated {
                room_id: self.race.room_id().clone(),
            });
        }

        Ok(())
    }

    async fn handle_start(&mut self, id: ConnectionId) -> Result<(), GameError> {
        self.race.authorize_start(id)?;

        // The fetch is awaited inside the actor: the whole StartGame is
        // one serialized operation, so no keystroke can slip in between
        // the status flip and the words being set.
        let paragraph = self.source.fetch().await;
        self.race.begin_round(paragraph)?;

        self.broadcast(ServerEvent::Players {
            players: self.race.snapshot(),
        });
        self.broadcast(ServerEvent::GameStarted {
            paragraph: self.race.paragraph().to_string(),
        });
        self.deadline = Some(Instant::now() + self.race.config().round_duration);
        Ok(())
    }

    fn handle_typed(&mut self, id: ConnectionId, text: &str) -> Result<(), GameError> {
        let update = self.race.apply_typed(id, text)?;

        self.broadcast(ServerEvent::PlayerScore {
            id,
            score: update.score,
            precision: update.precision,
        });

        if update.finished {
            self.deadline = None;
            self.finish_round();
        }
        Ok(())
    }

    fn handle_timeout(&mut self) {
        self.deadline = None;
        // The status may have left InProgress since the deadline was
        // armed; expire_round() checks and makes the late fire a no-op.
        if self.race.expire_round() {
            self.finish_round();
        }
    }

    fn handle_leave(&mut self, id: ConnectionId) -> LeaveOutcome {
        let Some(departure) = self.race.remove_player(id) else {
            return LeaveOutcome::default();
        };

        // Keep the departing sender aside: it is the delivery path for
        // `game-ended` when this was the last member.
        let leaver = self.senders.remove(&id);

        self.broadcast(ServerEvent::PlayerLeft { id });
        if let Some(host) = departure.new_host {
            self.broadcast(ServerEvent::NewHost { id: host });
        }

        if departure.empty {
            self.deadline = None;
            if let Some(sender) = leaver {
                let _ = sender.send(ServerEvent::GameEnded {
                    room_id: self.race.room_id().clone(),
                });
            }
        }

        LeaveOutcome {
            removed: true,
            empty: departure.empty,
        }
    }

    /// Finish announcement: `game-finished`, then the final snapshot.
    fn finish_round(&self) {
        self.broadcast(ServerEvent::GameFinished);
        self.broadcast(ServerEvent::Players {
            players: self.race.snapshot(),
        });
    }

    /// Sends an event to every member. Closed receivers (a handler that
    /// already died) are silently skipped.
    fn broadcast(&self, event: ServerEvent) {
        for sender in self.senders.values() {
            let _ = sender.send(event.clone());
        }
    }

    /// Sends an event to a single member.
    fn send_to(&self, id: ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&id) {
            let _ = sender.send(event);
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
pub(crate) fn spawn_room<S: ParagraphSource>(
    room_id: RoomId,
    creator: ConnectionId,
    instance: u64,
    config: GameConfig,
    source: S,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_SIZE);

    let actor = RoomActor {
        race: Race::new(room_id.clone(), creator, config),
        senders: std::collections::BTreeMap::new(),
        deadline: None,
        source,
        receiver: rx,
        announced: false,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        instance,
        sender: tx,
    }
}
