//! Core wire types: identifiers, player snapshots, and the event enums.
//!
//! Everything in this module travels on the wire as JSON. Events are
//! internally tagged (`"type"`) with kebab-case tags and camelCase fields,
//! so a join looks like `{ "type": "join", "roomId": "lobby", "name": "ada" }`.
//! The exact shapes are pinned by the tests at the bottom of this file —
//! a drift here breaks every client.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque identifier for a connection, assigned by the transport at accept
/// time. This is the only identity a player has — there is no account or
/// auth layer behind it.
///
/// `#[serde(transparent)]` makes `ConnectionId(42)` serialize as plain `42`.
/// `Ord` matters: the engine keys its player map by `ConnectionId` and the
/// host-transfer rule picks the smallest remaining key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A user-chosen room identifier: 1–50 characters from `[A-Za-z0-9_-]`.
///
/// The constructor is the validation — a `RoomId` that exists is a valid
/// one, including when it arrives through serde (`try_from = "String"`
/// runs the same check on deserialization).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// Maximum length of a room id in characters.
    pub const MAX_LEN: usize = 50;

    /// Validates and wraps a room id string.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidRoomId`] when the string is empty,
    /// longer than [`Self::MAX_LEN`], or contains a character outside
    /// `[A-Za-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, ProtocolError> {
        if s.is_empty() {
            return Err(ProtocolError::InvalidRoomId(
                "room id must not be empty".into(),
            ));
        }
        if s.chars().count() > Self::MAX_LEN {
            return Err(ProtocolError::InvalidRoomId(format!(
                "room id exceeds {} characters",
                Self::MAX_LEN
            )));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ProtocolError::InvalidRoomId(
                "room id may only contain letters, digits, '_' and '-'".into(),
            ));
        }
        Ok(Self(s.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoomId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RoomId {
    type Error = ProtocolError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> String {
        id.0
    }
}

// ---------------------------------------------------------------------------
// Player snapshot
// ---------------------------------------------------------------------------

/// One player's public state, as carried by `players` snapshots and the
/// `player-joined` broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    /// The player's connection id.
    pub id: ConnectionId,
    /// Display name chosen at join time.
    pub name: String,
    /// Contiguously correct word count for the current round.
    pub score: usize,
    /// Character precision 0–100 over the text typed so far.
    pub precision: f64,
}

// ---------------------------------------------------------------------------
// Inbound events (client → server)
// ---------------------------------------------------------------------------

/// Everything a client can send. Disconnects are implicit — the socket
/// closing is the fourth "event".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Join (or create) the named room under the given nickname.
    ///
    /// `room_id` stays a raw `String` here: validation is the server's
    /// job, and a malformed id must produce an `error` event rather than
    /// a decode failure.
    Join { room_id: String, name: String },

    /// Host-only: start a round in the sender's current room.
    Start,

    /// The sender's full typed text so far (not a delta).
    Typed { text: String },
}

// ---------------------------------------------------------------------------
// Outbound events (server → client)
// ---------------------------------------------------------------------------

/// Everything the server can emit, one variant per outbound event.
///
/// Which connections receive a given variant (caller-only vs. room
/// broadcast) is the room actor's decision; the type itself is shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Caller-only: the request was rejected. `message` is human-readable.
    Error { message: String },

    /// Room broadcast: a player entered the room.
    PlayerJoined {
        id: ConnectionId,
        name: String,
        score: usize,
        precision: f64,
    },

    /// Snapshot of every player in the room. Sent to the joiner on join,
    /// broadcast on round start/finish.
    Players { players: Vec<PlayerSnapshot> },

    /// The current host — to the joiner on join, to the room on transfer.
    NewHost { id: ConnectionId },

    /// Room broadcast, once per fresh room.
    GameCreated { room_id: RoomId },

    /// Room broadcast: a player left the room.
    PlayerLeft { id: ConnectionId },

    /// Room broadcast: a round began; this is the text to type.
    GameStarted { paragraph: String },

    /// Room broadcast: a player's live score changed.
    PlayerScore {
        id: ConnectionId,
        score: usize,
        precision: f64,
    },

    /// Room broadcast: the round is over (completion or timeout).
    /// Always followed by a `players` snapshot.
    GameFinished,

    /// Room broadcast, once, when the last member leaves.
    GameEnded { room_id: RoomId },
}

// =========================================================================
// Tests
// =========================================================================
