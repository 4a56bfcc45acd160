//! Error types for the game engine.
//!
//! Every variant is recoverable: the controller reports it to the
//! requesting connection as an `error` event and nothing else changes.
//! The variants fall into five classes — validation (`BlankName`,
//! `NameTooLong`, `NameTaken`, `InvalidRoomId`), capacity (`RoomFull`),
//! state (`AlreadyStarted`, `NotStarted`), authorization (`NotHost`),
//! membership (`NotInRoom`, `AlreadyInRoom`) — plus the two
//! transport-level join failures (`RoomClosed`, `JoinFailed`).

/// Errors that can occur during room and race operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The room id failed the `[A-Za-z0-9_-]{1,50}` rule.
    #[error("invalid room id: {0}")]
    InvalidRoomId(String),

    /// The nickname was empty or whitespace-only.
    #[error("please provide a nickname")]
    BlankName,

    /// The nickname exceeded the length limit.
    #[error("name exceeds {0} characters")]
    NameTooLong(usize),

    /// The nickname is already in use in this room (only when the
    /// unique-names policy is enabled).
    #[error("the name \"{0}\" is already taken in this room")]
    NameTaken(String),

    /// The room has no free player slots.
    #[error("room is full")]
    RoomFull,

    /// The round is already running (or over) — too late to join or start.
    #[error("the game has already started")]
    AlreadyStarted,

    /// No round is running.
    #[error("the game has not started yet")]
    NotStarted,

    /// Only the host may start a round.
    #[error("you are not the host of the game; only the host can start it")]
    NotHost,

    /// The connection is not a member of any room (or not of this one).
    #[error("not in a game")]
    NotInRoom,

    /// The connection is already a member of a room.
    #[error("already in a room")]
    AlreadyInRoom,

    /// The room's actor went away mid-operation (being torn down).
    #[error("room is no longer available")]
    RoomClosed,

    /// Joining failed for transport-level reasons after retries; no
    /// partial state was left behind.
    #[error("failed to join room")]
    JoinFailed,
}
