//! The race state machine: one room's authoritative state.
//!
//! `Race` is pure, synchronous state — no channels, no timers, no I/O.
//! The room actor owns exactly one and calls into it; that ownership is
//! what makes every multi-step invariant here (capacity check + insert,
//! status check + transition) atomic as a unit. Keeping the machine pure
//! also means the whole ruleset unit-tests without a runtime.

use std::collections::BTreeMap;

use typerace_protocol::{ConnectionId, PlayerSnapshot, RoomId};

use crate::score::{char_precision, word_score};
use crate::{GameConfig, GameError};

/// Maximum length of a player nickname in characters.
pub const MAX_NAME_LEN: usize = 50;

// ---------------------------------------------------------------------------
// RaceStatus
// ---------------------------------------------------------------------------

/// The lifecycle of a round. Transitions are one-way:
///
/// ```text
/// NotStarted → InProgress → Finished
/// ```
///
/// There is no way back: a finished room stays finished until its last
/// member leaves and the room is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceStatus {
    NotStarted,
    InProgress,
    Finished,
}

impl RaceStatus {
    /// Returns `true` if the room is still accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// Returns `true` if a round is actively running.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::InProgress)
    }
}

impl std::fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NotStarted"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Per-room participant state. Owned exclusively by its [`Race`]; only
/// [`Race::apply_typed`] mutates the score fields.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: ConnectionId,
    pub name: String,
    pub score: usize,
    pub precision: f64,
}

impl Player {
    fn new(id: ConnectionId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            score: 0,
            precision: 0.0,
        }
    }

    /// The player's public wire representation.
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            name: self.name.clone(),
            score: self.score,
            precision: self.precision,
        }
    }
}

// ---------------------------------------------------------------------------
// Operation results
// ---------------------------------------------------------------------------

/// What [`Race::remove_player`] observed.
#[derive(Debug, Clone)]
pub struct Departure {
    /// The removed player.
    pub player: Player,
    /// Set when the departing player was host and members remain: the
    /// id host authority transferred to.
    pub new_host: Option<ConnectionId>,
    /// The player set is now empty — the race must be destroyed.
    pub empty: bool,
}

/// What [`Race::apply_typed`] computed.
#[derive(Debug, Clone, Copy)]
pub struct ScoreUpdate {
    pub score: usize,
    pub precision: f64,
    /// The sender typed the whole paragraph; the race just finished.
    pub finished: bool,
}

// ---------------------------------------------------------------------------
// Race
// ---------------------------------------------------------------------------

/// One room's players, host authority, round status, and paragraph.
#[derive(Debug)]
pub struct Race {
    room_id: RoomId,
    /// Always a key of `players` while the room is non-empty. The creator
    /// connection, until a departure transfers it.
    host: ConnectionId,
    status: RaceStatus,
    paragraph: String,
    words: Vec<String>,
    players: BTreeMap<ConnectionId, Player>,
    config: GameConfig,
}

impl Race {
    /// Creates an empty race. `creator` — the connection whose join
    /// attempt caused this room to be built — is the host.
    pub fn new(room_id: RoomId, creator: ConnectionId, config: GameConfig) -> Self {
        Self {
            room_id,
            host: creator,
            status: RaceStatus::NotStarted,
            paragraph: String::new(),
            words: Vec::new(),
            players: BTreeMap::new(),
            config,
        }
    }

    /// Validates a nickname's shape: non-blank, at most
    /// [`MAX_NAME_LEN`] characters.
    pub fn validate_name(name: &str) -> Result<(), GameError> {
        if name.trim().is_empty() {
            return Err(GameError::BlankName);
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(GameError::NameTooLong(MAX_NAME_LEN));
        }
        Ok(())
    }

    /// Adds a player. Rejected — with no mutation — when the name is
    /// malformed, the round has started, the room is full, the connection
    /// is already a member, or (policy) the name is taken.
    pub fn add_player(
        &mut self,
        id: ConnectionId,
        name: &str,
    ) -> Result<&Player, GameError> {
        Self::validate_name(name)?;
        if !self.status.is_joinable() {
            return Err(GameError::AlreadyStarted);
        }
        if self.players.contains_key(&id) {
            return Err(GameError::AlreadyInRoom);
        }
        if self.players.len() >= self.config.max_players {
            return Err(GameError::RoomFull);
        }
        if self.config.unique_names
            && self.players.values().any(|p| p.name == name)
        {
            return Err(GameError::NameTaken(name.to_string()));
        }

        self.players.insert(id, Player::new(id, name));
        tracing::info!(
            room_id = %self.room_id,
            %id,
            players = self.players.len(),
            "player joined"
        );
        Ok(&self.players[&id])
    }

    /// Removes a player. Always permitted, in any status; returns `None`
    /// if the connection was not a member (idempotent).
    ///
    /// When the host leaves and members remain, authority transfers to
    /// the first remaining member in key order — deterministic, so every
    /// observer agrees on the new host.
    pub fn remove_player(&mut self, id: ConnectionId) -> Option<Departure> {
        let player = self.players.remove(&id)?;

        let empty = self.players.is_empty();
        let mut new_host = None;
        if self.host == id && !empty {
            let next = *self.players.keys().next().expect("non-empty");
            self.host = next;
            new_host = Some(next);
        }

        tracing::info!(
            room_id = %self.room_id,
            %id,
            players = self.players.len(),
            "player left"
        );

        Some(Departure {
            player,
            new_host,
            empty,
        })
    }

    /// Checks the start preconditions for `id`: member, round not yet
    /// started, host. No state change.
    pub fn authorize_start(&self, id: ConnectionId) -> Result<(), GameError> {
        if !self.players.contains_key(&id) {
            return Err(GameError::NotInRoom);
        }
        if self.status != RaceStatus::NotStarted {
            return Err(GameError::AlreadyStarted);
        }
        if self.host != id {
            return Err(GameError::NotHost);
        }
        Ok(())
    }

    /// Starts the round: resets every player's score and precision,
    /// stores the paragraph and its word split, and moves to InProgress.
    ///
    /// Re-validates the status so a second start racing the first (the
    /// paragraph fetch happens between authorize and begin) loses cleanly.
    pub fn begin_round(&mut self, paragraph: String) -> Result<(), GameError> {
        if self.status != RaceStatus::NotStarted {
            return Err(GameError::AlreadyStarted);
        }
        for player in self.players.values_mut() {
            player.score = 0;
            player.precision = 0.0;
        }
        self.words = paragraph.split_whitespace().map(str::to_string).collect();
        self.paragraph = paragraph;
        self.status = RaceStatus::InProgress;
        tracing::info!(
            room_id = %self.room_id,
            words = self.words.len(),
            "round started"
        );
        Ok(())
    }

    /// Scores the sender's full typed text and stores it on their player.
    ///
    /// On completion — every word correct and at least the paragraph's
    /// length typed — the race moves to Finished and the caller must
    /// cancel the round timer and announce the finish.
    pub fn apply_typed(
        &mut self,
        id: ConnectionId,
        typed: &str,
    ) -> Result<ScoreUpdate, GameError> {
        if !self.status.is_running() {
            return Err(GameError::NotStarted);
        }

        let score = word_score(&self.words, typed);
        let precision = char_precision(&self.paragraph, typed);
        let finished = score == self.words.len()
            && typed.trim_end().chars().count() >= self.paragraph.chars().count();

        let player = self.players.get_mut(&id).ok_or(GameError::NotInRoom)?;
        player.score = score;
        player.precision = precision;

        if finished {
            self.status = RaceStatus::Finished;
            tracing::info!(room_id = %self.room_id, winner = %id, "round completed");
        }

        Ok(ScoreUpdate {
            score,
            precision,
            finished,
        })
    }

    /// The timeout path: finishes the round if it is still running.
    ///
    /// Returns `false` — and changes nothing — when the round already
    /// finished (or never started), so a late timer is a silent no-op.
    pub fn expire_round(&mut self) -> bool {
        if self.status.is_running() {
            self.status = RaceStatus::Finished;
            tracing::info!(room_id = %self.room_id, "round timed out");
            true
        } else {
            false
        }
    }

    /// Snapshot of every player, in key order.
    pub fn snapshot(&self) -> Vec<PlayerSnapshot> {
        self.players.values().map(Player::snapshot).collect()
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn host(&self) -> ConnectionId {
        self.host
    }

    pub fn status(&self) -> RaceStatus {
        self.status
    }

    pub fn paragraph(&self) -> &str {
        &self.paragraph
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.players.contains_key(&id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
