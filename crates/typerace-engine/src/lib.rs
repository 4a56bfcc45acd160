//! Room lifecycle and race engine for the typerace server.
//!
//! Each room runs as an isolated Tokio task (actor model) owning a pure
//! [`Race`] state machine — players, host authority, round status,
//! scoring, and the 60-second round deadline.
//!
//! # Key types
//!
//! - [`Race`] — one room's authoritative state machine
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomRegistry`] / [`ConnectionIndex`] — the process-wide maps
//! - [`ParagraphSource`] — where the text to type comes from
//! - [`GameConfig`] — race rules (player cap, round duration, name policy)

mod config;
mod error;
mod race;
mod registry;
mod room;
mod score;
mod text;

pub use config::GameConfig;
pub use error::GameError;
pub use race::{Departure, MAX_NAME_LEN, Player, Race, RaceStatus, ScoreUpdate};
pub use registry::{ConnectionIndex, RoomRegistry};
pub use room::{EventSender, LeaveOutcome, RoomHandle};
pub use score::{char_precision, word_score};
pub use text::{FixedParagraph, LoremParagraphs, ParagraphSource, lorem_paragraph};
