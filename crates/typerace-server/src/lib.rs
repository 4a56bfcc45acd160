//! # typerace-server
//!
//! Multiplayer typing-race server. Players join a named room over
//! WebSocket, the host starts a round, everyone races to type the same
//! paragraph, and the server scores each keystroke update live until the
//! round completes or its 60-second timer fires.
//!
//! The layers underneath:
//!
//! - `typerace-protocol` — the wire events and codec
//! - `typerace-transport` — the WebSocket listener
//! - `typerace-engine` — the race state machine, room actors, registries
//!
//! This crate contributes the [`Controller`] (request → room operation
//! translation), the per-connection handler, the [`HttpParagraphs`]
//! fetcher, and the [`TypeRaceServer`] builder + accept loop.

mod controller;
mod error;
mod fetch;
mod handler;
mod server;

pub use controller::Controller;
pub use error::ServerError;
pub use fetch::HttpParagraphs;
pub use server::{TypeRaceServer, TypeRaceServerBuilder};
