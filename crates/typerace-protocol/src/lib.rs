//! Wire protocol for the typerace server.
//!
//! This crate defines the "language" clients and the server speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`PlayerSnapshot`],
//!   [`ConnectionId`], [`RoomId`]) — the structures that travel on the
//!   wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those structures
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong doing it.
//!
//! The protocol layer sits between transport (raw bytes) and the engine
//! (room state). It doesn't know about connections or rooms — only about
//! shapes.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ClientEvent, ConnectionId, PlayerSnapshot, RoomId, ServerEvent};
