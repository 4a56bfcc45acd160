//! Unified error type for the server layer.

use typerace_engine::GameError;
use typerace_protocol::ProtocolError;
use typerace_transport::TransportError;

/// Top-level error that wraps the per-crate errors.
///
/// The `#[from]` attributes auto-generate `From` impls so `?` converts
/// lower-layer errors on the way up.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid id).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A game-level error (room rules, state machine).
    #[error(transparent)]
    Game(#[from] GameError),
}
