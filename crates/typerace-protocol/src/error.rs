//! Error types for the protocol layer.

/// Errors that can occur while validating or (de)serializing wire data.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    /// Common causes: malformed JSON, missing fields, an unknown tag.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A room id failed the `[A-Za-z0-9_-]{1,50}` rule.
    #[error("invalid room id: {0}")]
    InvalidRoomId(String),
}
