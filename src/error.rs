//! Handwire error types.
//!
//! Every fallible operation in this crate returns [`Result`]. Handshake and
//! framing failures are surfaced as distinct variants so transport callers
//! can tell a malformed exchange (close the connection) from a framing
//! mistake (reject the single call).
//!
//! A `NONE` or `CLIENT` handshake match is *not* an error: it is the
//! protocol's own recovery signal, telling the client to resubmit with its
//! protocol text. Only a malformed request produces [`InvalidHandshake`].
//!
//! [`InvalidHandshake`]: HandwireError::InvalidHandshake

use thiserror::Error;

use crate::protocol::ProtocolHash;

/// Handwire protocol errors.
#[derive(Error, Debug)]
pub enum HandwireError {
    /// Handshake request is malformed (client hash is not exactly 16 bytes).
    ///
    /// Fatal to the current request: no response bytes are produced and the
    /// transport caller should close or reset the exchange.
    #[error("invalid handshake: {0}")]
    InvalidHandshake(String),

    /// Framing referenced a session key with no negotiated protocol.
    #[error("no negotiated protocol for session {0}")]
    SessionNotFound(ProtocolHash),

    /// Named message is not declared by the negotiated protocol.
    #[error("message not found: {0}")]
    MessageNotFound(String),

    /// Message exists but lacks the schema the operation needs.
    #[error("schema missing: {0}")]
    SchemaMissing(String),

    /// Error index is outside the message's declared error union.
    ///
    /// Surfaced before any frame bytes are emitted.
    #[error("error id {error_id} out of range (message declares {error_count} errors)")]
    ErrorIdOutOfRange {
        /// The index the caller asked for.
        error_id: usize,
        /// Number of error schemas the message declares.
        error_count: usize,
    },

    /// Schema or protocol text rejected by the schema engine.
    #[error("schema parse error: {0}")]
    SchemaParse(String),

    /// Schema engine failed to encode a value.
    #[error("encode error: {0}")]
    Encode(String),

    /// Schema engine failed to decode a buffer (truncated, type mismatch).
    #[error("decode error: {0}")]
    Decode(String),

    /// Compression operation failed inside a codec.
    #[error("compression error: {0}")]
    Compression(String),

    /// Decompression failed on corrupt or incompatible input.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// No codec registered under the requested name.
    #[error("unknown codec: {0}")]
    UnknownCodec(String),
}

/// Result type alias for handwire operations.
pub type Result<T> = std::result::Result<T, HandwireError>;
