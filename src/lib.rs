//! # Handwire
//!
//! Negotiation and framing layer for a schema-driven RPC protocol: two
//! endpoints agree on a shared protocol definition through a handshake,
//! after which call responses are framed as a metadata map, an error flag,
//! and a schema-encoded payload.
//!
//! ## Architecture
//!
//! ```text
//! raw bytes ──> HandshakeNegotiator ──> match decision ──> response bytes
//!                      │    (via SchemaEngine)
//!                      v
//!                SessionCache  <── read ── MessageFramer ──> call frames
//! ```
//!
//! - [`HandshakeNegotiator`] decides the match status for an incoming
//!   handshake and registers client protocols.
//! - [`SessionCache`] maps 16-byte protocol hashes to negotiated protocols;
//!   the one piece of shared mutable state, safe under concurrent access.
//! - [`MessageFramer`] writes and reads `[metadata][errorFlag][payload]`
//!   frames against a negotiated protocol.
//! - [`schema::SchemaEngine`] is the seam to the value encoding;
//!   [`JsonEngine`] is the built-in implementation.
//! - [`codec`] holds named compression strategies, orthogonal to framing.
//!
//! All operations are synchronous and never suspend; connection lifetime
//! and timeouts belong to the transport caller.
//!
//! ## Match statuses
//!
//! | Status   | Meaning                                                    |
//! |----------|------------------------------------------------------------|
//! | `BOTH`   | Fully synchronized; call data follows immediately          |
//! | `CLIENT` | Client protocol known, client's server hash was stale      |
//! | `NONE`   | Server has no record of the client's protocol; resubmit    |
//!
//! `NONE` and `CLIENT` are recovery signals, not errors.
//!
//! ## Example
//!
//! ```
//! use handwire::schema::{wire, SchemaEngine};
//! use handwire::{
//!     FrameMeta, HandshakeMatch, HandshakeNegotiator, HandshakeRequest, HandshakeResponse,
//!     JsonEngine, MessageFramer, ProtocolHash,
//! };
//!
//! let protocol = r#"{
//!     "protocol": "Echo",
//!     "messages": {
//!         "echo": {"request": [{"name": "payload", "type": "string"}], "response": "string"}
//!     }
//! }"#;
//!
//! let engine = JsonEngine::new();
//! let server_hash = ProtocolHash::new([7; 16]);
//! let negotiator = HandshakeNegotiator::new(engine, server_hash, protocol)?;
//!
//! // Client resubmits with its protocol text after an initial NONE.
//! let request = HandshakeRequest {
//!     client_hash: vec![1; 16],
//!     client_protocol: Some(protocol.to_string()),
//!     server_hash: server_hash.to_vec(),
//! };
//! let request_schema = engine.parse_schema(wire::HANDSHAKE_REQUEST_SCHEMA)?;
//! let response_bytes = negotiator.resolve_handshake(&engine.encode(&request, &request_schema)?)?;
//!
//! let response_schema = engine.parse_schema(wire::HANDSHAKE_RESPONSE_SCHEMA)?;
//! let response: HandshakeResponse = engine.decode(&response_bytes, &response_schema)?;
//! assert_eq!(response.match_, HandshakeMatch::Both);
//!
//! // Frame a call response against the negotiated session.
//! let framer = MessageFramer::new(engine, negotiator.cache())?;
//! let session = ProtocolHash::try_from(&request.client_hash[..])?;
//! let frame = framer.write_response(&session, "echo", &"hello")?;
//!
//! let (_, error_flag, values): (FrameMeta, bool, Vec<String>) =
//!     framer.read_response(&session, "echo", &frame)?;
//! assert!(!error_flag);
//! assert_eq!(values, vec!["hello".to_string()]);
//! # Ok::<(), handwire::HandwireError>(())
//! ```

pub mod codec;
pub mod error;
pub mod protocol;
pub mod schema;

pub use error::{HandwireError, Result};
pub use protocol::{
    FrameMeta, HandshakeMatch, HandshakeNegotiator, HandshakeRequest, HandshakeResponse,
    MessageFramer, NegotiatedProtocol, ProtocolHash, SessionCache,
};
pub use schema::{JsonEngine, SchemaEngine};
