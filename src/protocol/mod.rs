//! Protocol negotiation and call-response framing.
//!
//! Implements the handshake by which two endpoints agree on a shared
//! protocol definition, and the framing of call responses once a protocol
//! is negotiated.
//!
//! # Handshake flow
//!
//! ```text
//! Client                                  Server
//!    |                                       |
//!    |-- HandshakeRequest(clientHash,        |
//!    |        serverHash) ------------------>|  hash unknown
//!    |<-- match=NONE, serverProtocol,        |
//!    |        serverHash --------------------|
//!    |                                       |
//!    |-- HandshakeRequest(clientHash,        |
//!    |        clientProtocol, serverHash) -->|  protocol registered
//!    |<-- match=BOTH ------------------------|
//!    |                                       |
//!    |== call frames =======================>|
//! ```
//!
//! # Per-hash state machine
//!
//! | State      | Transition                              | Next       |
//! |------------|-----------------------------------------|------------|
//! | Unknown    | resubmission with protocol text         | Negotiated |
//! | Negotiated | repeat handshake (`BOTH` or `CLIENT`)   | Negotiated |
//! | Negotiated | `invalidate` / `clear_all`              | Unknown    |
//!
//! There is no terminal state: the cache is a live table, not a session
//! object with a close event.

mod framer;
mod handshake;
mod negotiator;
mod session;

pub use framer::{FrameMeta, MessageFramer};
pub use handshake::{HandshakeMatch, HandshakeRequest, HandshakeResponse, ProtocolHash};
pub use negotiator::HandshakeNegotiator;
pub use session::{NegotiatedProtocol, SessionCache};
