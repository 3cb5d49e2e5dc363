//! Handshake wire types.
//!
//! Defines the request/response records exchanged before any call is
//! framed, and the 16-byte protocol fingerprint both sides compare.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HandwireError, Result};

/// 16-byte fingerprint of a protocol's schema text.
///
/// Used as the session cache key and as the value compared between client
/// and server during the handshake. This layer does not choose the digest
/// function; callers supply the fingerprint their deployment uses.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtocolHash([u8; 16]);

impl ProtocolHash {
    /// Fingerprint length in bytes.
    pub const LEN: usize = 16;

    /// Wrap an existing 16-byte fingerprint.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw fingerprint bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Copy the fingerprint into a fresh buffer, as carried on the wire.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Compare against raw wire bytes of any length.
    pub fn matches(&self, other: &[u8]) -> bool {
        self.0 == *other
    }
}

impl TryFrom<&[u8]> for ProtocolHash {
    type Error = HandwireError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; 16] = bytes.try_into().map_err(|_| {
            HandwireError::InvalidHandshake(format!(
                "client hash must be exactly {} bytes, got {}",
                Self::LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ProtocolHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ProtocolHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProtocolHash({self})")
    }
}

/// Handshake comparison outcome.
///
/// Declaration order is the wire enum ordering: `NONE` = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HandshakeMatch {
    /// Server has no record of the client's protocol; the client must
    /// resubmit with its protocol text.
    None,
    /// Fully synchronized; the call payload follows immediately.
    Both,
    /// Server knows the client's protocol, but the client's server hash was
    /// stale; the client should adopt the returned protocol and hash.
    Client,
}

/// Handshake request sent by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandshakeRequest {
    /// Fingerprint of the client's protocol. Kept as raw wire bytes so the
    /// 16-byte invariant is enforced by the negotiator, before any cache
    /// lookup.
    #[serde(rename = "clientHash")]
    pub client_hash: Vec<u8>,
    /// The client's protocol text; only present on resubmission.
    #[serde(rename = "clientProtocol", default, skip_serializing_if = "Option::is_none")]
    pub client_protocol: Option<String>,
    /// The hash the client believes identifies the server's protocol.
    #[serde(rename = "serverHash")]
    pub server_hash: Vec<u8>,
}

/// Handshake response returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandshakeResponse {
    /// Match outcome.
    #[serde(rename = "match")]
    pub match_: HandshakeMatch,
    /// Server protocol text; absent when `match` is `BOTH`.
    #[serde(rename = "serverProtocol", default, skip_serializing_if = "Option::is_none")]
    pub server_protocol: Option<String>,
    /// Server protocol hash; absent when `match` is `BOTH`.
    #[serde(rename = "serverHash", default, skip_serializing_if = "Option::is_none")]
    pub server_hash: Option<Vec<u8>>,
    /// Implementation-defined metadata.
    #[serde(default)]
    pub meta: HashMap<String, Vec<u8>>,
}

impl HandshakeResponse {
    /// Build a `BOTH` response: no re-sync needed, optional fields absent.
    pub fn both(meta: HashMap<String, Vec<u8>>) -> Self {
        Self {
            match_: HandshakeMatch::Both,
            server_protocol: None,
            server_hash: None,
            meta,
        }
    }

    /// Build a `CLIENT` response carrying the server's current identity.
    pub fn client(
        server_protocol: &str,
        server_hash: ProtocolHash,
        meta: HashMap<String, Vec<u8>>,
    ) -> Self {
        Self {
            match_: HandshakeMatch::Client,
            server_protocol: Some(server_protocol.to_string()),
            server_hash: Some(server_hash.to_vec()),
            meta,
        }
    }

    /// Build a `NONE` response carrying the server's current identity.
    pub fn none(
        server_protocol: &str,
        server_hash: ProtocolHash,
        meta: HashMap<String, Vec<u8>>,
    ) -> Self {
        Self {
            match_: HandshakeMatch::None,
            server_protocol: Some(server_protocol.to_string()),
            server_hash: Some(server_hash.to_vec()),
            meta,
        }
    }
}
