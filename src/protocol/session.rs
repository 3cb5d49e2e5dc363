//! Session cache: negotiated protocols keyed by client hash.
//!
//! The cache is the only shared mutable state in this layer. One negotiator
//! instance commonly serves many concurrent connections, so entries are
//! stored behind a read/write lock and handed out as `Arc` clones: readers
//! always observe a complete entry, never a partially written one.
//!
//! Lifetime is explicit: the cache lives for the server endpoint, is
//! mutated by the handshake negotiator only, and is emptied on endpoint
//! shutdown or a server protocol upgrade. There is no automatic expiry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::handshake::ProtocolHash;
use crate::schema::ProtocolInfo;

/// A protocol registered through a successful handshake.
#[derive(Debug, Clone)]
pub struct NegotiatedProtocol<S> {
    /// Parsed schema handle for the protocol document.
    pub schema: S,
    /// Message table extracted from the protocol.
    pub protocol: ProtocolInfo<S>,
}

/// Mapping from 16-byte protocol hash to the negotiated protocol.
#[derive(Debug)]
pub struct SessionCache<S> {
    entries: RwLock<HashMap<ProtocolHash, Arc<NegotiatedProtocol<S>>>>,
}

impl<S> Default for SessionCache<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> SessionCache<S> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up the negotiated protocol for a hash.
    pub fn get(&self, hash: &ProtocolHash) -> Option<Arc<NegotiatedProtocol<S>>> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(hash)
            .cloned()
    }

    /// Whether a hash has been negotiated.
    pub fn contains(&self, hash: &ProtocolHash) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(hash)
    }

    /// Register a protocol under a hash, replacing any previous entry.
    ///
    /// At most one protocol is held per hash; insertion overwrites.
    pub fn insert(
        &self,
        hash: ProtocolHash,
        protocol: NegotiatedProtocol<S>,
    ) -> Option<Arc<NegotiatedProtocol<S>>> {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(hash, Arc::new(protocol))
    }

    /// Remove one entry, forcing renegotiation for that hash.
    ///
    /// Returns whether an entry was present.
    pub fn remove(&self, hash: &ProtocolHash) -> bool {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(hash)
            .is_some()
    }

    /// Empty the cache, e.g. on a server protocol upgrade.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Number of negotiated protocols currently held.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
