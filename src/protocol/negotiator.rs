//! Handshake negotiator.
//!
//! Decides the match status for an incoming handshake request and keeps the
//! session cache current. The decision paths, evaluated in order:
//!
//! | # | Condition                                            | Match    | Cache      |
//! |---|------------------------------------------------------|----------|------------|
//! | 1 | known client hash, stale server hash                 | `CLIENT` | unchanged  |
//! | 2 | known client hash, matching server hash              | `BOTH`   | unchanged  |
//! | 3 | unknown hash, protocol supplied, matching server hash| `BOTH`   | registered |
//! | 4 | anything else                                        | `NONE`   | unchanged  |
//!
//! A request whose client hash is not exactly 16 bytes is rejected before
//! any cache lookup and produces no response bytes.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::handshake::{HandshakeRequest, HandshakeResponse, ProtocolHash};
use super::session::{NegotiatedProtocol, SessionCache};
use crate::error::Result;
use crate::schema::{wire, SchemaEngine};

/// Server-side handshake endpoint.
///
/// Holds the server's protocol identity and a shared [`SessionCache`]. The
/// negotiator is the only writer of the cache; framers share it read-only
/// through [`cache`](Self::cache).
pub struct HandshakeNegotiator<E: SchemaEngine> {
    engine: E,
    cache: Arc<SessionCache<E::Schema>>,
    server_hash: ProtocolHash,
    server_protocol: String,
    request_schema: E::Schema,
    response_schema: E::Schema,
    meta: HashMap<String, Vec<u8>>,
}

impl<E: SchemaEngine> HandshakeNegotiator<E> {
    /// Create a negotiator for a server identified by `server_hash` and
    /// speaking `server_protocol`.
    ///
    /// The protocol text is validated through the engine up front so a
    /// misconfigured endpoint fails at construction, not mid-handshake.
    pub fn new(engine: E, server_hash: ProtocolHash, server_protocol: &str) -> Result<Self> {
        let schema = engine.parse_schema(server_protocol)?;
        engine.protocol_of(&schema)?;

        let request_schema = engine.parse_schema(wire::HANDSHAKE_REQUEST_SCHEMA)?;
        let response_schema = engine.parse_schema(wire::HANDSHAKE_RESPONSE_SCHEMA)?;

        Ok(Self {
            engine,
            cache: Arc::new(SessionCache::new()),
            server_hash,
            server_protocol: server_protocol.to_string(),
            request_schema,
            response_schema,
            meta: HashMap::new(),
        })
    }

    /// Attach metadata to every handshake response.
    pub fn with_meta(mut self, meta: HashMap<String, Vec<u8>>) -> Self {
        self.meta = meta;
        self
    }

    /// Handle to the shared session cache, for framers serving the same
    /// endpoint.
    pub fn cache(&self) -> Arc<SessionCache<E::Schema>> {
        Arc::clone(&self.cache)
    }

    /// The server's protocol hash.
    pub fn server_hash(&self) -> ProtocolHash {
        self.server_hash
    }

    /// Resolve a handshake request into response bytes.
    ///
    /// Fails with [`HandwireError::InvalidHandshake`] when the decoded
    /// client hash is not exactly 16 bytes; schema engine decode failures
    /// propagate unchanged.
    ///
    /// [`HandwireError::InvalidHandshake`]: crate::error::HandwireError::InvalidHandshake
    pub fn resolve_handshake(&self, request: &[u8]) -> Result<Vec<u8>> {
        let request: HandshakeRequest = self.engine.decode(request, &self.request_schema)?;

        // Invariant: enforced before any cache lookup.
        let client_hash = ProtocolHash::try_from(request.client_hash.as_slice()).map_err(|e| {
            warn!("rejecting handshake: {e}");
            e
        })?;

        let server_hash_matches = self.server_hash.matches(&request.server_hash);

        if self.cache.contains(&client_hash) {
            if !server_hash_matches {
                // The client's protocol is known, but it addressed a stale
                // server identity; hand back the current one.
                debug!(client = %client_hash, "handshake match CLIENT: stale server hash");
                return self.respond(HandshakeResponse::client(
                    &self.server_protocol,
                    self.server_hash,
                    self.meta.clone(),
                ));
            }
            debug!(client = %client_hash, "handshake match BOTH");
            return self.respond(HandshakeResponse::both(self.meta.clone()));
        }

        if let (Some(client_protocol), true) = (&request.client_protocol, server_hash_matches) {
            let schema = self.engine.parse_schema(client_protocol)?;
            let protocol = self.engine.protocol_of(&schema)?;
            self.cache
                .insert(client_hash, NegotiatedProtocol { schema, protocol });
            debug!(client = %client_hash, "handshake match BOTH: protocol registered");
            return self.respond(HandshakeResponse::both(self.meta.clone()));
        }

        // Unknown client: signal that it must resubmit with its protocol.
        debug!(client = %client_hash, "handshake match NONE");
        self.respond(HandshakeResponse::none(
            &self.server_protocol,
            self.server_hash,
            self.meta.clone(),
        ))
    }

    /// Drop one negotiated protocol, forcing that client to renegotiate.
    ///
    /// Returns whether an entry was present.
    pub fn invalidate(&self, client_hash: &ProtocolHash) -> bool {
        debug!(client = %client_hash, "invalidating session");
        self.cache.remove(client_hash)
    }

    /// Drop every negotiated protocol, e.g. after a server protocol upgrade.
    pub fn clear_all(&self) {
        debug!("clearing session cache");
        self.cache.clear();
    }

    fn respond(&self, response: HandshakeResponse) -> Result<Vec<u8>> {
        self.engine.encode(&response, &self.response_schema)
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;
    use crate::error::HandwireError;
    use crate::protocol::handshake::HandshakeMatch;
    use crate::schema::JsonEngine;

    const PROTOCOL: &str = r#"{
        "protocol": "Echo",
        "messages": {
            "echo": {
                "request": [{"name": "payload", "type": "string"}],
                "response": "string"
            }
        }
    }"#;

    const SERVER_HASH: [u8; 16] = hex!("0102030405060708090a0b0c0d0e0f10");
    const CLIENT_HASH: [u8; 16] = hex!("a1a2a3a4a5a6a7a8a9aaabacadaeafb0");

    fn negotiator() -> HandshakeNegotiator<JsonEngine> {
        HandshakeNegotiator::new(JsonEngine::new(), ProtocolHash::new(SERVER_HASH), PROTOCOL)
            .unwrap()
    }

    fn resolve(
        negotiator: &HandshakeNegotiator<JsonEngine>,
        request: &HandshakeRequest,
    ) -> HandshakeResponse {
        let engine = JsonEngine::new();
        let request_schema = engine.parse_schema(wire::HANDSHAKE_REQUEST_SCHEMA).unwrap();
        let response_schema = engine
            .parse_schema(wire::HANDSHAKE_RESPONSE_SCHEMA)
            .unwrap();
        let bytes = engine.encode(request, &request_schema).unwrap();
        let response = negotiator.resolve_handshake(&bytes).unwrap();
        engine.decode(&response, &response_schema).unwrap()
    }

    fn request(client_protocol: Option<&str>, server_hash: &[u8]) -> HandshakeRequest {
        HandshakeRequest {
            client_hash: CLIENT_HASH.to_vec(),
            client_protocol: client_protocol.map(str::to_string),
            server_hash: server_hash.to_vec(),
        }
    }

    #[test]
    fn test_invalid_client_hash_rejected_before_cache_lookup() {
        let negotiator = negotiator();
        let engine = JsonEngine::new();
        let request_schema = engine.parse_schema(wire::HANDSHAKE_REQUEST_SCHEMA).unwrap();

        for len in [0, 8, 15, 17] {
            let bad = HandshakeRequest {
                client_hash: vec![0xab; len],
                client_protocol: Some(PROTOCOL.to_string()),
                server_hash: SERVER_HASH.to_vec(),
            };
            let bytes = engine.encode(&bad, &request_schema).unwrap();
            let result = negotiator.resolve_handshake(&bytes);
            assert!(
                matches!(result, Err(HandwireError::InvalidHandshake(_))),
                "hash length {len} must be rejected"
            );
        }
        assert!(negotiator.cache().is_empty());
    }

    #[test]
    fn test_unknown_client_without_protocol_gets_none() {
        let negotiator = negotiator();
        let response = resolve(&negotiator, &request(None, &[0u8; 16]));

        assert_eq!(response.match_, HandshakeMatch::None);
        assert_eq!(response.server_protocol.as_deref(), Some(PROTOCOL));
        assert_eq!(response.server_hash.as_deref(), Some(&SERVER_HASH[..]));
        assert!(negotiator.cache().is_empty());
    }

    #[test]
    fn test_resubmission_with_protocol_registers_and_matches_both() {
        let negotiator = negotiator();
        let response = resolve(&negotiator, &request(Some(PROTOCOL), &SERVER_HASH));

        assert_eq!(response.match_, HandshakeMatch::Both);
        assert!(response.server_protocol.is_none());
        assert!(response.server_hash.is_none());

        let cache = negotiator.cache();
        let entry = cache.get(&ProtocolHash::new(CLIENT_HASH)).unwrap();
        assert!(entry.protocol.message("echo").is_some());
    }

    #[test]
    fn test_known_client_repeats_both_without_protocol_text() {
        let negotiator = negotiator();
        resolve(&negotiator, &request(Some(PROTOCOL), &SERVER_HASH));

        let response = resolve(&negotiator, &request(None, &SERVER_HASH));
        assert_eq!(response.match_, HandshakeMatch::Both);
        assert_eq!(negotiator.cache().len(), 1);
    }

    #[test]
    fn test_known_client_with_stale_server_hash_gets_client_match() {
        let negotiator = negotiator();
        resolve(&negotiator, &request(Some(PROTOCOL), &SERVER_HASH));

        let stale = [0xffu8; 16];
        let response = resolve(&negotiator, &request(None, &stale));

        assert_eq!(response.match_, HandshakeMatch::Client);
        assert_eq!(response.server_protocol.as_deref(), Some(PROTOCOL));
        assert_eq!(response.server_hash.as_deref(), Some(&SERVER_HASH[..]));
        // Cache entry untouched.
        assert!(negotiator.cache().contains(&ProtocolHash::new(CLIENT_HASH)));
    }

    #[test]
    fn test_unknown_client_with_protocol_but_stale_server_hash_gets_none() {
        let negotiator = negotiator();
        let response = resolve(&negotiator, &request(Some(PROTOCOL), &[0u8; 16]));

        assert_eq!(response.match_, HandshakeMatch::None);
        assert!(negotiator.cache().is_empty());
    }

    #[test]
    fn test_invalidate_returns_hash_to_never_seen_behavior() {
        let negotiator = negotiator();
        resolve(&negotiator, &request(Some(PROTOCOL), &SERVER_HASH));

        assert!(negotiator.invalidate(&ProtocolHash::new(CLIENT_HASH)));
        assert!(!negotiator.invalidate(&ProtocolHash::new(CLIENT_HASH)));

        let response = resolve(&negotiator, &request(None, &[0u8; 16]));
        assert_eq!(response.match_, HandshakeMatch::None);
    }

    #[test]
    fn test_clear_all_empties_cache() {
        let negotiator = negotiator();
        resolve(&negotiator, &request(Some(PROTOCOL), &SERVER_HASH));
        assert_eq!(negotiator.cache().len(), 1);

        negotiator.clear_all();
        assert!(negotiator.cache().is_empty());
    }

    #[test]
    fn test_meta_is_carried_in_responses() {
        let meta = HashMap::from([("endpoint".to_string(), b"primary".to_vec())]);
        let negotiator = HandshakeNegotiator::new(
            JsonEngine::new(),
            ProtocolHash::new(SERVER_HASH),
            PROTOCOL,
        )
        .unwrap()
        .with_meta(meta);

        let response = resolve(&negotiator, &request(None, &[0u8; 16]));
        assert_eq!(response.meta.get("endpoint").map(Vec::as_slice), Some(&b"primary"[..]));
    }

    #[test]
    fn test_malformed_protocol_text_rejected_at_construction() {
        let result =
            HandshakeNegotiator::new(JsonEngine::new(), ProtocolHash::new(SERVER_HASH), "{oops");
        assert!(matches!(result, Err(HandwireError::SchemaParse(_))));
    }
}
