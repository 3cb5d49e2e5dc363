//! Embedded handshake and framing schema texts.
//!
//! These are the schemas both endpoints already agree on before any
//! negotiation has happened; everything else is carried inside the
//! negotiated protocol itself.

/// Handshake request schema.
///
/// `clientHash`/`serverHash` are 16-byte protocol fingerprints;
/// `clientProtocol` is only present when the client resubmits after a
/// `NONE` match.
pub const HANDSHAKE_REQUEST_SCHEMA: &str = r#"{
  "type": "record",
  "name": "HandshakeRequest",
  "namespace": "handwire.ipc",
  "fields": [
    {"name": "clientHash", "type": {"type": "fixed", "name": "ProtocolHash", "size": 16}},
    {"name": "clientProtocol", "type": ["null", "string"]},
    {"name": "serverHash", "type": "ProtocolHash"}
  ]
}"#;

/// Handshake response schema.
///
/// `serverProtocol` and `serverHash` are present unless `match` is `BOTH`.
pub const HANDSHAKE_RESPONSE_SCHEMA: &str = r#"{
  "type": "record",
  "name": "HandshakeResponse",
  "namespace": "handwire.ipc",
  "fields": [
    {"name": "match", "type": {"type": "enum", "name": "HandshakeMatch", "symbols": ["NONE", "BOTH", "CLIENT"]}},
    {"name": "serverProtocol", "type": ["null", "string"]},
    {"name": "serverHash", "type": ["null", {"type": "fixed", "name": "ProtocolHash", "size": 16}]},
    {"name": "meta", "type": {"type": "map", "values": "bytes"}}
  ]
}"#;

/// Call-response metadata schema: a map with `bytes` values.
pub const METADATA_SCHEMA: &str = r#"{"type": "map", "values": "bytes"}"#;

/// The one-value error flag that separates metadata from the payload.
pub const BOOLEAN_SCHEMA: &str = r#""boolean""#;
