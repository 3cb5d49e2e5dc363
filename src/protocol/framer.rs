//! Call-response message framing.
//!
//! A call response is framed in fixed order, with no length envelope beyond
//! what the schema engine's self-describing encoding provides:
//!
//! ```text
//! [metadata: map<string,bytes>] [errorFlag: boolean] [payload]
//! ```
//!
//! When the flag is false the payload is one value encoded with the
//! message's response schema; when true it is the message's declared error
//! union, decoded type by type from the running offset.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::handshake::ProtocolHash;
use super::session::{NegotiatedProtocol, SessionCache};
use crate::error::{HandwireError, Result};
use crate::schema::{wire, MessageSchema, SchemaEngine};

/// Frame metadata: string keys to raw byte values.
pub type FrameMeta = HashMap<String, Vec<u8>>;

/// Writes and reads call-response frames against negotiated protocols.
///
/// Shares the [`SessionCache`] populated by the handshake negotiator; the
/// framer itself never mutates it.
pub struct MessageFramer<E: SchemaEngine> {
    engine: E,
    cache: Arc<SessionCache<E::Schema>>,
    metadata_schema: E::Schema,
    boolean_schema: E::Schema,
    meta: FrameMeta,
}

impl<E: SchemaEngine> MessageFramer<E> {
    /// Create a framer over an existing session cache.
    pub fn new(engine: E, cache: Arc<SessionCache<E::Schema>>) -> Result<Self> {
        let metadata_schema = engine.parse_schema(wire::METADATA_SCHEMA)?;
        let boolean_schema = engine.parse_schema(wire::BOOLEAN_SCHEMA)?;
        Ok(Self {
            engine,
            cache,
            metadata_schema,
            boolean_schema,
            meta: FrameMeta::new(),
        })
    }

    /// Attach metadata to every written frame. Default is an empty map.
    pub fn with_meta(mut self, meta: FrameMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Frame a successful response for `message_name`.
    ///
    /// Fails with `SessionNotFound`, `MessageNotFound` or `SchemaMissing`
    /// rather than silently producing a truncated frame.
    pub fn write_response<T: Serialize>(
        &self,
        session: &ProtocolHash,
        message_name: &str,
        value: &T,
    ) -> Result<Vec<u8>> {
        let negotiated = self.negotiated(session)?;
        let message = Self::message(&negotiated, message_name)?;
        let response_schema = message.response.as_ref().ok_or_else(|| {
            HandwireError::SchemaMissing(format!("message {message_name} has no response schema"))
        })?;

        let mut frame = self.engine.encode(&self.meta, &self.metadata_schema)?;
        frame.extend(self.engine.encode(&false, &self.boolean_schema)?);
        frame.extend(self.engine.encode(value, response_schema)?);
        Ok(frame)
    }

    /// Frame an error response for `message_name`.
    ///
    /// `error_id` indexes the message's declared error union and is
    /// validated before any bytes are produced.
    pub fn write_error_response<T: Serialize>(
        &self,
        session: &ProtocolHash,
        message_name: &str,
        error_id: usize,
        error_value: &T,
    ) -> Result<Vec<u8>> {
        let negotiated = self.negotiated(session)?;
        let message = Self::message(&negotiated, message_name)?;
        let Some(error_schema) = message.errors.get(error_id) else {
            return Err(HandwireError::ErrorIdOutOfRange {
                error_id,
                error_count: message.errors.len(),
            });
        };

        let mut frame = self.engine.encode(&self.meta, &self.metadata_schema)?;
        frame.extend(self.engine.encode(&true, &self.boolean_schema)?);
        frame.extend(self.engine.encode(error_value, error_schema)?);
        Ok(frame)
    }

    /// Read a call-response frame.
    ///
    /// Returns the metadata map, the error flag, and the decoded payload
    /// values: exactly one response value when the flag is false, or one
    /// value per declared error-union type when it is true.
    pub fn read_response<T: DeserializeOwned>(
        &self,
        session: &ProtocolHash,
        message_name: &str,
        frame: &[u8],
    ) -> Result<(FrameMeta, bool, Vec<T>)> {
        let negotiated = self.negotiated(session)?;
        let message = Self::message(&negotiated, message_name)?;

        let (meta, consumed): (FrameMeta, usize) =
            self.engine.decode_sequential(frame, &self.metadata_schema)?;
        let mut offset = consumed;

        let (error_flag, consumed): (bool, usize) = self
            .engine
            .decode_sequential(&frame[offset..], &self.boolean_schema)?;
        offset += consumed;

        let mut values = Vec::new();
        if error_flag {
            debug!(message = message_name, "reading error union payload");
            for error_schema in &message.errors {
                let (value, consumed) = self
                    .engine
                    .decode_sequential(&frame[offset..], error_schema)?;
                values.push(value);
                offset += consumed;
            }
        } else {
            let response_schema = message.response.as_ref().ok_or_else(|| {
                HandwireError::SchemaMissing(format!(
                    "message {message_name} has no response schema"
                ))
            })?;
            values.push(self.engine.decode(&frame[offset..], response_schema)?);
        }

        Ok((meta, error_flag, values))
    }

    fn negotiated(&self, session: &ProtocolHash) -> Result<Arc<NegotiatedProtocol<E::Schema>>> {
        self.cache
            .get(session)
            .ok_or(HandwireError::SessionNotFound(*session))
    }

    fn message<'a>(
        negotiated: &'a NegotiatedProtocol<E::Schema>,
        name: &str,
    ) -> Result<&'a MessageSchema<E::Schema>> {
        negotiated
            .protocol
            .message(name)
            .ok_or_else(|| HandwireError::MessageNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::session::SessionCache;
    use crate::schema::JsonEngine;

    const PROTOCOL: &str = r#"{
        "protocol": "Calc",
        "messages": {
            "add": {
                "request": [{"name": "a", "type": "int"}, {"name": "b", "type": "int"}],
                "response": "int",
                "errors": ["string", "int"]
            },
            "notify": {
                "request": [{"name": "text", "type": "string"}]
            }
        }
    }"#;

    fn framer_with_session() -> (MessageFramer<JsonEngine>, ProtocolHash) {
        let engine = JsonEngine::new();
        let schema = engine.parse_schema(PROTOCOL).unwrap();
        let protocol = engine.protocol_of(&schema).unwrap();

        let cache = Arc::new(SessionCache::new());
        let session = ProtocolHash::new([0x42; 16]);
        cache.insert(session, NegotiatedProtocol { schema, protocol });

        (MessageFramer::new(engine, cache).unwrap(), session)
    }

    #[test]
    fn test_write_then_read_success_frame() {
        let (framer, session) = framer_with_session();

        let frame = framer.write_response(&session, "add", &7i64).unwrap();
        let (meta, error_flag, values): (FrameMeta, bool, Vec<i64>) =
            framer.read_response(&session, "add", &frame).unwrap();

        assert!(meta.is_empty());
        assert!(!error_flag);
        assert_eq!(values, vec![7]);
    }

    #[test]
    fn test_write_then_read_error_frame() {
        let (framer, session) = framer_with_session();

        // Error union declares ["string", "int"]; the reader decodes one
        // value per declared type from the running offset.
        let frame = framer
            .write_error_response(&session, "add", 0, &"overflow")
            .unwrap();
        let tail = framer.write_error_response(&session, "add", 1, &-1i32).unwrap();

        // Assemble a frame carrying both union positions: metadata + flag
        // from the first, payloads from both.
        let mut full = frame;
        let skip = {
            let engine = JsonEngine::new();
            let meta_schema = engine.parse_schema(wire::METADATA_SCHEMA).unwrap();
            let bool_schema = engine.parse_schema(wire::BOOLEAN_SCHEMA).unwrap();
            let (_, a): (FrameMeta, usize) =
                engine.decode_sequential(&tail, &meta_schema).unwrap();
            let (_, b): (bool, usize) =
                engine.decode_sequential(&tail[a..], &bool_schema).unwrap();
            a + b
        };
        full.extend_from_slice(&tail[skip..]);

        let (_, error_flag, values): (FrameMeta, bool, Vec<serde_json::Value>) =
            framer.read_response(&session, "add", &full).unwrap();

        assert!(error_flag);
        assert_eq!(values.len(), 2);
        assert_eq!(values[0], serde_json::json!("overflow"));
        assert_eq!(values[1], serde_json::json!(-1));
    }

    #[test]
    fn test_error_id_out_of_range_emits_no_bytes() {
        let (framer, session) = framer_with_session();

        let result = framer.write_error_response(&session, "add", 2, &"boom");
        match result {
            Err(HandwireError::ErrorIdOutOfRange {
                error_id,
                error_count,
            }) => {
                assert_eq!(error_id, 2);
                assert_eq!(error_count, 2);
            },
            other => panic!("expected ErrorIdOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_error_id_on_message_without_errors() {
        let (framer, session) = framer_with_session();
        let result = framer.write_error_response(&session, "notify", 0, &"boom");
        assert!(matches!(
            result,
            Err(HandwireError::ErrorIdOutOfRange { error_count: 0, .. })
        ));
    }

    #[test]
    fn test_unknown_session_fails() {
        let (framer, _) = framer_with_session();
        let unknown = ProtocolHash::new([0; 16]);
        let result = framer.write_response(&unknown, "add", &1i64);
        assert!(matches!(result, Err(HandwireError::SessionNotFound(_))));
    }

    #[test]
    fn test_unknown_message_fails() {
        let (framer, session) = framer_with_session();
        let result = framer.write_response(&session, "subtract", &1i64);
        assert!(matches!(result, Err(HandwireError::MessageNotFound(_))));
    }

    #[test]
    fn test_one_way_message_has_no_response_schema() {
        let (framer, session) = framer_with_session();
        let result = framer.write_response(&session, "notify", &"hi");
        assert!(matches!(result, Err(HandwireError::SchemaMissing(_))));
    }

    #[test]
    fn test_framer_meta_is_written() {
        let (framer, session) = framer_with_session();
        let framer =
            framer.with_meta(FrameMeta::from([("trace".to_string(), vec![1, 2, 3])]));

        let frame = framer.write_response(&session, "add", &7i64).unwrap();
        let (meta, _, _): (FrameMeta, bool, Vec<i64>) =
            framer.read_response(&session, "add", &frame).unwrap();
        assert_eq!(meta.get("trace"), Some(&vec![1, 2, 3]));
    }

    #[test]
    fn test_truncated_frame_surfaces_decode_error() {
        let (framer, session) = framer_with_session();
        let frame = framer.write_response(&session, "add", &7i64).unwrap();

        let truncated = &frame[..frame.len() / 2];
        let result: Result<(FrameMeta, bool, Vec<i64>)> =
            framer.read_response(&session, "add", truncated);
        assert!(result.is_err());
    }
}
