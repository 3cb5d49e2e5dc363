//! JSON-backed schema engine.
//!
//! Values are encoded as self-describing JSON, which keeps frames decodable
//! sequentially: `serde_json`'s stream deserializer reports the byte offset
//! after each value, which is exactly the `decode_sequential` contract.
//!
//! Protocol documents follow the usual IDL shape:
//!
//! ```json
//! {
//!   "protocol": "Echo",
//!   "messages": {
//!     "echo": {
//!       "request": [{"name": "payload", "type": "string"}],
//!       "response": "string",
//!       "errors": [{"type": "record", "name": "EchoError", "fields": []}]
//!     }
//!   }
//! }
//! ```

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{MessageSchema, ProtocolInfo, SchemaEngine};
use crate::error::{HandwireError, Result};

/// Schema engine over self-describing JSON values.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEngine;

impl JsonEngine {
    /// Create a new JSON engine.
    pub fn new() -> Self {
        Self
    }
}

impl SchemaEngine for JsonEngine {
    type Schema = Value;

    fn parse_schema(&self, text: &str) -> Result<Value> {
        serde_json::from_str(text).map_err(|e| HandwireError::SchemaParse(e.to_string()))
    }

    fn protocol_of(&self, schema: &Value) -> Result<ProtocolInfo<Value>> {
        let doc = schema.as_object().ok_or_else(|| {
            HandwireError::SchemaParse("protocol document is not an object".to_string())
        })?;

        let mut messages = HashMap::new();
        if let Some(declared) = doc.get("messages") {
            let declared = declared.as_object().ok_or_else(|| {
                HandwireError::SchemaParse("protocol \"messages\" is not a map".to_string())
            })?;
            for (name, decl) in declared {
                let errors = match decl.get("errors") {
                    Some(Value::Array(list)) => list.clone(),
                    Some(other) => {
                        return Err(HandwireError::SchemaParse(format!(
                            "message {name}: \"errors\" is not a union: {other}"
                        )))
                    },
                    None => Vec::new(),
                };
                messages.insert(
                    name.clone(),
                    MessageSchema {
                        request: decl.get("request").cloned().unwrap_or(Value::Null),
                        response: decl.get("response").cloned(),
                        errors,
                    },
                );
            }
        }

        Ok(ProtocolInfo { messages })
    }

    fn encode<T: Serialize>(&self, value: &T, _schema: &Value) -> Result<Vec<u8>> {
        // A newline terminator keeps adjacent numeric values unambiguous
        // when frames are decoded sequentially.
        let mut bytes =
            serde_json::to_vec(value).map_err(|e| HandwireError::Encode(e.to_string()))?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8], _schema: &Value) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| HandwireError::Decode(e.to_string()))
    }

    fn decode_sequential<T: DeserializeOwned>(
        &self,
        bytes: &[u8],
        _schema: &Value,
    ) -> Result<(T, usize)> {
        let mut stream = serde_json::Deserializer::from_slice(bytes).into_iter::<T>();
        match stream.next() {
            Some(Ok(value)) => Ok((value, stream.byte_offset())),
            Some(Err(e)) => Err(HandwireError::Decode(e.to_string())),
            None => Err(HandwireError::Decode("empty buffer".to_string())),
        }
    }
}
