//! Schema engine seam.
//!
//! The handshake negotiator and message framer never interpret schema text
//! themselves: all parsing and value encoding is delegated through the
//! [`SchemaEngine`] trait. The engine owns the self-describing value
//! encoding; this layer only decides *which* schema applies and in *what
//! order* values appear in a frame.
//!
//! [`JsonEngine`] is the built-in implementation; endpoints with a binary
//! value encoding plug in their own engine.

mod json;
pub mod wire;

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use json::JsonEngine;

use crate::error::Result;

/// Typed encode/decode operations over parsed schemas.
///
/// `decode_sequential` is the primitive that makes frame reading possible:
/// a call-response frame is a plain concatenation of encoded values, so each
/// decode must report how many bytes it consumed.
pub trait SchemaEngine {
    /// Parsed schema handle.
    type Schema: Clone;

    /// Parse schema or protocol text into a schema handle.
    fn parse_schema(&self, text: &str) -> Result<Self::Schema>;

    /// Extract the message table from a parsed protocol document.
    fn protocol_of(&self, schema: &Self::Schema) -> Result<ProtocolInfo<Self::Schema>>;

    /// Encode a value under the given schema.
    fn encode<T: Serialize>(&self, value: &T, schema: &Self::Schema) -> Result<Vec<u8>>;

    /// Decode exactly one value; the whole buffer must be consumed.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8], schema: &Self::Schema) -> Result<T>;

    /// Decode one value from the front of the buffer.
    ///
    /// Returns the value and the number of bytes consumed, so the caller can
    /// continue decoding at the following offset.
    fn decode_sequential<T: DeserializeOwned>(
        &self,
        bytes: &[u8],
        schema: &Self::Schema,
    ) -> Result<(T, usize)>;
}

/// Message table of a parsed protocol: message name to schemas.
#[derive(Debug, Clone)]
pub struct ProtocolInfo<S> {
    /// Declared messages keyed by name.
    pub messages: HashMap<String, MessageSchema<S>>,
}

impl<S> ProtocolInfo<S> {
    /// Look up a declared message by name.
    pub fn message(&self, name: &str) -> Option<&MessageSchema<S>> {
        self.messages.get(name)
    }
}

/// Schemas of a single named RPC message.
#[derive(Debug, Clone)]
pub struct MessageSchema<S> {
    /// Request parameter schema.
    pub request: S,
    /// Response schema, absent for one-way messages.
    pub response: Option<S>,
    /// Declared error union, in declaration order.
    pub errors: Vec<S>,
}
