//! Outbound payloads and decoded inbound data.

use std::any::Any;
use std::fmt;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::error::{EnvelopeError, Result};

/// A payload handed to the builder.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Any JSON-representable value.
    Json(Value),
    /// Canonical binary form of a protobuf message.
    Proto(Bytes),
}

impl Payload {
    /// Capture a serializable value as JSON.
    ///
    /// Fails with [`EnvelopeError::Serialization`] when the value has no JSON
    /// form (for example a map with non-string keys).
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Payload::Json)
            .map_err(EnvelopeError::Serialization)
    }

    /// Capture the canonical binary form of a protobuf message.
    pub fn proto<M: prost::Message>(message: &M) -> Self {
        Payload::Proto(Bytes::from(message.encode_to_vec()))
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

/// A decoded protobuf message of a type chosen by the caller at parse time.
pub struct ProtoMessage {
    type_name: &'static str,
    inner: Box<dyn Any + Send + Sync>,
}

impl ProtoMessage {
    pub(crate) fn new(type_name: &'static str, inner: Box<dyn Any + Send + Sync>) -> Self {
        Self { type_name, inner }
    }

    /// Rust type name of the decoded message.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the message as `M`.
    pub fn downcast_ref<M: 'static>(&self) -> Option<&M> {
        self.inner.downcast_ref::<M>()
    }

    /// Take the message as `M`, or get `self` back if it is another type.
    pub fn downcast<M: 'static>(self) -> std::result::Result<M, Self> {
        let type_name = self.type_name;
        self.inner
            .downcast::<M>()
            .map(|boxed| *boxed)
            .map_err(|inner| Self { type_name, inner })
    }
}

impl fmt::Debug for ProtoMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtoMessage")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Payload recovered by the parser.
#[derive(Debug)]
pub enum DecodedData {
    /// JSON-family payload (`raw`, `json`, `base64_gzip_json`).
    Json(Value),
    /// `proto` payload parsed without an expected type.
    Bytes(Bytes),
    /// `proto` payload parsed into the expected type.
    Proto(ProtoMessage),
}

impl DecodedData {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            DecodedData::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            DecodedData::Bytes(bytes) => Some(bytes.as_ref()),
            _ => None,
        }
    }

    /// Borrow a typed protobuf payload.
    pub fn proto<M: 'static>(&self) -> Option<&M> {
        match self {
            DecodedData::Proto(message) => message.downcast_ref::<M>(),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            DecodedData::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Take a typed protobuf payload.
    pub fn into_proto<M: 'static>(self) -> Option<M> {
        match self {
            DecodedData::Proto(message) => message.downcast::<M>().ok(),
            _ => None,
        }
    }

    /// Short name of the variant, for logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodedData::Json(_) => "json",
            DecodedData::Bytes(_) => "bytes",
            DecodedData::Proto(_) => "proto",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;

    #[test]
    fn json_payload_from_serializable() {
        #[derive(Serialize)]
        struct Item {
            key: &'static str,
        }

        let payload = Payload::json(&Item { key: "value" }).unwrap();
        assert_eq!(payload, Payload::Json(json!({"key": "value"})));
    }

    #[test]
    fn non_string_map_keys_fail_serialization() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8, 2], "value");

        assert!(matches!(
            Payload::json(&map),
            Err(EnvelopeError::Serialization(_))
        ));
    }

    #[test]
    fn proto_message_downcasts() {
        let message = ProtoMessage::new("u32", Box::new(7u32));
        assert_eq!(message.type_name(), "u32");
        assert_eq!(message.downcast_ref::<u32>(), Some(&7));
        assert!(message.downcast_ref::<String>().is_none());

        let message = message.downcast::<String>().unwrap_err();
        assert_eq!(message.downcast::<u32>().unwrap(), 7);
    }

    #[test]
    fn decoded_accessors() {
        let data = DecodedData::Json(json!([1, 2]));
        assert_eq!(data.kind(), "json");
        assert_eq!(data.as_json(), Some(&json!([1, 2])));
        assert!(data.as_bytes().is_none());
        assert!(data.proto::<u32>().is_none());

        let data = DecodedData::Bytes(Bytes::from_static(b"\x01"));
        assert_eq!(data.kind(), "bytes");
        assert_eq!(data.as_bytes(), Some(&b"\x01"[..]));
        assert!(data.into_json().is_none());
    }
}
