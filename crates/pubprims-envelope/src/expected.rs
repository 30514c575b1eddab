use std::any::{type_name, Any};
use std::fmt;

use crate::error::{EnvelopeError, Result};
use crate::payload::ProtoMessage;

type ProtoDecodeFn = fn(&[u8]) -> std::result::Result<Box<dyn Any + Send + Sync>, prost::DecodeError>;

/// The type a caller expects a `proto` payload to decode into.
///
/// The wire format does not name the message type, so the receiver has to.
/// JSON-family payloads ignore the expected type.
#[derive(Clone, Copy)]
pub struct ExpectedType {
    name: &'static str,
    decode: Option<ProtoDecodeFn>,
}

impl ExpectedType {
    /// Expect the protobuf message type `M`.
    pub fn proto<M>() -> Self
    where
        M: prost::Message + Default + Send + Sync + 'static,
    {
        Self {
            name: type_name::<M>(),
            decode: Some(decode_boxed::<M>),
        }
    }

    /// Expect a type that has no protobuf schema.
    ///
    /// Parsing a `proto` payload against it fails with
    /// [`EnvelopeError::SchemaMismatch`].
    pub fn opaque<T: ?Sized + 'static>() -> Self {
        Self {
            name: type_name::<T>(),
            decode: None,
        }
    }

    /// Rust type name of the expected type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if this type can decode `proto` payloads.
    pub fn is_proto(&self) -> bool {
        self.decode.is_some()
    }

    pub(crate) fn decode(&self, bytes: &[u8]) -> Result<ProtoMessage> {
        let decode = self.decode.ok_or_else(|| EnvelopeError::SchemaMismatch {
            expected: self.name,
            reason: "type is not a protobuf message".to_string(),
        })?;

        decode(bytes)
            .map(|inner| ProtoMessage::new(self.name, inner))
            .map_err(|err| EnvelopeError::SchemaMismatch {
                expected: self.name,
                reason: err.to_string(),
            })
    }
}

impl fmt::Debug for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpectedType")
            .field("name", &self.name)
            .field("proto", &self.is_proto())
            .finish()
    }
}

fn decode_boxed<M>(bytes: &[u8]) -> std::result::Result<Box<dyn Any + Send + Sync>, prost::DecodeError>
where
    M: prost::Message + Default + Send + Sync + 'static,
{
    M::decode(bytes).map(|message| Box::new(message) as Box<dyn Any + Send + Sync>)
}
