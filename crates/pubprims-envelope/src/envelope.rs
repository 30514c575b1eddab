use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::encoding::DataEncoding;
use crate::error::{EnvelopeError, Result};
use crate::identity::MessageId;

/// Protocol version written by this crate.
pub const PROTOCOL_VERSION: &str = "pubprims-envelope--1.0.0";

/// Descriptive fields carried next to the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub message_identifier: MessageId,
    /// Seconds since the Unix epoch, captured at build time.
    pub timestamp: f64,
    pub topic: String,
    pub data_encoding: DataEncoding,
    /// Absent on envelopes from producers that predate versioning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,
}

/// The wire unit exchanged over the transport.
///
/// Wire layout:
/// ```text
/// {
///   "data": <json value | base64 string>,
///   "metadata": {
///     "message_identifier": <73 chars>,
///     "timestamp": <float>,
///     "topic": <string>,
///     "data_encoding": "raw" | "json" | "base64_gzip_json" | "proto",
///     "protocol_version": "pubprims-envelope--1.0.0"
///   },
///   "service_identity": <36 chars>
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Encoded payload; layout depends on `metadata.data_encoding`.
    pub data: Value,
    pub metadata: Metadata,
    pub service_identity: String,
}

impl Envelope {
    /// Serialize for transport.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(EnvelopeError::Serialization)
    }

    /// Serialize for transport as bytes.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(EnvelopeError::Serialization)
    }

    /// The serialized length in bytes.
    pub fn wire_size(&self) -> Result<usize> {
        self.to_vec().map(|bytes| bytes.len())
    }
}
