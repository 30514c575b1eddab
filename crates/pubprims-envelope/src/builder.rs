use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;

use crate::config::CodecConfig;
use crate::encoding::DataEncoding;
use crate::envelope::{Envelope, Metadata, PROTOCOL_VERSION};
use crate::error::{EnvelopeError, Result};
use crate::identity::{MessageId, ServiceIdentity};
use crate::payload::Payload;

/// Build an envelope for an outbound payload.
///
/// A JSON payload is embedded as-is unless the serialized envelope would
/// reach `config.compression_threshold` bytes; then the payload is
/// gzip-compressed and base64-encoded. Protobuf payloads are always
/// base64-encoded.
pub fn build_envelope(
    identity: &ServiceIdentity,
    topic: &str,
    payload: Payload,
    config: &CodecConfig,
) -> Result<Envelope> {
    if topic.is_empty() {
        return Err(EnvelopeError::InvalidTopic);
    }
    config.validate()?;

    let mut envelope = Envelope {
        data: Value::Null,
        metadata: Metadata {
            message_identifier: MessageId::generate(identity),
            timestamp: now_unix_seconds(),
            topic: topic.to_string(),
            data_encoding: config.text_encoding,
            protocol_version: Some(PROTOCOL_VERSION.to_string()),
        },
        service_identity: identity.to_string(),
    };
    encode_payload(&mut envelope, payload, config)?;

    tracing::debug!(
        message_identifier = %envelope.metadata.message_identifier,
        topic,
        data_encoding = %envelope.metadata.data_encoding,
        "built envelope"
    );
    Ok(envelope)
}

/// Build an envelope and serialize it for transport.
pub fn build_message(
    identity: &ServiceIdentity,
    topic: &str,
    payload: Payload,
    config: &CodecConfig,
) -> Result<String> {
    build_envelope(identity, topic, payload, config)?.to_json()
}

fn encode_payload(envelope: &mut Envelope, payload: Payload, config: &CodecConfig) -> Result<()> {
    match payload {
        Payload::Proto(bytes) => {
            envelope.data = Value::String(STANDARD.encode(&bytes));
            envelope.metadata.data_encoding = DataEncoding::Proto;
        }
        Payload::Json(value) => {
            envelope.data = value;
            envelope.metadata.data_encoding = config.text_encoding;

            let wire_size = envelope.wire_size()?;
            if wire_size < config.compression_threshold {
                return Ok(());
            }

            let text = serde_json::to_vec(&envelope.data).map_err(EnvelopeError::Serialization)?;
            let compressed = gzip(&text, config.compression_level)?;
            tracing::debug!(
                wire_size,
                json_size = text.len(),
                compressed_size = compressed.len(),
                threshold = config.compression_threshold,
                "payload compressed"
            );
            envelope.data = Value::String(STANDARD.encode(compressed));
            envelope.metadata.data_encoding = DataEncoding::Base64GzipJson;
        }
    }
    Ok(())
}

fn gzip(input: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(input.len() / 4), Compression::new(level));
    encoder.write_all(input).map_err(compression_error)?;
    encoder.finish().map_err(compression_error)
}

fn compression_error(err: std::io::Error) -> EnvelopeError {
    EnvelopeError::Serialization(serde_json::Error::io(err))
}

fn now_unix_seconds() -> f64 {
    unix_seconds(SystemTime::now())
}

fn unix_seconds(at: SystemTime) -> f64 {
    match at.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs_f64(),
        Err(err) => {
            tracing::warn!(
                behind_epoch_secs = err.duration().as_secs_f64(),
                "system clock is before the Unix epoch, stamping envelope with 0.0"
            );
            0.0
        }
    }
}
