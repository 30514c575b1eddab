use std::io::Read;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use flate2::read::GzDecoder;
use serde_json::Value;

use crate::config::CodecConfig;
use crate::encoding::DataEncoding;
use crate::envelope::{Envelope, Metadata, PROTOCOL_VERSION};
use crate::error::{DecodeError, EnvelopeError, Result};
use crate::expected::ExpectedType;
use crate::identity::MessageId;
use crate::payload::DecodedData;
use crate::validator::PayloadValidator;

/// Decoded payload with the metadata it arrived with.
#[derive(Debug)]
pub struct Decoded {
    pub data: DecodedData,
    pub metadata: Metadata,
}

/// Result of parsing an inbound envelope.
#[derive(Debug)]
pub struct ParsedEnvelope {
    pub decoded: Decoded,
    pub message_id: MessageId,
    /// Build-time timestamp, unchanged.
    pub timestamp: f64,
    /// Identity of the producing service.
    pub service_identity: String,
}

impl ParsedEnvelope {
    /// Split into `(decoded, message identifier, timestamp)`.
    pub fn into_parts(self) -> (Decoded, MessageId, f64) {
        (self.decoded, self.message_id, self.timestamp)
    }
}

/// Parse a serialized envelope.
///
/// `expected` only affects `proto` payloads: with it the bytes are decoded
/// into that type, without it the raw bytes are returned. When `validator` is
/// given it runs on the decoded payload and its error is returned unchanged
/// inside [`EnvelopeError::Validation`].
///
/// Compressed payloads are inflated up to
/// [`DEFAULT_MAX_DECODED_SIZE`](crate::config::DEFAULT_MAX_DECODED_SIZE) bytes;
/// use [`parse_message_with_config`] to choose another limit.
pub fn parse_message(
    raw: impl AsRef<[u8]>,
    expected: Option<&ExpectedType>,
    validator: Option<&dyn PayloadValidator>,
) -> Result<ParsedEnvelope> {
    parse_message_with_config(raw, expected, validator, &CodecConfig::default())
}

/// [`parse_message`] with the decode limits of `config`.
pub fn parse_message_with_config(
    raw: impl AsRef<[u8]>,
    expected: Option<&ExpectedType>,
    validator: Option<&dyn PayloadValidator>,
    config: &CodecConfig,
) -> Result<ParsedEnvelope> {
    let envelope: Envelope =
        serde_json::from_slice(raw.as_ref()).map_err(DecodeError::Envelope)?;
    parse_envelope_with_config(envelope, expected, validator, config)
}

/// Parse an already deserialized envelope.
pub fn parse_envelope(
    envelope: Envelope,
    expected: Option<&ExpectedType>,
    validator: Option<&dyn PayloadValidator>,
) -> Result<ParsedEnvelope> {
    parse_envelope_with_config(envelope, expected, validator, &CodecConfig::default())
}

/// [`parse_envelope`] with the decode limits of `config`.
pub fn parse_envelope_with_config(
    envelope: Envelope,
    expected: Option<&ExpectedType>,
    validator: Option<&dyn PayloadValidator>,
    config: &CodecConfig,
) -> Result<ParsedEnvelope> {
    let Envelope {
        data,
        metadata,
        service_identity,
    } = envelope;

    check_protocol_version(&metadata);
    let data = decode_payload(data, metadata.data_encoding, expected, config.max_decoded_size)?;

    if let Some(validator) = validator {
        validator.validate(&data).map_err(|err| {
            tracing::debug!(
                message_identifier = %metadata.message_identifier,
                error = %err,
                "payload rejected by validator"
            );
            EnvelopeError::Validation(err)
        })?;
    }

    tracing::trace!(
        message_identifier = %metadata.message_identifier,
        topic = %metadata.topic,
        data_encoding = %metadata.data_encoding,
        kind = data.kind(),
        "parsed envelope"
    );

    Ok(ParsedEnvelope {
        message_id: metadata.message_identifier.clone(),
        timestamp: metadata.timestamp,
        decoded: Decoded { data, metadata },
        service_identity,
    })
}

fn decode_payload(
    data: Value,
    encoding: DataEncoding,
    expected: Option<&ExpectedType>,
    max_decoded_size: usize,
) -> Result<DecodedData> {
    match encoding {
        DataEncoding::Raw | DataEncoding::Json => Ok(DecodedData::Json(data)),
        DataEncoding::Base64GzipJson => {
            let compressed = decode_base64(&data, encoding)?;
            let text = gunzip(&compressed, max_decoded_size)?;
            let value = serde_json::from_slice(&text).map_err(DecodeError::Payload)?;
            Ok(DecodedData::Json(value))
        }
        DataEncoding::Proto => {
            let bytes = decode_base64(&data, encoding)?;
            match expected {
                Some(expected) => expected.decode(&bytes).map(DecodedData::Proto),
                None => Ok(DecodedData::Bytes(Bytes::from(bytes))),
            }
        }
    }
}

fn decode_base64(data: &Value, encoding: DataEncoding) -> Result<Vec<u8>> {
    let encoded = data.as_str().ok_or(DecodeError::UnexpectedShape {
        encoding,
        expected: "base64 string",
    })?;
    Ok(STANDARD.decode(encoded).map_err(DecodeError::Base64)?)
}

fn gunzip(compressed: &[u8], limit: usize) -> Result<Vec<u8>> {
    let mut text = Vec::with_capacity(compressed.len().saturating_mul(4).min(limit));
    GzDecoder::new(compressed)
        .take(u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1))
        .read_to_end(&mut text)
        .map_err(DecodeError::Gzip)?;

    if text.len() > limit {
        tracing::debug!(limit, "compressed payload inflates past the limit");
        return Err(DecodeError::TooLarge { limit }.into());
    }
    Ok(text)
}

/// Returns false, after logging a warning, for a version this crate does not know.
fn check_protocol_version(metadata: &Metadata) -> bool {
    match metadata.protocol_version.as_deref() {
        Some(version) if version != PROTOCOL_VERSION => {
            tracing::warn!(
                message_identifier = %metadata.message_identifier,
                protocol_version = version,
                "envelope uses an unrecognized protocol version"
            );
            false
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const ID: &str =
        "11111111-1111-1111-1111-111111111111.22222222-2222-4222-8222-222222222222";

    fn envelope(data: Value, encoding: &str) -> String {
        json!({
            "data": data,
            "metadata": {
                "message_identifier": ID,
                "timestamp": 1_600_000_000.25,
                "topic": "topic",
                "data_encoding": encoding,
            },
            "service_identity": "11111111-1111-1111-1111-111111111111",
        })
        .to_string()
    }

    #[test]
    fn raw_and_json_decode_identically() {
        for tag in ["raw", "json"] {
            let parsed = parse_message(envelope(json!({"a": [1, 2]}), tag), None, None).unwrap();
            assert_eq!(parsed.decoded.data.as_json(), Some(&json!({"a": [1, 2]})));
            assert_eq!(parsed.message_id.as_str(), ID);
            assert_eq!(parsed.timestamp, 1_600_000_000.25);
            assert_eq!(parsed.decoded.metadata.protocol_version, None);
        }
    }

    #[test]
    fn string_payload_under_raw_is_not_reparsed() {
        let parsed = parse_message(envelope(json!("{\"a\":1}"), "raw"), None, None).unwrap();
        assert_eq!(parsed.decoded.data.as_json(), Some(&json!("{\"a\":1}")));
    }

    #[test]
    fn proto_without_expected_type_yields_bytes() {
        let parsed = parse_message(envelope(json!("CgIxMg=="), "proto"), None, None).unwrap();
        assert_eq!(parsed.decoded.data.as_bytes(), Some(&b"\n\x0212"[..]));
    }

    #[test]
    fn expected_type_is_ignored_for_json_family() {
        let expected = ExpectedType::opaque::<String>();
        let parsed =
            parse_message(envelope(json!([1]), "raw"), Some(&expected), None).unwrap();
        assert_eq!(parsed.decoded.data.as_json(), Some(&json!([1])));
    }

    #[test]
    fn malformed_envelope_is_a_decode_error() {
        let err = parse_message(b"not json", None, None).unwrap_err();
        assert!(err.is_decode());
        assert!(matches!(err, EnvelopeError::Decode(DecodeError::Envelope(_))));
    }

    #[test]
    fn unknown_encoding_is_a_decode_error() {
        let err = parse_message(envelope(json!(1), "zlib"), None, None).unwrap_err();
        assert!(matches!(err, EnvelopeError::Decode(DecodeError::Envelope(_))));
    }

    #[test]
    fn short_message_identifier_is_a_decode_error() {
        let raw = envelope(json!(1), "raw").replace(ID, "abc");
        assert!(parse_message(raw, None, None).unwrap_err().is_decode());
    }

    #[test]
    fn bad_base64_is_a_decode_error() {
        for tag in ["proto", "base64_gzip_json"] {
            let err = parse_message(envelope(json!("***"), tag), None, None).unwrap_err();
            assert!(matches!(err, EnvelopeError::Decode(DecodeError::Base64(_))));
        }
    }

    #[test]
    fn non_gzip_bytes_are_a_decode_error() {
        let data = STANDARD.encode(b"plain text");
        let err =
            parse_message(envelope(json!(data), "base64_gzip_json"), None, None).unwrap_err();
        assert!(matches!(err, EnvelopeError::Decode(DecodeError::Gzip(_))));
    }

    fn gzip_base64(text: &[u8]) -> String {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text).unwrap();
        STANDARD.encode(encoder.finish().unwrap())
    }

    #[test]
    fn gzip_wrapping_non_json_is_a_payload_error() {
        let data = gzip_base64(b"{not json");
        let err =
            parse_message(envelope(json!(data), "base64_gzip_json"), None, None).unwrap_err();
        assert!(matches!(err, EnvelopeError::Decode(DecodeError::Payload(_))));
    }

    #[test]
    fn inflated_payload_is_bounded() {
        // 1 MiB of zeros compresses to about a kilobyte.
        let text = format!("\"{}\"", "0".repeat(1024 * 1024));
        let data = gzip_base64(text.as_bytes());
        assert!(data.len() < 8 * 1024);
        let raw = envelope(json!(data), "base64_gzip_json");

        let small = CodecConfig {
            max_decoded_size: 64 * 1024,
            ..CodecConfig::default()
        };
        let err = parse_message_with_config(&raw, None, None, &small).unwrap_err();
        assert!(matches!(
            err,
            EnvelopeError::Decode(DecodeError::TooLarge { limit: 65_536 })
        ));

        let exact = CodecConfig {
            max_decoded_size: text.len(),
            ..CodecConfig::default()
        };
        let parsed = parse_message_with_config(&raw, None, None, &exact).unwrap();
        let decoded = parsed.decoded.data.as_json().and_then(Value::as_str);
        assert_eq!(decoded.map(str::len), Some(1024 * 1024));

        let below = CodecConfig {
            max_decoded_size: text.len() - 1,
            ..CodecConfig::default()
        };
        assert!(parse_message_with_config(&raw, None, None, &below).is_err());
    }

    #[test]
    fn unknown_protocol_version_warns_but_parses() {
        let mut value: Value = serde_json::from_str(&envelope(json!(1), "raw")).unwrap();
        value["metadata"]["protocol_version"] = json!("pubprims-envelope--9.0.0");
        let raw = value.to_string();

        let parsed = parse_message(&raw, None, None).unwrap();
        assert_eq!(parsed.decoded.data.as_json(), Some(&json!(1)));
        assert!(!check_protocol_version(&parsed.decoded.metadata));

        let mut current = parsed.decoded.metadata.clone();
        current.protocol_version = Some(PROTOCOL_VERSION.to_string());
        assert!(check_protocol_version(&current));
        current.protocol_version = None;
        assert!(check_protocol_version(&current));
    }

    #[test]
    fn non_string_data_for_binary_encodings_is_a_decode_error() {
        let err = parse_message(envelope(json!({"x": 1}), "proto"), None, None).unwrap_err();
        assert!(matches!(
            err,
            EnvelopeError::Decode(DecodeError::UnexpectedShape {
                encoding: DataEncoding::Proto,
                ..
            })
        ));
    }

    #[test]
    fn validator_sees_decoded_payload() {
        let validator = |data: &DecodedData| {
            if data.as_json() == Some(&json!({"ok": true})) {
                Ok(())
            } else {
                Err(pubprims_validate::ValidationError::failed("not ok"))
            }
        };

        assert!(parse_message(envelope(json!({"ok": true}), "raw"), None, Some(&validator)).is_ok());

        let err = parse_message(envelope(json!({"ok": false}), "raw"), None, Some(&validator))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            err.as_validation(),
            Some(&pubprims_validate::ValidationError::failed("not ok"))
        );
    }

    #[test]
    fn into_parts_returns_triple() {
        let (decoded, id, timestamp) = parse_message(envelope(json!(1), "raw"), None, None)
            .unwrap()
            .into_parts();
        assert_eq!(decoded.metadata.topic, "topic");
        assert_eq!(id.origin(), "11111111-1111-1111-1111-111111111111");
        assert_eq!(timestamp, 1_600_000_000.25);
    }
}
