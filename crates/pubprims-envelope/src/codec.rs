use crate::builder::{build_envelope, build_message};
use crate::config::CodecConfig;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::expected::ExpectedType;
use crate::identity::ServiceIdentity;
use crate::parser::{parse_message_with_config, ParsedEnvelope};
use crate::payload::Payload;
use crate::validator::PayloadValidator;

/// Envelope codec bound to one producing service.
///
/// Holds only immutable settings, so one instance can be shared by every
/// handler of a service.
#[derive(Debug, Clone)]
pub struct MessageCodec {
    identity: ServiceIdentity,
    config: CodecConfig,
}

impl MessageCodec {
    /// Create a codec with default configuration.
    pub fn new(identity: ServiceIdentity) -> Self {
        Self {
            identity,
            config: CodecConfig::default(),
        }
    }

    /// Create a codec with explicit configuration.
    pub fn with_config(identity: ServiceIdentity, config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { identity, config })
    }

    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Build an envelope without serializing it.
    pub fn build_envelope(&self, topic: &str, payload: Payload) -> Result<Envelope> {
        build_envelope(&self.identity, topic, payload, &self.config)
    }

    /// Build and serialize an envelope.
    pub fn build(&self, topic: &str, payload: Payload) -> Result<String> {
        build_message(&self.identity, topic, payload, &self.config)
    }

    /// Parse an envelope from any producer, inflating at most
    /// `config.max_decoded_size` bytes.
    pub fn parse(
        &self,
        raw: impl AsRef<[u8]>,
        expected: Option<&ExpectedType>,
        validator: Option<&dyn PayloadValidator>,
    ) -> Result<ParsedEnvelope> {
        parse_message_with_config(raw, expected, validator, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::encoding::DataEncoding;
    use crate::error::EnvelopeError;

    #[test]
    fn build_then_parse() {
        let codec = MessageCodec::new(ServiceIdentity::new_random());
        let message = codec.build("topic", json!({"n": 1}).into()).unwrap();
        let parsed = codec.parse(&message, None, None).unwrap();

        assert_eq!(parsed.decoded.data.as_json(), Some(&json!({"n": 1})));
        assert_eq!(parsed.message_id.origin(), codec.identity().to_string());
        assert_eq!(parsed.service_identity, codec.identity().to_string());
    }

    #[test]
    fn config_is_validated_and_applied() {
        let identity = ServiceIdentity::new_random();
        let bad = CodecConfig {
            compression_level: 11,
            ..CodecConfig::default()
        };
        assert!(matches!(
            MessageCodec::with_config(identity, bad),
            Err(EnvelopeError::InvalidConfig(_))
        ));

        let tiny = CodecConfig {
            compression_threshold: 1,
            ..CodecConfig::default()
        };
        let codec = MessageCodec::with_config(identity, tiny).unwrap();
        let envelope = codec.build_envelope("topic", json!("x").into()).unwrap();
        assert_eq!(envelope.metadata.data_encoding, DataEncoding::Base64GzipJson);
    }

    #[test]
    fn parse_applies_decoded_size_limit() {
        let identity = ServiceIdentity::new_random();
        let producer = MessageCodec::new(identity);
        let message = producer.build("topic", json!("z".repeat(100_000)).into()).unwrap();

        let strict = CodecConfig {
            max_decoded_size: 50_000,
            ..CodecConfig::default()
        };
        let receiver = MessageCodec::with_config(identity, strict).unwrap();
        let err = receiver.parse(&message, None, None).unwrap_err();
        assert!(matches!(
            err,
            EnvelopeError::Decode(crate::error::DecodeError::TooLarge { limit: 50_000 })
        ));

        assert!(producer.parse(&message, None, None).is_ok());
    }
}
