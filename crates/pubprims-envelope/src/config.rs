use serde::{Deserialize, Serialize};

use crate::encoding::DataEncoding;
use crate::error::{EnvelopeError, Result};

/// Default compression threshold: envelopes of 60 000 bytes or more carry a compressed payload.
pub const DEFAULT_COMPRESSION_THRESHOLD: usize = 60_000;

/// Default limit on an inflated `base64_gzip_json` payload (16 MiB).
pub const DEFAULT_MAX_DECODED_SIZE: usize = 16 * 1024 * 1024;

/// Default gzip level.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Controls how the builder encodes JSON payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// JSON payloads are gzip-compressed when the serialized envelope would be
    /// at least this many bytes.
    pub compression_threshold: usize,
    /// Tag written for uncompressed JSON payloads: `raw` or `json`.
    pub text_encoding: DataEncoding,
    /// gzip level, 0-9.
    pub compression_level: u32,
    /// Largest payload the parser will inflate from `base64_gzip_json`.
    pub max_decoded_size: usize,
}

impl CodecConfig {
    /// Check that the configuration can be used by the builder.
    pub fn validate(&self) -> Result<()> {
        if self.compression_threshold == 0 {
            return Err(EnvelopeError::InvalidConfig(
                "compression_threshold must be greater than zero".to_string(),
            ));
        }
        if !self.text_encoding.is_text() {
            return Err(EnvelopeError::InvalidConfig(format!(
                "text_encoding must be raw or json, got {}",
                self.text_encoding
            )));
        }
        if self.compression_level > 9 {
            return Err(EnvelopeError::InvalidConfig(format!(
                "compression_level must be 0-9, got {}",
                self.compression_level
            )));
        }
        if self.max_decoded_size == 0 {
            return Err(EnvelopeError::InvalidConfig(
                "max_decoded_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|err| EnvelopeError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            compression_threshold: DEFAULT_COMPRESSION_THRESHOLD,
            text_encoding: DataEncoding::Raw,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            max_decoded_size: DEFAULT_MAX_DECODED_SIZE,
        }
    }
}
