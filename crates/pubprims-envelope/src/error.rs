use pubprims_validate::ValidationError;

use crate::encoding::DataEncoding;

/// Errors that can occur while building or parsing an envelope.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The payload cannot be represented as JSON.
    #[error("payload serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The origin identity is not a 36-character UUID.
    #[error("invalid service identity: {0}")]
    InvalidIdentity(String),

    /// The topic is empty.
    #[error("topic must not be empty")]
    InvalidTopic,

    /// The codec configuration is inconsistent.
    #[error("invalid codec config: {0}")]
    InvalidConfig(String),

    /// The envelope or its payload is malformed.
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// The expected type cannot describe a `proto` payload.
    #[error("schema mismatch for {expected}: {reason}")]
    SchemaMismatch {
        expected: &'static str,
        reason: String,
    },

    /// A caller-supplied validator rejected the payload.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The worker running an offloaded build or parse did not complete.
    #[cfg(feature = "async")]
    #[error("codec worker failed: {0}")]
    Worker(String),
}

impl EnvelopeError {
    /// True for malformed input at parse time.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// True when a validator rejected an otherwise well-formed message.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The validator's verdict, if this error carries one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Malformed wire structure found while parsing.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The outer envelope is not valid JSON or lacks required members.
    #[error("invalid envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    /// The `data` member is not valid base64.
    #[error("invalid base64 data: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The compressed payload could not be inflated.
    #[error("invalid gzip data: {0}")]
    Gzip(#[from] std::io::Error),

    /// The decoded payload text is not valid JSON.
    #[error("invalid payload JSON: {0}")]
    Payload(#[source] serde_json::Error),

    /// The inflated payload is larger than the configured limit.
    #[error("decoded payload exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// The `data` member has the wrong JSON type for its encoding.
    #[error("{encoding} data must be a {expected}")]
    UnexpectedShape {
        encoding: DataEncoding,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, EnvelopeError>;
