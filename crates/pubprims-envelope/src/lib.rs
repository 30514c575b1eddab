//! Self-describing message envelopes for pub/sub and queue transports.
//!
//! An envelope wraps an application payload with everything a receiver needs
//! to decode and trace it:
//! - a 73-character message identifier rooted in the producer's identity
//! - a build timestamp and the topic
//! - a data encoding tag (`raw`, `json`, `base64_gzip_json`, `proto`)
//!
//! Building and parsing are pure functions. Large JSON payloads are
//! compressed; protobuf payloads travel as base64 and are decoded into the
//! type the receiver expects, or handed back as bytes when it expects none.
//!
//! ```
//! use pubprims_envelope::{build_message, parse_message, CodecConfig, Payload, ServiceIdentity};
//! use serde_json::json;
//!
//! let identity = ServiceIdentity::parse("11111111-1111-1111-1111-111111111111").unwrap();
//! let message = build_message(
//!     &identity,
//!     "topic",
//!     Payload::Json(json!({"key": "value"})),
//!     &CodecConfig::default(),
//! )
//! .unwrap();
//!
//! let parsed = parse_message(&message, None, None).unwrap();
//! assert_eq!(parsed.decoded.data.as_json(), Some(&json!({"key": "value"})));
//! assert_eq!(parsed.message_id.origin(), identity.to_string());
//! ```

pub mod builder;
pub mod codec;
pub mod config;
pub mod encoding;
pub mod envelope;
pub mod error;
pub mod expected;
pub mod identity;
#[cfg(feature = "async")]
pub mod offload;
pub mod parser;
pub mod payload;
pub mod validator;

pub use builder::{build_envelope, build_message};
pub use codec::MessageCodec;
pub use config::{
    CodecConfig, DEFAULT_COMPRESSION_LEVEL, DEFAULT_COMPRESSION_THRESHOLD, DEFAULT_MAX_DECODED_SIZE,
};
pub use encoding::DataEncoding;
pub use envelope::{Envelope, Metadata, PROTOCOL_VERSION};
pub use error::{DecodeError, EnvelopeError, Result};
pub use expected::ExpectedType;
pub use identity::{MessageId, ServiceIdentity, IDENTITY_LEN, MESSAGE_ID_LEN, MESSAGE_ID_SEPARATOR};
#[cfg(feature = "async")]
pub use offload::{build_message_async, parse_message_async, SharedValidator};
pub use parser::{
    parse_envelope, parse_envelope_with_config, parse_message, parse_message_with_config, Decoded,
    ParsedEnvelope,
};
pub use payload::{DecodedData, Payload, ProtoMessage};
pub use pubprims_validate::ValidationError;
pub use validator::PayloadValidator;
