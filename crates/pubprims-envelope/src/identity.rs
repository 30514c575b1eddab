//! Origin identities and message identifiers.
//!
//! A message identifier is the producer's 36-character identity, a `.`
//! separator, and a fresh 36-character UUIDv4 token:
//!
//! ```text
//! 11111111-1111-1111-1111-111111111111.0b7e4c1d-5f0a-4e3b-9d2c-6a8f1e2d3c4b
//! └────────────── origin (36) ───────┘│└────────────── token (36) ─────────┘
//!                                     separator
//! ```
//!
//! Every identifier is traceable to its producer and unique without a shared
//! counter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EnvelopeError, Result};

/// Length of an origin identity and of a message token.
pub const IDENTITY_LEN: usize = 36;

/// Separator between origin identity and token.
pub const MESSAGE_ID_SEPARATOR: char = '.';

/// Length of a complete message identifier.
pub const MESSAGE_ID_LEN: usize = IDENTITY_LEN * 2 + 1;

/// Identity of a producing process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceIdentity(Uuid);

impl ServiceIdentity {
    /// Generate a fresh random identity.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a hyphenated 36-character identity.
    ///
    /// Upper-case hex is accepted; the identity is always rendered lower-case.
    pub fn parse(input: &str) -> Result<Self> {
        if input.len() != IDENTITY_LEN {
            return Err(EnvelopeError::InvalidIdentity(format!(
                "expected {IDENTITY_LEN} characters, got {}",
                input.len()
            )));
        }

        Uuid::parse_str(input)
            .map(Self)
            .map_err(|err| EnvelopeError::InvalidIdentity(format!("{input}: {err}")))
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ServiceIdentity {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for ServiceIdentity {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ServiceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

/// A 73-character message identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageId(String);

impl MessageId {
    /// Issue a new identifier for a message produced by `origin`.
    pub fn generate(origin: &ServiceIdentity) -> Self {
        Self(format!(
            "{origin}{MESSAGE_ID_SEPARATOR}{}",
            Uuid::new_v4().hyphenated()
        ))
    }

    /// Validate an identifier received off the wire.
    pub fn parse(input: &str) -> std::result::Result<Self, String> {
        if input.len() != MESSAGE_ID_LEN || !input.is_ascii() {
            return Err(format!(
                "message identifier must be {MESSAGE_ID_LEN} ASCII characters, got {:?}",
                input
            ));
        }
        if input.as_bytes()[IDENTITY_LEN] != MESSAGE_ID_SEPARATOR as u8 {
            return Err(format!(
                "message identifier has no '{MESSAGE_ID_SEPARATOR}' at offset {IDENTITY_LEN}: {input:?}"
            ));
        }

        Ok(Self(input.to_string()))
    }

    /// The producer's identity.
    pub fn origin(&self) -> &str {
        &self.0[..IDENTITY_LEN]
    }

    /// The per-message token.
    pub fn token(&self) -> &str {
        &self.0[IDENTITY_LEN + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MessageId {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MessageId> for String {
    fn from(id: MessageId) -> Self {
        id.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "11111111-1111-1111-1111-111111111111";

    #[test]
    fn identity_round_trips_through_display() {
        let identity = ServiceIdentity::parse(ORIGIN).unwrap();
        assert_eq!(identity.to_string(), ORIGIN);
        assert_eq!(identity.to_string().len(), IDENTITY_LEN);
    }

    #[test]
    fn identity_is_rendered_lower_case() {
        let identity = ServiceIdentity::parse("AAAAAAAA-BBBB-4CCC-8DDD-EEEEEEEEEEEE").unwrap();
        assert_eq!(identity.to_string(), "aaaaaaaa-bbbb-4ccc-8ddd-eeeeeeeeeeee");
    }

    #[test]
    fn identity_rejects_other_uuid_forms() {
        assert!(ServiceIdentity::parse("11111111111111111111111111111111").is_err());
        assert!(ServiceIdentity::parse("{11111111-1111-1111-1111-111111111111}").is_err());
        assert!(ServiceIdentity::parse("not-a-uuid-not-a-uuid-not-a-uuid-xxx").is_err());
        assert!(ServiceIdentity::parse("").is_err());
    }

    #[test]
    fn generated_ids_carry_origin() {
        let identity = ServiceIdentity::parse(ORIGIN).unwrap();
        let id = MessageId::generate(&identity);

        assert_eq!(id.as_str().len(), MESSAGE_ID_LEN);
        assert_eq!(id.origin(), ORIGIN);
        assert_eq!(id.token().len(), IDENTITY_LEN);
        assert!(Uuid::parse_str(id.token()).is_ok());
        assert!(MessageId::parse(id.as_str()).is_ok());
    }

    #[test]
    fn generated_ids_are_unique() {
        let identity = ServiceIdentity::new_random();
        let a = MessageId::generate(&identity);
        let b = MessageId::generate(&identity);
        assert_ne!(a, b);
        assert_eq!(a.origin(), b.origin());
    }

    #[test]
    fn parse_rejects_bad_length_and_separator() {
        assert!(MessageId::parse("short").is_err());

        let mut wrong_sep = format!("{ORIGIN}.{ORIGIN}");
        wrong_sep.replace_range(IDENTITY_LEN..IDENTITY_LEN + 1, "-");
        assert!(MessageId::parse(&wrong_sep).is_err());
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let valid = format!("\"{ORIGIN}.{ORIGIN}\"");
        let id: MessageId = serde_json::from_str(&valid).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), valid);

        assert!(serde_json::from_str::<MessageId>("\"abc\"").is_err());
    }
}
