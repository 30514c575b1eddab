//! Message envelopes for services talking over pub/sub and queues.
//!
//! pubprims builds self-describing, transport-safe envelopes around
//! application payloads and turns received envelopes back into payloads,
//! with optional type and content validation on the way in.
//!
//! # Crate Structure
//!
//! - [`envelope`]: Envelope builder, parser, identifiers and encodings
//! - [`validate`]: Field assertion primitives for payload validators
//! - [`schema`]: Topic-keyed JSON Schema validators (behind `schema` feature)

/// Re-export envelope types.
pub mod envelope {
    pub use pubprims_envelope::*;
}

/// Re-export field validation helpers.
pub mod validate {
    pub use pubprims_validate::*;
}

/// Re-export schema types (requires `schema` feature).
#[cfg(feature = "schema")]
pub mod schema {
    pub use pubprims_schema::*;
}
