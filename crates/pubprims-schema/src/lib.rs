//! Topic-keyed JSON Schema validators for inbound envelopes.
//!
//! Validate decoded JSON payloads against JSON Schema 2020-12, one schema
//! per topic. A [`TopicValidator`] plugs into the envelope parser like any
//! other payload validator, so schema violations surface as validation
//! errors rather than decode errors.
//!
//! This crate is optional. Use it when topics carry schema-enforced
//! contracts between services.

pub mod config;
pub mod error;
pub mod registry;
pub mod validator;

pub use config::RegistryConfig;
pub use error::{Result, SchemaError};
pub use registry::{SchemaRegistry, SCHEMA_FILE_SUFFIX};
pub use validator::TopicValidator;
