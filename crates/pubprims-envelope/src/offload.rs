//! Run builds and parses on tokio's blocking pool.
//!
//! Compression and decoding are CPU-bound. Under heavy load a service can
//! move them off its async workers; the envelope is returned whole or not at
//! all.

use std::sync::Arc;

use tokio::task::JoinError;

use crate::builder::build_message;
use crate::codec::MessageCodec;
use crate::config::CodecConfig;
use crate::error::{EnvelopeError, Result};
use crate::expected::ExpectedType;
use crate::identity::ServiceIdentity;
use crate::parser::{parse_message_with_config, ParsedEnvelope};
use crate::payload::Payload;
use crate::validator::PayloadValidator;

/// A validator that can move to a worker thread.
pub type SharedValidator = Arc<dyn PayloadValidator + Send + Sync>;

/// [`build_message`] on the blocking pool.
pub async fn build_message_async(
    identity: ServiceIdentity,
    topic: String,
    payload: Payload,
    config: CodecConfig,
) -> Result<String> {
    tokio::task::spawn_blocking(move || build_message(&identity, &topic, payload, &config))
        .await
        .map_err(worker_error)?
}

/// [`parse_message`](crate::parser::parse_message) on the blocking pool.
pub async fn parse_message_async(
    raw: Vec<u8>,
    expected: Option<ExpectedType>,
    validator: Option<SharedValidator>,
) -> Result<ParsedEnvelope> {
    parse_blocking(raw, expected, validator, CodecConfig::default()).await
}

async fn parse_blocking(
    raw: Vec<u8>,
    expected: Option<ExpectedType>,
    validator: Option<SharedValidator>,
    config: CodecConfig,
) -> Result<ParsedEnvelope> {
    tokio::task::spawn_blocking(move || {
        let validator = validator.as_deref().map(|v| v as &dyn PayloadValidator);
        parse_message_with_config(&raw, expected.as_ref(), validator, &config)
    })
    .await
    .map_err(worker_error)?
}

impl MessageCodec {
    /// Build and serialize an envelope on the blocking pool.
    pub async fn build_async(&self, topic: impl Into<String>, payload: Payload) -> Result<String> {
        build_message_async(*self.identity(), topic.into(), payload, *self.config()).await
    }

    /// Parse an envelope on the blocking pool.
    pub async fn parse_async(
        &self,
        raw: impl Into<Vec<u8>>,
        expected: Option<ExpectedType>,
        validator: Option<SharedValidator>,
    ) -> Result<ParsedEnvelope> {
        parse_blocking(raw.into(), expected, validator, *self.config()).await
    }
}

fn worker_error(err: JoinError) -> EnvelopeError {
    tracing::error!(error = %err, "codec worker did not complete");
    EnvelopeError::Worker(err.to_string())
}
