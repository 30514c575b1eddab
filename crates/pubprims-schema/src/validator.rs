use std::sync::Arc;

use pubprims_envelope::{DecodedData, PayloadValidator};
use pubprims_validate::ValidationError;

use crate::registry::SchemaRegistry;

/// Validates decoded payloads against the schema of one topic.
///
/// Pass it to the envelope parser for messages received on `topic`.
/// Non-JSON payloads are rejected.
#[derive(Clone)]
pub struct TopicValidator {
    registry: Arc<SchemaRegistry>,
    topic: String,
}

impl TopicValidator {
    pub fn new(registry: Arc<SchemaRegistry>, topic: impl Into<String>) -> Self {
        Self {
            registry,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl PayloadValidator for TopicValidator {
    fn validate(&self, data: &DecodedData) -> Result<(), ValidationError> {
        let value = data.as_json().ok_or_else(|| {
            ValidationError::failed(format!(
                "topic {} expects a JSON payload, got {}",
                self.topic,
                data.kind()
            ))
        })?;

        self.registry
            .validate(&self.topic, value)
            .map_err(|err| ValidationError::failed(err.to_string()))
    }
}
