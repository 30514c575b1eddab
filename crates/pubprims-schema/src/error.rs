/// Errors that can occur while loading schemas or validating payloads.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A schema file could not be loaded.
    #[error("failed to load schema: {0}")]
    LoadFailed(String),

    /// A schema could not be compiled.
    #[error("failed to compile schema: {0}")]
    CompileFailed(String),

    /// The payload does not satisfy the topic schema.
    #[error("validation failed on topic {topic}: {message}")]
    ValidationFailed { topic: String, message: String },

    /// Schema text is not valid JSON.
    #[error("schema is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// No schema registered for the topic.
    #[error("no schema registered for topic {0}")]
    NoSchema(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
