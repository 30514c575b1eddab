/// Errors raised by field validators.
///
/// These are validation verdicts, not decode failures: the message was read
/// correctly but its contents were rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The value does not fully match the required pattern.
    #[error("value {value:?} does not match pattern {pattern:?}")]
    RegexMismatch { value: String, pattern: String },

    /// The pattern itself could not be compiled.
    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// The value is shorter than the minimum length.
    #[error("value too short ({len} chars, min {min})")]
    TooSmall { len: usize, min: usize },

    /// The value is longer than the maximum length.
    #[error("value too long ({len} chars, max {max})")]
    TooLarge { len: usize, max: usize },

    /// General validator failure.
    #[error("validation failed: {0}")]
    Failed(String),
}

impl ValidationError {
    /// Build a general validation failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;
