use std::fmt;
use std::io;

use pubprims_envelope::EnvelopeError;
use pubprims_schema::SchemaError;

// Process exit codes. Data errors and usage errors follow sysexits.h.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

/// Validation rejections exit 1 so scripts can tell them from malformed input.
pub fn envelope_error(context: &str, err: EnvelopeError) -> CliError {
    let code = match &err {
        EnvelopeError::Validation(_) => FAILURE,
        EnvelopeError::Decode(_)
        | EnvelopeError::SchemaMismatch { .. }
        | EnvelopeError::Serialization(_) => DATA_INVALID,
        EnvelopeError::InvalidIdentity(_)
        | EnvelopeError::InvalidTopic
        | EnvelopeError::InvalidConfig(_) => USAGE,
        #[allow(unreachable_patterns)]
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn schema_error(context: &str, err: SchemaError) -> CliError {
    let code = match &err {
        SchemaError::LoadFailed(_) | SchemaError::CompileFailed(_) | SchemaError::InvalidJson(_) => {
            USAGE
        }
        SchemaError::ValidationFailed { .. } | SchemaError::NoSchema(_) => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}
