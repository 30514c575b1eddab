//! Field assertion primitives for inbound message validators.
//!
//! Validators passed to the envelope parser are plain functions. The helpers
//! here give them a common vocabulary for rejecting a field:
//!
//! ```
//! use pubprims_validate::{validate_field_regex, ValidationError};
//!
//! assert!(validate_field_regex("John Doe", r"^[a-zA-Z ]+$").is_ok());
//! assert!(matches!(
//!     validate_field_regex("John Doe", r"^(#?[a-fA-F0-9]{6}|)$"),
//!     Err(ValidationError::RegexMismatch { .. })
//! ));
//! ```

pub mod error;
pub mod field;

pub use error::{Result, ValidationError};
pub use field::{validate_field_length, validate_field_regex, FieldPattern};
