use pubprims_validate::ValidationError;

use crate::payload::DecodedData;

/// Semantic check run on a decoded payload before it is returned.
///
/// Implemented for any `Fn(&DecodedData) -> Result<(), ValidationError>`, so
/// plain closures can be passed to the parser.
pub trait PayloadValidator {
    fn validate(&self, data: &DecodedData) -> Result<(), ValidationError>;
}

impl<F> PayloadValidator for F
where
    F: Fn(&DecodedData) -> Result<(), ValidationError>,
{
    fn validate(&self, data: &DecodedData) -> Result<(), ValidationError> {
        self(data)
    }
}
