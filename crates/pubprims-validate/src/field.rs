use regex::Regex;

use crate::error::{Result, ValidationError};

/// A compiled pattern that must match a field value in full.
///
/// Use this when a validator checks the same pattern on every message;
/// [`validate_field_regex`] compiles the pattern on each call.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    pattern: String,
    regex: Regex,
}

impl FieldPattern {
    /// Compile a pattern. The whole value must match, as if the pattern were
    /// wrapped in `^(?:...)$`.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|err| {
            ValidationError::InvalidPattern {
                pattern: pattern.to_string(),
                message: err.to_string(),
            }
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as given by the caller.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Returns true if `value` fully matches.
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// Fail with [`ValidationError::RegexMismatch`] unless `value` fully matches.
    pub fn check(&self, value: &str) -> Result<()> {
        if self.is_match(value) {
            return Ok(());
        }

        tracing::debug!(pattern = %self.pattern, "field rejected by pattern");
        Err(ValidationError::RegexMismatch {
            value: value.to_string(),
            pattern: self.pattern.clone(),
        })
    }
}

/// Fail with [`ValidationError::RegexMismatch`] unless `value` fully matches `pattern`.
pub fn validate_field_regex(value: &str, pattern: &str) -> Result<()> {
    FieldPattern::new(pattern)?.check(value)
}

/// Check the character count of `value` against optional bounds.
pub fn validate_field_length(value: &str, min: Option<usize>, max: Option<usize>) -> Result<()> {
    let len = value.chars().count();

    if let Some(min) = min {
        if len < min {
            return Err(ValidationError::TooSmall { len, min });
        }
    }
    if let Some(max) = max {
        if len > max {
            return Err(ValidationError::TooLarge { len, max });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_value_passes() {
        assert!(validate_field_regex("John Doe", r"^[a-zA-Z ]+$").is_ok());
        assert!(validate_field_regex("#a0b1c2", r"^(#?[a-fA-F0-9]{6}|)$").is_ok());
        assert!(validate_field_regex("", r"^(#?[a-fA-F0-9]{6}|)$").is_ok());
    }

    #[test]
    fn mismatch_reports_value_and_pattern() {
        let err = validate_field_regex("John Doe", r"^(#?[a-fA-F0-9]{6}|)$").unwrap_err();
        assert_eq!(
            err,
            ValidationError::RegexMismatch {
                value: "John Doe".to_string(),
                pattern: r"^(#?[a-fA-F0-9]{6}|)$".to_string(),
            }
        );
    }

    #[test]
    fn unanchored_pattern_must_match_whole_value() {
        assert!(validate_field_regex("abc", "abc").is_ok());
        assert!(validate_field_regex("xabcx", "abc").is_err());
        assert!(validate_field_regex("abcabc", "abc").is_err());
    }

    #[test]
    fn alternation_is_not_satisfied_by_a_prefix() {
        // Leftmost-first would pick "a" here; the anchored form must still see "ab".
        assert!(validate_field_regex("ab", "a|ab").is_ok());
        assert!(validate_field_regex("abc", "a|ab").is_err());
    }

    #[test]
    fn invalid_pattern_is_reported() {
        assert!(matches!(
            validate_field_regex("x", "(unclosed"),
            Err(ValidationError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn field_pattern_is_reusable() {
        let pattern = FieldPattern::new(r"[0-9]+").unwrap();
        assert_eq!(pattern.as_str(), "[0-9]+");
        assert!(pattern.check("12").is_ok());
        assert!(pattern.check("1a").is_err());
        assert!(pattern.is_match("000"));
    }

    #[test]
    fn length_bounds() {
        assert!(validate_field_length("abc", Some(1), Some(3)).is_ok());
        assert!(validate_field_length("abc", None, None).is_ok());
        assert_eq!(
            validate_field_length("ab", Some(3), None),
            Err(ValidationError::TooSmall { len: 2, min: 3 })
        );
        assert_eq!(
            validate_field_length("abcd", None, Some(3)),
            Err(ValidationError::TooLarge { len: 4, max: 3 })
        );
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        assert!(validate_field_length("åäö", None, Some(3)).is_ok());
    }
}
