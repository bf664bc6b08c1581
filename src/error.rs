// ⚠️ Field Errors - malformed input that aborts a file load
// Validation rejections are NOT errors; see validation.rs

use thiserror::Error;

/// Raised by the field parsers on malformed but non-empty input.
/// Each variant carries the offending raw text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("invalid gender: {0}")]
    InvalidGender(String),

    #[error("invalid confirmation date: {0}")]
    InvalidConfirmationDate(String),

    #[error("invalid birth date: {0}")]
    InvalidBirthDate(String),

    #[error("invalid postal code: {0}")]
    InvalidPostalCode(String),
}

impl FieldError {
    /// Name of the column the error originates from
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::InvalidGender(_) => "gender",
            FieldError::InvalidConfirmationDate(_) => "confirmed_membership_at",
            FieldError::InvalidBirthDate(_) => "birth_date",
            FieldError::InvalidPostalCode(_) => "address_postal_code",
        }
    }

    /// The raw text that failed to parse
    pub fn raw(&self) -> &str {
        match self {
            FieldError::InvalidGender(raw)
            | FieldError::InvalidConfirmationDate(raw)
            | FieldError::InvalidBirthDate(raw)
            | FieldError::InvalidPostalCode(raw) => raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_carries_raw_text() {
        let err = FieldError::InvalidPostalCode("abc".to_string());
        assert_eq!(err.to_string(), "invalid postal code: abc");
        assert_eq!(err.raw(), "abc");
        assert_eq!(err.field(), "address_postal_code");
    }
}
