//! Shared validation helpers for gallery drafts.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static CREATION_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("valid date regex")
});

/// Validation failures for user/album/picture drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is empty after trimming. Carries the entity kind.
    EmptyName(&'static str),
    /// Album creation date does not match `YYYY-MM-DD`.
    InvalidCreationDate(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName(kind) => write!(f, "{kind} name cannot be empty"),
            Self::InvalidCreationDate(value) => {
                write!(f, "invalid creation date `{value}`; expected YYYY-MM-DD")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims a display name and rejects empty results.
pub fn normalize_name(kind: &'static str, name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName(kind));
    }
    Ok(trimmed.to_string())
}

/// Checks a `YYYY-MM-DD` creation date.
pub fn validate_creation_date(value: &str) -> Result<(), ValidationError> {
    if CREATION_DATE_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCreationDate(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, validate_creation_date, ValidationError};

    #[test]
    fn normalize_name_trims_surrounding_whitespace() {
        assert_eq!(normalize_name("album", "  Trip \t").unwrap(), "Trip");
    }

    #[test]
    fn normalize_name_rejects_blank_input() {
        assert_eq!(
            normalize_name("user", "   ").unwrap_err(),
            ValidationError::EmptyName("user")
        );
    }

    #[test]
    fn creation_date_requires_calendar_shape() {
        assert!(validate_creation_date("2023-01-01").is_ok());
        assert!(validate_creation_date("2023-12-31").is_ok());
        assert!(validate_creation_date("2023-13-01").is_err());
        assert!(validate_creation_date("2023-1-1").is_err());
        assert!(validate_creation_date("yesterday").is_err());
    }
}
