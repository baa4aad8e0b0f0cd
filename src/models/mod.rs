pub mod appointment;
pub mod employee;
pub mod enums;
pub mod examination;
pub mod patient;
pub mod schedule;

pub use appointment::*;
pub use employee::*;
pub use enums::*;
pub use examination::*;
pub use patient::*;
pub use schedule::*;

use std::sync::LazyLock;

use regex::Regex;

/// A required field is missing or malformed. Raised before any database access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn required(field: &str) -> Self {
        Self(format!("Required {field}"))
    }
}

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$").unwrap()
});

pub(crate) fn require_text(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

pub(crate) fn require_id(value: i64, field: &str) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

pub(crate) fn require_email(email: &str) -> Result<(), ValidationError> {
    require_text(email, "Email")?;
    if !EMAIL_PATTERN.is_match(email.trim()) {
        return Err(ValidationError("Invalid Email".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format_accepts_common_addresses() {
        assert!(require_email("purna@gmail.com").is_ok());
        assert!(require_email("dr.bob+clinic@hospital.co.id").is_ok());
    }

    #[test]
    fn email_format_rejects_garbage() {
        assert_eq!(
            require_email("not-an-email"),
            Err(ValidationError("Invalid Email".into()))
        );
        assert_eq!(require_email("   "), Err(ValidationError::required("Email")));
        assert!(require_email("a@b").is_err());
    }

    #[test]
    fn whitespace_counts_as_missing() {
        assert_eq!(
            require_text(" \t", "Day Name"),
            Err(ValidationError("Required Day Name".into()))
        );
    }
}
