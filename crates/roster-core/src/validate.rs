//! Form validation. Runs before any identity request is built.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Something, an `@`, something, a dot, something. No whitespace.
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("Invalid email regex"));

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingField("email"));
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField("password"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Email first, then password; the first failure wins.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    validate_email(email)?;
    validate_password(password)
}

pub fn validate_provider_token(token: &str) -> Result<(), ValidationError> {
    if token.trim().is_empty() {
        return Err(ValidationError::MissingField("provider token"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("  ana@example.com ").is_ok());
        assert_eq!(
            validate_email("ana@example"),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            validate_email("ana example.com"),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            validate_email(""),
            Err(ValidationError::MissingField("email"))
        );
    }

    #[test]
    fn test_password_length_counts_chars() {
        assert!(validate_password("secret").is_ok());
        assert_eq!(
            validate_password("short"),
            Err(ValidationError::PasswordTooShort { min: 6 })
        );
        // Six multi-byte characters.
        assert!(validate_password("ääääää").is_ok());
    }

    #[test]
    fn test_credentials_report_email_first() {
        assert_eq!(
            validate_credentials("bad", "x"),
            Err(ValidationError::InvalidEmail)
        );
    }
}
