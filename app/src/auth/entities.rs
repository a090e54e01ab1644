use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct HashError(pub(crate) String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password is required")]
    Missing,
    #[error("password must be at least {} characters long", MIN_PASSWORD_LENGTH)]
    TooShort,
}

/// A plain-text password that passed validation. Never stored or logged.
pub struct Password(String);

impl Password {
    /// Trims the raw input and checks the minimum length.
    pub fn parse(raw: &str) -> Result<Self, PasswordError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Err(PasswordError::Missing)
        } else if trimmed.chars().count() < MIN_PASSWORD_LENGTH {
            Err(PasswordError::TooShort)
        } else {
            Ok(Self(trimmed.to_owned()))
        }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(..)")
    }
}

/// A salted Argon2 hash in PHC string format, as stored in the `password` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(pub String);

impl PasswordHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_trimmed_before_length_check() {
        assert_eq!(Password::parse("  abc12  ").unwrap_err(), PasswordError::TooShort);
        assert!(Password::parse("  abc123  ").is_ok());
    }

    #[test]
    fn blank_password_is_missing() {
        assert_eq!(Password::parse("   ").unwrap_err(), PasswordError::Missing);
        assert_eq!(
            PasswordError::TooShort.to_string(),
            "password must be at least 6 characters long"
        );
    }

    #[test]
    fn debug_output_hides_password() {
        let password = Password::parse("hunter22").unwrap();
        assert_eq!(format!("{:?}", password), "Password(..)");
    }
}
