use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::auth::PasswordHash;

/// Number of stamps that completes a card and earns the reward.
pub const MAX_STAMPS: Stamps = Stamps(5);

const MAX_EMAIL_BYTES: usize = 254;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("email is required")]
    Missing,
    #[error("email address is not valid")]
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(pub String);

impl Email {
    /// Trims and lower-cases the input, then checks it looks like `local@domain.tld`.
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let email = raw.trim().to_lowercase();
        if email.is_empty() {
            return Err(EmailError::Missing);
        }
        if email.len() > MAX_EMAIL_BYTES || email.chars().any(char::is_whitespace) {
            return Err(EmailError::Malformed);
        }
        match email.split_once('@') {
            Some((local, domain))
                if !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.') =>
            {
                Ok(Self(email))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(pub i64);

/// Stamp count on a card, always within `0..=MAX_STAMPS`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Stamps(pub u32);

impl Stamps {
    /// Clamps a stored value into the valid range.
    pub fn from_stored(value: i64) -> Self {
        Self(value.clamp(0, MAX_STAMPS.0 as i64) as u32)
    }
}

#[derive(Debug)]
pub struct User {
    pub id: Id,
    pub name: Option<String>,
    pub email: Email,
    pub password: PasswordHash,
    pub stamps: Stamps,
    pub created: DateTime<Utc>,
}

/// Normalizes an optional display name; blank names are treated as absent.
pub(crate) fn normalize_name(name: Option<&str>) -> Option<String> {
    name.map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}
