//! Contact channels an account can prove control of: email addresses and phone numbers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Rejection reasons for malformed contact input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("invalid phone prefix")]
    InvalidPrefix,
    #[error("invalid phone number")]
    InvalidNumber,
}

/// Normalized email address (trimmed, lowercased).
///
/// Every email crossing the domain boundary goes through [`Email::parse`] so that
/// lookups by email and OTP subjects agree on a single spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub const MAX_LEN: usize = 254;

    pub fn parse(raw: &str) -> Result<Self, ContactError> {
        let email = raw.trim().to_lowercase();
        if email.is_empty() || email.len() > Self::MAX_LEN {
            return Err(ContactError::InvalidEmail);
        }
        if email.chars().any(char::is_whitespace) {
            return Err(ContactError::InvalidEmail);
        }
        let (local, domain) = email.split_once('@').ok_or(ContactError::InvalidEmail)?;
        if local.is_empty() || domain.contains('@') {
            return Err(ContactError::InvalidEmail);
        }
        // Domain needs at least one dot with labels on both sides.
        let valid_domain = domain.split('.').count() >= 2 && domain.split('.').all(|l| !l.is_empty());
        if !valid_domain {
            return Err(ContactError::InvalidEmail);
        }
        Ok(Self(email))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part before the `@`; used as a fallback display name.
    pub fn local_part(&self) -> &str {
        self.0.split_once('@').map(|(l, _)| l).unwrap_or(&self.0)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = ContactError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

/// Phone number split into an international dialing prefix (`+65`) and the
/// national number (`81234567`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber {
    prefix: String,
    number: String,
}

impl PhoneNumber {
    pub fn parse(prefix: &str, number: &str) -> Result<Self, ContactError> {
        let prefix = prefix.trim();
        let digits = prefix.strip_prefix('+').ok_or(ContactError::InvalidPrefix)?;
        if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ContactError::InvalidPrefix);
        }

        // Allow human formatting ("8123 4567", "8123-4567") but store digits only.
        let number: String = number
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect();
        if !(4..=15).contains(&number.len()) || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ContactError::InvalidNumber);
        }

        Ok(Self {
            prefix: prefix.to_owned(),
            number,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    /// E.164 form, e.g. `+6581234567`.
    pub fn e164(&self) -> String {
        format!("{}{}", self.prefix, self.number)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.prefix, self.number)
    }
}
