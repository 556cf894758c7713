//! User domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How an account was originally created.
///
/// Wire/storage format: lowercase string (`"email"`, `"social"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Registered with a verified email and a password.
    Email,
    /// Created from a federated identity assertion.
    Social,
}

impl AuthMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Social => "social",
        }
    }
}

impl FromStr for AuthMethod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "social" => Ok(Self::Social),
            other => Err(UnknownVariant(other.to_owned())),
        }
    }
}

/// OAuth2 identity provider.
///
/// Wire/storage format and URL path segment: lowercase string (`"google"`, `"facebook"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Google,
    Facebook,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Google, Provider::Facebook];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }

    /// Human-facing name used in error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Facebook => "Facebook",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Self::Google),
            "facebook" => Ok(Self::Facebook),
            other => Err(UnknownVariant(other.to_owned())),
        }
    }
}

/// A stored or requested string did not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);
