//! Signed claim bags: full session tokens and registration-only tokens.
//!
//! Both are HS256 JWTs signed with the same secret, but they are not interchangeable:
//! session tokens require a `sub` claim, registration tokens require `purpose = "register"`
//! and carry no subject, so neither decodes as the other.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
use serde::Serialize;
use uuid::Uuid;

/// Session token lifetime in seconds (7 days). Also the session cookie Max-Age.
pub const SESSION_TOKEN_EXP: u64 = 604_800;

/// Registration token lifetime in seconds (15 minutes).
pub const REGISTRATION_TOKEN_EXP: u64 = 900;

/// `purpose` claim value of registration tokens.
pub const REGISTER_PURPOSE: &str = "register";

/// Identity carried by a validated session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub user_id: Uuid,
    pub email: String,
    pub exp: u64,
}

/// Errors returned by token validation.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("token issued for a different purpose")]
    WrongPurpose,
}

/// Claims of a session token.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user ID (UUID string) |
/// | `email` | custom | account email at issue time |
/// | `exp` | `exp` | expiry, seconds since epoch |
///
/// [`Serialize`] is only derived with the **`USE_ONLY_IN_AUTH_SERVICE`** feature; the
/// auth service is the sole issuer.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub exp: u64,
}

/// Claims of a registration token: proves the bearer verified `email` by OTP and may
/// finish creating an account for exactly that address.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct RegistrationClaims {
    pub purpose: String,
    pub email: String,
    pub exp: u64,
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> TokenError {
    use jsonwebtoken::errors::ErrorKind;
    match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidEcdsaKey | ErrorKind::InvalidRsaKey(_) => {
            TokenError::InvalidSignature
        }
        _ => TokenError::Malformed,
    }
}

fn validation(required: &[&str]) -> Validation {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(required);
    validation
}

/// Validate a session token (cookie or bearer value) and return the identity it carries.
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionInfo, TokenError> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(&["exp", "sub"]),
    )
    .map_err(map_jwt_error)?;
    let user_id = data
        .claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| TokenError::Malformed)?;
    Ok(SessionInfo {
        user_id,
        email: data.claims.email,
        exp: data.claims.exp,
    })
}

/// Validate a registration token and return the email it was issued for.
pub fn validate_registration_token(token: &str, secret: &str) -> Result<String, TokenError> {
    let data = decode::<RegistrationClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(&["exp"]),
    )
    .map_err(map_jwt_error)?;
    if data.claims.purpose != REGISTER_PURPOSE {
        return Err(TokenError::WrongPurpose);
    }
    Ok(data.claims.email)
}

/// Sign any claim set with the shared HS256 secret.
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
pub fn sign<C: Serialize>(claims: &C, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
}
