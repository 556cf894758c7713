use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;

use homerent_auth_types::token::{
    REGISTER_PURPOSE, REGISTRATION_TOKEN_EXP, RegistrationClaims, SESSION_TOKEN_EXP,
    SessionClaims, sign, validate_registration_token,
};
use homerent_domain::contact::Email;

use crate::domain::types::UserRecord;
use crate::error::AuthServiceError;

/// Signed session credential plus the account it was minted for.
#[derive(Debug, Clone)]
pub struct SessionOutput {
    pub user: UserRecord,
    pub token: String,
    pub exp: u64,
}

/// Registration-only credential handed out after an email OTP check.
#[derive(Debug, Clone)]
pub struct RegistrationToken {
    pub token: String,
    pub exp: u64,
}

fn now_secs() -> Result<u64, AuthServiceError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before UNIX epoch")?
        .as_secs())
}

pub fn issue_session_token(
    user: UserRecord,
    secret: &str,
) -> Result<SessionOutput, AuthServiceError> {
    let exp = now_secs()? + SESSION_TOKEN_EXP;
    let claims = SessionClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        exp,
    };
    let token = sign(&claims, secret).context("sign session token")?;
    Ok(SessionOutput { user, token, exp })
}

pub fn issue_registration_token(
    email: &Email,
    secret: &str,
) -> Result<RegistrationToken, AuthServiceError> {
    let exp = now_secs()? + REGISTRATION_TOKEN_EXP;
    let claims = RegistrationClaims {
        purpose: REGISTER_PURPOSE.to_owned(),
        email: email.to_string(),
        exp,
    };
    let token = sign(&claims, secret).context("sign registration token")?;
    Ok(RegistrationToken { token, exp })
}

/// Email a registration token was issued for.
pub fn registration_email(token: &str, secret: &str) -> Result<Email, AuthServiceError> {
    let email = validate_registration_token(token, secret).map_err(|e| {
        tracing::debug!(error = %e, "registration token rejected");
        AuthServiceError::InvalidRegistrationToken
    })?;
    Email::parse(&email).map_err(|_| AuthServiceError::InvalidRegistrationToken)
}
