use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use homerent_core::error::error_body;
use homerent_domain::contact::ContactError;
use homerent_domain::user::Provider;

/// Accounts service error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("user not found")]
    UserNotFound,
    #[error("unknown provider")]
    UnknownProvider,
    #[error("no pending verification code")]
    OtpNotFound,
    #[error("invalid verification code")]
    InvalidCode,
    #[error("verification code expired")]
    CodeExpired,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid registration token")]
    InvalidRegistrationToken,
    #[error("invalid oauth state")]
    InvalidOAuthState,
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("email already registered")]
    EmailTaken,
    #[error("phone number already in use")]
    PhoneInUse,
    #[error("phone number already verified")]
    PhoneAlreadyVerified,
    #[error(
        "this email is registered with a different sign-in method; sign in the way you originally did instead of {}",
        .0.display_name()
    )]
    AccountConflict(Provider),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::UnknownProvider => "UNKNOWN_PROVIDER",
            Self::OtpNotFound => "OTP_NOT_FOUND",
            Self::InvalidCode => "INVALID_CODE",
            Self::CodeExpired => "CODE_EXPIRED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidRegistrationToken => "INVALID_REGISTRATION_TOKEN",
            Self::InvalidOAuthState => "INVALID_OAUTH_STATE",
            Self::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::PhoneInUse => "PHONE_IN_USE",
            Self::PhoneAlreadyVerified => "PHONE_ALREADY_VERIFIED",
            Self::AccountConflict(_) => "ACCOUNT_CONFLICT",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::UserNotFound | Self::UnknownProvider => StatusCode::NOT_FOUND,
            Self::OtpNotFound
            | Self::InvalidCode
            | Self::CodeExpired
            | Self::InvalidCredentials
            | Self::InvalidRegistrationToken
            | Self::InvalidOAuthState
            | Self::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            Self::EmailTaken | Self::PhoneInUse | Self::PhoneAlreadyVerified => {
                StatusCode::CONFLICT
            }
            Self::AccountConflict(_) => StatusCode::FORBIDDEN,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ContactError> for AuthServiceError {
    fn from(e: ContactError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        // TraceLayer records every status; only internal faults carry a cause worth logging.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        error_body(self.status(), self.kind(), self.to_string())
    }
}
