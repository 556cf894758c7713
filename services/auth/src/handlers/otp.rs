use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use homerent_auth_types::identity::SessionIdentity;

use crate::error::AuthServiceError;
use crate::handlers::PhoneResponse;
use crate::state::AppState;
use crate::usecase::otp::{
    SendEmailOtpUseCase, SendPhoneOtpInput, SendPhoneOtpUseCase, VerifyEmailOtpInput,
    VerifyEmailOtpUseCase, VerifyPhoneOtpUseCase,
};

// ── POST /otp/send ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendEmailOtpRequest {
    pub email: String,
}

/// Body is `true` when the mail went out, `false` when delivery failed.
pub async fn send_email_otp(
    State(state): State<AppState>,
    Json(body): Json<SendEmailOtpRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = SendEmailOtpUseCase {
        otp: state.otp_lifecycle(),
        mailer: state.mail.clone(),
    };
    let sent = usecase.execute(&body.email).await?;
    Ok((StatusCode::OK, Json(sent)))
}

// ── POST /otp/verify ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyEmailOtpRequest {
    pub email: String,
    pub code: String,
}

#[derive(Serialize)]
pub struct RegistrationTokenResponse {
    pub registration_token: String,
    pub expires_at: u64,
}

pub async fn verify_email_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyEmailOtpRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = VerifyEmailOtpUseCase {
        otp: state.otp_lifecycle(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let token = usecase
        .execute(VerifyEmailOtpInput {
            email: body.email,
            code: body.code,
        })
        .await?;
    Ok((
        StatusCode::OK,
        Json(RegistrationTokenResponse {
            registration_token: token.token,
            expires_at: token.exp,
        }),
    ))
}

// ── POST /otp/send-sms ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendSmsRequest {
    pub prefix: String,
    pub number: String,
}

pub async fn send_sms_otp(
    State(state): State<AppState>,
    identity: SessionIdentity,
    Json(body): Json<SendSmsRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = SendPhoneOtpUseCase {
        users: state.user_repo(),
        otp: state.otp_lifecycle(),
        sms: state.sms.clone(),
    };
    let sent = usecase
        .execute(SendPhoneOtpInput {
            user_id: identity.user_id,
            prefix: body.prefix,
            number: body.number,
        })
        .await?;
    Ok((StatusCode::OK, Json(sent)))
}

// ── POST /otp/verify-phone ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyPhoneRequest {
    pub code: String,
}

pub async fn verify_phone_otp(
    State(state): State<AppState>,
    identity: SessionIdentity,
    Json(body): Json<VerifyPhoneRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = VerifyPhoneOtpUseCase {
        users: state.user_repo(),
        otp: state.otp_lifecycle(),
    };
    let phone = usecase.execute(identity.user_id, &body.code).await?;
    Ok((
        StatusCode::OK,
        Json(PhoneResponse {
            prefix: phone.prefix().to_owned(),
            number: phone.number().to_owned(),
            verified: true,
        }),
    ))
}
