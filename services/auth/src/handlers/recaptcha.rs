use axum::{Json, extract::State};
use serde::Deserialize;

use crate::state::AppState;
use crate::usecase::recaptcha::VerifyRecaptchaUseCase;

#[derive(Deserialize)]
pub struct RecaptchaRequest {
    pub token: String,
}

/// `POST /recaptcha/verify`: always 200, body `true` or `false`.
pub async fn verify_recaptcha(
    State(state): State<AppState>,
    Json(body): Json<RecaptchaRequest>,
) -> Json<bool> {
    let usecase = VerifyRecaptchaUseCase {
        verifier: state.recaptcha.clone(),
        hostname: state.recaptcha_hostname.clone(),
    };
    Json(usecase.execute(&body.token).await)
}
