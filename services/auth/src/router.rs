use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use homerent_core::health::healthz;
use homerent_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    account::{login, logout, me, register},
    health::readyz,
    oauth::{oauth_callback, start_oauth},
    otp::{send_email_otp, send_sms_otp, verify_email_otp, verify_phone_otp},
    recaptcha::verify_recaptcha,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Email OTP
        .route("/otp/send", post(send_email_otp))
        .route("/otp/verify", post(verify_email_otp))
        // Phone OTP (signed in)
        .route("/otp/send-sms", post(send_sms_otp))
        .route("/otp/verify-phone", post(verify_phone_otp))
        // Accounts
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/logout", post(logout))
        .route("/users/@me", get(me))
        // Social login
        .route("/oauth2/{provider}", get(start_oauth))
        .route("/oauth2/{provider}/callback", get(oauth_callback))
        // Bot check
        .route("/recaptcha/verify", post(verify_recaptcha))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
}
