use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use homerent_auth_types::{
    cookie::{clear_session_cookie, set_session_cookie},
    identity::SessionIdentity,
};

use crate::error::AuthServiceError;
use crate::handlers::UserResponse;
use crate::state::AppState;
use crate::usecase::account::{
    GetMeUseCase, LoginInput, LoginUseCase, RegisterInput, RegisterUseCase,
};

// ── POST /users/register ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub registration_token: String,
    pub name: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase
        .execute(RegisterInput {
            registration_token: body.registration_token,
            name: body.name,
            password: body.password,
        })
        .await?;

    let jar = set_session_cookie(jar, out.token, state.cookie_domain.clone());
    Ok((StatusCode::CREATED, jar, Json(UserResponse::from(out.user))))
}

// ── POST /users/login ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;

    let jar = set_session_cookie(jar, out.token, state.cookie_domain.clone());
    Ok((StatusCode::CREATED, jar, Json(UserResponse::from(out.user))))
}

// ── GET /users/@me ───────────────────────────────────────────────────────────

pub async fn me(
    State(state): State<AppState>,
    identity: SessionIdentity,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = GetMeUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(identity.user_id).await?;
    Ok(Json(UserResponse::from(user)))
}

// ── POST /users/logout ───────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    _identity: SessionIdentity,
    jar: CookieJar,
) -> impl IntoResponse {
    let jar = clear_session_cookie(jar, state.cookie_domain.clone());
    (StatusCode::NO_CONTENT, jar)
}
