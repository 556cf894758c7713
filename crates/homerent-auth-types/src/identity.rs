//! Session extractor for handlers that require a signed-in user.

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::extract::CookieJar;
use http::header::AUTHORIZATION;
use http::request::Parts;
use uuid::Uuid;

use homerent_core::error::AppError;

use crate::cookie::HOMERENT_SESSION;
use crate::token::validate_session_token;

/// HMAC secret used to validate session tokens. Provide it from app state via `FromRef`.
#[derive(Clone)]
pub struct SessionKey(pub String);

/// The signed-in user, taken from the `homerent_session` cookie or, for API clients, an
/// `Authorization: Bearer <token>` header. The cookie wins when both are present.
///
/// Rejects with 401 when no token is present or it fails validation.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub user_id: Uuid,
    pub email: String,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_owned())
}

impl<S> FromRequestParts<S> for SessionIdentity
where
    SessionKey: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    // Resolve everything synchronously and hand back a 'static future; an `async fn` here
    // would capture the borrowed `parts` and trip axum-core's `+ Send` signature.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let SessionKey(secret) = SessionKey::from_ref(state);
        let token = CookieJar::from_headers(&parts.headers)
            .get(HOMERENT_SESSION)
            .map(|c| c.value().to_owned())
            .filter(|v| !v.is_empty())
            .or_else(|| bearer_token(parts));

        let result = token
            .ok_or(AppError::Unauthorized)
            .and_then(|token| {
                validate_session_token(&token, &secret).map_err(|e| {
                    tracing::debug!(error = %e, "session token rejected");
                    AppError::Unauthorized
                })
            })
            .map(|info| Self {
                user_id: info.user_id,
                email: info.email,
            });

        async move { result }
    }
}
