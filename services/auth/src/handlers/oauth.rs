use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use homerent_auth_types::cookie::{
    HOMERENT_OAUTH_STATE, clear_oauth_state_cookie, set_oauth_state_cookie, set_session_cookie,
};
use homerent_domain::user::Provider;

use crate::domain::repository::OAuthProvider;
use crate::error::AuthServiceError;
use crate::infra::oauth::HttpOAuthClient;
use crate::state::AppState;
use crate::usecase::identity::ResolveIdentityUseCase;
use crate::usecase::oauth::{OAuthCallbackInput, OAuthCallbackUseCase, StartOAuthUseCase};
use crate::usecase::token::SessionOutput;

fn configured_client(state: &AppState, provider: &str) -> Result<HttpOAuthClient, AuthServiceError> {
    let provider = provider
        .parse::<Provider>()
        .map_err(|_| AuthServiceError::UnknownProvider)?;
    state
        .oauth_client(provider)
        .cloned()
        .ok_or(AuthServiceError::UnknownProvider)
}

// ── GET /oauth2/{provider} ───────────────────────────────────────────────────

pub async fn start_oauth(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthServiceError> {
    let client = configured_client(&state, &provider)?;
    let usecase = StartOAuthUseCase {
        states: state.oauth_state_cache(),
        client: &client,
    };
    let out = usecase.execute().await?;

    let jar = set_oauth_state_cookie(jar, out.state, state.cookie_domain.clone());
    Ok((jar, Redirect::to(&out.authorize_url)))
}

// ── GET /oauth2/{provider}/callback ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user declined or the request was bad.
    pub error: Option<String>,
}

pub async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, AuthServiceError> {
    let client = configured_client(&state, &provider)?;
    let result = complete_login(&state, &client, &jar, query).await;

    // The state is single-use: drop the cookie whatever the outcome.
    let jar = clear_oauth_state_cookie(jar, state.cookie_domain.clone());
    Ok(match result {
        Ok(out) => {
            let jar = set_session_cookie(jar, out.token, state.cookie_domain.clone());
            (jar, Redirect::to(&state.post_login_redirect)).into_response()
        }
        Err(e) => (jar, e).into_response(),
    })
}

async fn complete_login(
    state: &AppState,
    client: &HttpOAuthClient,
    jar: &CookieJar,
    query: CallbackQuery,
) -> Result<SessionOutput, AuthServiceError> {
    if let Some(error) = query.error {
        tracing::warn!(provider = %client.provider(), error = %error, "provider returned an error");
        return Err(AuthServiceError::AuthenticationFailed);
    }
    let (Some(code), Some(oauth_state)) = (query.code, query.state) else {
        return Err(AuthServiceError::InvalidOAuthState);
    };
    let cookie_state = jar.get(HOMERENT_OAUTH_STATE).map(|c| c.value().to_owned());

    let usecase = OAuthCallbackUseCase {
        states: state.oauth_state_cache(),
        client,
        resolver: ResolveIdentityUseCase {
            users: state.user_repo(),
            identities: state.identity_repo(),
            link_by_email: state.link_by_email,
        },
        jwt_secret: state.jwt_secret.clone(),
    };
    usecase
        .execute(OAuthCallbackInput {
            code,
            state: oauth_state,
            cookie_state,
        })
        .await
}
