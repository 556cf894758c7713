use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;

use crate::domain::repository::{
    IdentityRepository, OAuthProvider, OAuthStateCache, UserRepository,
};
use crate::error::AuthServiceError;
use crate::usecase::identity::ResolveIdentityUseCase;
use crate::usecase::token::{SessionOutput, issue_session_token};

fn generate_state() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}

pub struct StartOAuthOutput {
    pub state: String,
    pub authorize_url: String,
}

pub struct StartOAuthUseCase<'a, C, P>
where
    C: OAuthStateCache,
    P: OAuthProvider,
{
    pub states: C,
    pub client: &'a P,
}

impl<C, P> StartOAuthUseCase<'_, C, P>
where
    C: OAuthStateCache,
    P: OAuthProvider,
{
    pub async fn execute(&self) -> Result<StartOAuthOutput, AuthServiceError> {
        let state = generate_state();
        self.states.put(&state, self.client.provider()).await?;
        Ok(StartOAuthOutput {
            authorize_url: self.client.authorize_url(&state),
            state,
        })
    }
}

pub struct OAuthCallbackInput {
    pub code: String,
    pub state: String,
    /// Value of the state cookie set by the start step.
    pub cookie_state: Option<String>,
}

pub struct OAuthCallbackUseCase<'a, C, P, U, I>
where
    C: OAuthStateCache,
    P: OAuthProvider,
    U: UserRepository,
    I: IdentityRepository,
{
    pub states: C,
    pub client: &'a P,
    pub resolver: ResolveIdentityUseCase<U, I>,
    pub jwt_secret: String,
}

impl<C, P, U, I> OAuthCallbackUseCase<'_, C, P, U, I>
where
    C: OAuthStateCache,
    P: OAuthProvider,
    U: UserRepository,
    I: IdentityRepository,
{
    pub async fn execute(
        &self,
        input: OAuthCallbackInput,
    ) -> Result<SessionOutput, AuthServiceError> {
        let provider = self.client.provider();

        if input.cookie_state.as_deref() != Some(input.state.as_str()) {
            return Err(AuthServiceError::InvalidOAuthState);
        }
        // Taken even when it belongs to another provider so it cannot be replayed.
        match self.states.take(&input.state).await? {
            Some(issued_for) if issued_for == provider => {}
            _ => return Err(AuthServiceError::InvalidOAuthState),
        }

        let assertion = self.client.exchange(&input.code).await.map_err(|e| {
            tracing::warn!(provider = %provider, error = %e, "oauth code exchange failed");
            AuthServiceError::AuthenticationFailed
        })?;
        if assertion.provider != provider {
            return Err(AuthServiceError::AuthenticationFailed);
        }

        let resolution = self.resolver.execute(assertion).await?;
        issue_session_token(resolution.user, &self.jwt_secret)
    }
}
