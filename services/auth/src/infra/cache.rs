use deadpool_redis::Pool;
use deadpool_redis::redis::AsyncCommands;

use homerent_auth_types::cookie::OAUTH_STATE_EXP;
use homerent_domain::user::Provider;

use crate::domain::repository::OAuthStateCache;
use crate::error::AuthServiceError;

#[derive(Clone)]
pub struct RedisOAuthStateCache {
    pub pool: Pool,
}

fn state_key(state: &str) -> String {
    format!("oauth_state:{}", state)
}

impl OAuthStateCache for RedisOAuthStateCache {
    async fn put(&self, state: &str, provider: Provider) -> Result<(), AuthServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        let (): () = conn
            .set_ex(state_key(state), provider.as_str(), OAUTH_STATE_EXP)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| AuthServiceError::Internal(e.into()))?;
        Ok(())
    }

    async fn take(&self, state: &str) -> Result<Option<Provider>, AuthServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        let value: Option<String> = conn
            .get_del(state_key(state))
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        // Anything unparseable is treated like an unknown state.
        Ok(value.and_then(|v| v.parse().ok()))
    }
}
