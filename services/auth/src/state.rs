use axum::extract::FromRef;
use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;

use homerent_auth_types::identity::SessionKey;
use homerent_domain::user::Provider;

use crate::domain::types::OtpIssuePolicy;
use crate::infra::cache::RedisOAuthStateCache;
use crate::infra::db::{DbIdentityRepository, DbOtpRepository, DbUserRepository};
use crate::infra::mail::MailTransport;
use crate::infra::oauth::HttpOAuthClient;
use crate::infra::recaptcha::HttpRecaptchaVerifier;
use crate::infra::sms::SmsTransport;
use crate::usecase::otp::OtpLifecycle;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub jwt_secret: String,
    pub cookie_domain: String,
    pub post_login_redirect: String,
    pub otp_policy: OtpIssuePolicy,
    pub link_by_email: bool,
    pub mail: MailTransport,
    pub sms: SmsTransport,
    pub google: Option<HttpOAuthClient>,
    pub facebook: Option<HttpOAuthClient>,
    pub recaptcha: HttpRecaptchaVerifier,
    pub recaptcha_hostname: String,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn identity_repo(&self) -> DbIdentityRepository {
        DbIdentityRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_lifecycle(&self) -> OtpLifecycle<DbOtpRepository> {
        OtpLifecycle {
            otp_challenges: DbOtpRepository {
                db: self.db.clone(),
            },
            policy: self.otp_policy,
        }
    }

    pub fn oauth_state_cache(&self) -> RedisOAuthStateCache {
        RedisOAuthStateCache {
            pool: self.redis.clone(),
        }
    }

    /// Client for a provider, if its credentials are configured.
    pub fn oauth_client(&self, provider: Provider) -> Option<&HttpOAuthClient> {
        match provider {
            Provider::Google => self.google.as_ref(),
            Provider::Facebook => self.facebook.as_ref(),
        }
    }
}

impl FromRef<AppState> for SessionKey {
    fn from_ref(state: &AppState) -> Self {
        SessionKey(state.jwt_secret.clone())
    }
}
