use serde::Deserialize;

use homerent_core::config::Config;

use crate::domain::types::OtpIssuePolicy;

/// Accounts service configuration, read from environment variables by `envy`
/// (`database_url` <- `DATABASE_URL`, and so on).
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL (OAuth2 state).
    pub redis_url: String,
    /// HMAC secret for session and registration tokens.
    pub jwt_secret: String,
    /// Cookie domain attribute (e.g. "homerent.sg").
    pub cookie_domain: String,
    /// TCP port to listen on. Env var: `AUTH_PORT`.
    #[serde(default = "default_port")]
    pub auth_port: u16,
    /// Externally visible base URL; OAuth2 redirect URIs are built from it.
    pub public_url: String,
    /// Where the browser lands after a successful social login.
    #[serde(default = "default_post_login_redirect")]
    pub post_login_redirect: String,
    /// `replace_always` (default) or `replace_if_stale`.
    #[serde(default)]
    pub otp_issue_policy: OtpIssuePolicy,
    /// Attach a provider identity to an existing account with the same email.
    #[serde(default = "default_true")]
    pub oauth_link_by_email: bool,

    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub facebook_client_id: Option<String>,
    pub facebook_client_secret: Option<String>,

    /// Transactional mail HTTP API. Mail is only logged when unset.
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    #[serde(default = "default_mail_from")]
    pub mail_from: String,

    /// Twilio credentials. SMS is only logged when unset.
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from: Option<String>,

    pub recaptcha_secret_key: Option<String>,
    #[serde(default)]
    pub recaptcha_hostname: String,
}

impl Config for AuthConfig {}

fn default_port() -> u16 {
    3000
}

fn default_post_login_redirect() -> String {
    "/".to_owned()
}

fn default_true() -> bool {
    true
}

fn default_mail_from() -> String {
    "Homerent <no-reply@homerent.sg>".to_owned()
}

/// Pair up an optional id/secret couple; a half-configured provider counts as absent.
pub fn credentials(id: &Option<String>, secret: &Option<String>) -> Option<(String, String)> {
    match (id, secret) {
        (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
            Some((id.clone(), secret.clone()))
        }
        _ => None,
    }
}
