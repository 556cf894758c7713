use sea_orm::Database;
use tracing::info;

use homerent_auth::config::{AuthConfig, credentials};
use homerent_auth::infra::mail::{HttpMailSender, MailTransport};
use homerent_auth::infra::oauth::HttpOAuthClient;
use homerent_auth::infra::recaptcha::HttpRecaptchaVerifier;
use homerent_auth::infra::sms::{SmsTransport, TwilioSmsSender};
use homerent_auth::router::build_router;
use homerent_auth::state::AppState;
use homerent_core::config::Config;
use homerent_core::tracing::init_tracing;
use homerent_domain::user::Provider;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AuthConfig::from_env().expect("invalid auth configuration");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("failed to build HTTP client");

    let mail = match (&config.mail_api_url, &config.mail_api_key) {
        (Some(api_url), Some(api_key)) => MailTransport::Http(HttpMailSender {
            client: http.clone(),
            api_url: api_url.clone(),
            api_key: api_key.clone(),
            from: config.mail_from.clone(),
        }),
        _ => {
            info!("MAIL_API_URL/MAIL_API_KEY not set; email codes are logged only");
            MailTransport::Log
        }
    };

    let sms = match (
        &config.twilio_account_sid,
        &config.twilio_auth_token,
        &config.twilio_from,
    ) {
        (Some(account_sid), Some(auth_token), Some(from)) => SmsTransport::Twilio(TwilioSmsSender {
            client: http.clone(),
            account_sid: account_sid.clone(),
            auth_token: auth_token.clone(),
            from: from.clone(),
        }),
        _ => {
            info!("Twilio credentials not set; SMS codes are logged only");
            SmsTransport::Log
        }
    };

    let oauth_client = |provider: Provider, id: &Option<String>, secret: &Option<String>| {
        credentials(id, secret).map(|(id, secret)| {
            HttpOAuthClient::new(provider, http.clone(), id, secret, &config.public_url)
        })
    };
    let google = oauth_client(
        Provider::Google,
        &config.google_client_id,
        &config.google_client_secret,
    );
    let facebook = oauth_client(
        Provider::Facebook,
        &config.facebook_client_id,
        &config.facebook_client_secret,
    );

    let state = AppState {
        db,
        redis,
        jwt_secret: config.jwt_secret.clone(),
        cookie_domain: config.cookie_domain.clone(),
        post_login_redirect: config.post_login_redirect.clone(),
        otp_policy: config.otp_issue_policy,
        link_by_email: config.oauth_link_by_email,
        mail,
        sms,
        google,
        facebook,
        recaptcha: HttpRecaptchaVerifier {
            client: http.clone(),
            secret_key: config.recaptcha_secret_key.clone().unwrap_or_default(),
        },
        recaptcha_hostname: config.recaptcha_hostname.clone(),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!(
        otp_policy = ?config.otp_issue_policy,
        link_by_email = config.oauth_link_by_email,
        "auth service listening on {addr}"
    );
    axum::serve(listener, router).await.expect("server error");
}
