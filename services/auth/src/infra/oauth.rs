//! OAuth2 authorization-code clients for Google and Facebook.

use anyhow::Context as _;
use serde::Deserialize;
use url::Url;

use homerent_domain::user::Provider;

use crate::domain::repository::OAuthProvider;
use crate::domain::types::IdentityAssertion;

/// Fixed endpoints of a provider.
#[derive(Debug, Clone, Copy)]
struct Endpoints {
    authorize: &'static str,
    token: &'static str,
    userinfo: &'static str,
    scope: &'static str,
}

fn endpoints(provider: Provider) -> Endpoints {
    match provider {
        Provider::Google => Endpoints {
            authorize: "https://accounts.google.com/o/oauth2/v2/auth",
            token: "https://oauth2.googleapis.com/token",
            userinfo: "https://openidconnect.googleapis.com/v1/userinfo",
            scope: "openid email profile",
        },
        Provider::Facebook => Endpoints {
            authorize: "https://www.facebook.com/v19.0/dialog/oauth",
            token: "https://graph.facebook.com/v19.0/oauth/access_token",
            userinfo: "https://graph.facebook.com/me?fields=id,name,email",
            scope: "email,public_profile",
        },
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Google answers with `sub`, Facebook with `id`.
#[derive(Deserialize)]
struct UserInfo {
    #[serde(alias = "id")]
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

#[derive(Clone)]
pub struct HttpOAuthClient {
    provider: Provider,
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl HttpOAuthClient {
    /// `public_url` is the service's external base URL; the callback lives at
    /// `{public_url}/oauth2/{provider}/callback`.
    pub fn new(
        provider: Provider,
        client: reqwest::Client,
        client_id: String,
        client_secret: String,
        public_url: &str,
    ) -> Self {
        let redirect_uri = format!(
            "{}/oauth2/{}/callback",
            public_url.trim_end_matches('/'),
            provider
        );
        Self {
            provider,
            client,
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }
}

impl OAuthProvider for HttpOAuthClient {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn authorize_url(&self, state: &str) -> String {
        let ep = endpoints(self.provider);
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", ep.scope),
            ("state", state),
        ];
        match Url::parse_with_params(ep.authorize, &params) {
            Ok(url) => url.into(),
            // The base URLs are constants; parsing cannot fail.
            Err(_) => ep.authorize.to_owned(),
        }
    }

    async fn exchange(&self, code: &str) -> anyhow::Result<IdentityAssertion> {
        let ep = endpoints(self.provider);

        let token: TokenResponse = self
            .client
            .post(ep.token)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .context("token request")?
            .error_for_status()
            .context("token endpoint rejected code")?
            .json()
            .await
            .context("decode token response")?;

        let info: UserInfo = self
            .client
            .get(ep.userinfo)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .context("userinfo request")?
            .error_for_status()
            .context("userinfo endpoint rejected token")?
            .json()
            .await
            .context("decode userinfo response")?;

        Ok(IdentityAssertion {
            provider: self.provider,
            subject: info.sub,
            email: info.email,
            display_name: info.name,
        })
    }
}
