//! Signed-in requests for tests.
//!
//! `MockSession` signs a real session token with the test secret so requests pass through
//! the production `SessionIdentity` extractor unchanged.

use std::time::{SystemTime, UNIX_EPOCH};

use http::header::{AUTHORIZATION, COOKIE};
use http::{HeaderMap, HeaderValue};
use uuid::Uuid;

use homerent_auth_types::cookie::HOMERENT_SESSION;
use homerent_auth_types::token::{SessionClaims, sign};

/// A session for a fixed user, valid for one hour from creation.
pub struct MockSession {
    pub user_id: Uuid,
    pub email: String,
    token: String,
}

impl MockSession {
    pub fn new(user_id: Uuid, email: &str, secret: &str) -> Self {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before UNIX epoch")
            .as_secs()
            + 3600;
        let claims = SessionClaims {
            sub: user_id.to_string(),
            email: email.to_owned(),
            exp,
        };
        let token = sign(&claims, secret).expect("sign test session token");
        Self {
            user_id,
            email: email.to_owned(),
            token,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Headers as a browser would send them (session cookie).
    pub fn cookie_headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        let value = format!("{HOMERENT_SESSION}={}", self.token);
        map.insert(COOKIE, HeaderValue::from_str(&value).expect("cookie header"));
        map
    }

    /// Headers as an API client would send them (bearer token).
    pub fn bearer_headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        let value = format!("Bearer {}", self.token);
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&value).expect("authorization header"),
        );
        map
    }
}
