//! Cookie builders for the session token and the OAuth2 `state` binding.
//!
//! Every cookie is `HttpOnly`, `Secure` and `SameSite=Lax`: page scripts cannot read the
//! credential and it is only attached to top-level navigations from other sites (needed for
//! the OAuth2 redirect back to us).

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::token::SESSION_TOKEN_EXP;

/// Cookie name for the session token.
pub const HOMERENT_SESSION: &str = "homerent_session";

/// Cookie name binding an in-flight OAuth2 login to the browser that started it.
pub const HOMERENT_OAUTH_STATE: &str = "homerent_oauth_state";

/// OAuth2 state lifetime in seconds (10 minutes).
pub const OAUTH_STATE_EXP: u64 = 600;

fn secure_cookie(
    name: &'static str,
    value: String,
    path: &'static str,
    domain: String,
    max_age: Duration,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path(path)
        .domain(domain)
        .max_age(max_age)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Set the session cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::{CookieJar, SameSite};
/// use homerent_auth_types::cookie::{set_session_cookie, HOMERENT_SESSION};
///
/// let jar = set_session_cookie(CookieJar::new(), "jwt".to_string(), "homerent.sg".to_string());
/// let cookie = jar.get(HOMERENT_SESSION).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("homerent.sg"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// assert_eq!(cookie.same_site(), Some(SameSite::Lax));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_session_cookie(jar: CookieJar, value: String, domain: String) -> CookieJar {
    jar.add(secure_cookie(
        HOMERENT_SESSION,
        value,
        "/",
        domain,
        Duration::seconds(SESSION_TOKEN_EXP as i64),
    ))
}

/// Expire the session cookie.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use homerent_auth_types::cookie::{clear_session_cookie, set_session_cookie, HOMERENT_SESSION};
///
/// let jar = set_session_cookie(CookieJar::new(), "jwt".to_string(), "homerent.sg".to_string());
/// let jar = clear_session_cookie(jar, "homerent.sg".to_string());
/// let cookie = jar.get(HOMERENT_SESSION).unwrap();
/// assert_eq!(cookie.value(), "");
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_session_cookie(jar: CookieJar, domain: String) -> CookieJar {
    jar.add(secure_cookie(
        HOMERENT_SESSION,
        String::new(),
        "/",
        domain,
        Duration::ZERO,
    ))
}

/// Set the OAuth2 state cookie, scoped to the `/oauth2` routes.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use homerent_auth_types::cookie::{set_oauth_state_cookie, HOMERENT_OAUTH_STATE};
///
/// let jar = set_oauth_state_cookie(CookieJar::new(), "st4te".to_string(), "homerent.sg".to_string());
/// let cookie = jar.get(HOMERENT_OAUTH_STATE).unwrap();
/// assert_eq!(cookie.path(), Some("/oauth2"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(600)));
/// ```
pub fn set_oauth_state_cookie(jar: CookieJar, state: String, domain: String) -> CookieJar {
    jar.add(secure_cookie(
        HOMERENT_OAUTH_STATE,
        state,
        "/oauth2",
        domain,
        Duration::seconds(OAUTH_STATE_EXP as i64),
    ))
}

/// Expire the OAuth2 state cookie once the callback has consumed it.
pub fn clear_oauth_state_cookie(jar: CookieJar, domain: String) -> CookieJar {
    jar.add(secure_cookie(
        HOMERENT_OAUTH_STATE,
        String::new(),
        "/oauth2",
        domain,
        Duration::ZERO,
    ))
}
