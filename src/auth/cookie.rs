//! Session and OAuth-state cookies.

use axum::http::{header, HeaderMap};

pub const SESSION_COOKIE: &str = "careerpath.session-token";
pub const OAUTH_STATE_COOKIE: &str = "careerpath.oauth-state";
const OAUTH_STATE_MAX_AGE_SECS: u64 = 600;

#[derive(Debug, Clone)]
pub struct CookieSpec<'a> {
    pub name: &'a str,
    pub secure: bool,
    pub max_age_secs: u64,
}

impl CookieSpec<'_> {
    /// Build a Set-Cookie header value.
    pub fn build(&self, value: &str) -> String {
        let mut cookie = format!("{}={}; HttpOnly; SameSite=Lax; Path=/", self.name, value);
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; Max-Age={}", self.max_age_secs));
        cookie
    }

    /// Build a Set-Cookie header value that expires the cookie.
    pub fn build_delete(&self) -> String {
        CookieSpec {
            max_age_secs: 0,
            ..self.clone()
        }
        .build("")
    }
}

pub fn session_cookie(secure: bool, max_age_secs: u64) -> CookieSpec<'static> {
    CookieSpec {
        name: SESSION_COOKIE,
        secure,
        max_age_secs,
    }
}

pub fn oauth_state_cookie(secure: bool) -> CookieSpec<'static> {
    CookieSpec {
        name: OAUTH_STATE_COOKIE,
        secure,
        max_age_secs: OAUTH_STATE_MAX_AGE_SECS,
    }
}

/// Extract a cookie value from request headers.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
        .filter(|v| !v.is_empty())
}

/// Session token from the cookie, falling back to `Authorization: Bearer`.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    extract_cookie(headers, SESSION_COOKIE).or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}
