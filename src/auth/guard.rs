//! Per-request route protection.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use reqwest::Url;
use tracing::debug;

use super::{cookie::session_token, services::read_session};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub protected_prefixes: Vec<String>,
    pub auth_prefix: String,
    pub sign_in_path: String,
    pub landing_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            protected_prefixes: vec!["/dashboard".to_string()],
            auth_prefix: "/auth/".to_string(),
            sign_in_path: "/auth/signin".to_string(),
            landing_path: "/dashboard".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToSignIn,
    RedirectToLanding,
}

/// `/dashboard` covers `/dashboard` and `/dashboard/...` but not `/dashboards`.
fn under_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Pure decision over the request path and whether a valid session is present.
pub fn evaluate(cfg: &GuardConfig, path: &str, has_session: bool) -> GuardDecision {
    let protected = cfg
        .protected_prefixes
        .iter()
        .any(|p| under_prefix(path, p));
    if protected && !has_session {
        return GuardDecision::RedirectToSignIn;
    }
    if has_session && path.starts_with(&cfg.auth_prefix) {
        return GuardDecision::RedirectToLanding;
    }
    GuardDecision::Allow
}

fn sign_in_location(cfg: &GuardConfig, requested: &str) -> String {
    let Ok(mut url) = Url::parse("http://localhost") else {
        return cfg.sign_in_path.clone();
    };
    url.set_path(&cfg.sign_in_path);
    url.query_pairs_mut().append_pair("callbackUrl", requested);
    match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    }
}

pub async fn route_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let has_session = session_token(req.headers())
        .and_then(|t| read_session(&state.keys, &t))
        .is_some();

    match evaluate(&state.guard, &path, has_session) {
        GuardDecision::Allow => next.run(req).await,
        GuardDecision::RedirectToSignIn => {
            debug!(%path, "anonymous request to protected path");
            Redirect::temporary(&sign_in_location(&state.guard, &path)).into_response()
        }
        GuardDecision::RedirectToLanding => {
            debug!(%path, "signed-in request to auth page");
            Redirect::temporary(&state.guard.landing_path).into_response()
        }
    }
}
