//! Page entry points. Markup lives in the frontend; these return the data
//! each page needs and sit behind the route guard.

use axum::{extract::Query, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::{
    dto::{ProviderInfo, SessionUser, PROVIDERS},
    extractors::CurrentSession,
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardPage {
    pub greeting: String,
    pub user: SessionUser,
}

#[derive(Debug, Deserialize)]
pub struct SignInQuery {
    pub error: Option<String>,
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignInPage {
    pub providers: &'static [ProviderInfo],
    pub error: Option<String>,
    pub callback_url: String,
}

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/auth/signin", get(sign_in))
}

pub async fn dashboard(CurrentSession(session): CurrentSession) -> Json<DashboardPage> {
    let display = session
        .user
        .name
        .clone()
        .unwrap_or_else(|| session.user.email.clone());
    Json(DashboardPage {
        greeting: format!("Welcome back, {display}"),
        user: session.user,
    })
}

/// Same-site relative paths only. Browsers read `/\host` like `//host`.
fn is_relative_target(url: &str) -> bool {
    url.starts_with('/') && !url.starts_with("//") && !url.starts_with("/\\")
}

pub async fn sign_in(Query(query): Query<SignInQuery>) -> Json<SignInPage> {
    let callback_url = query
        .callback_url
        .filter(|u| is_relative_target(u))
        .unwrap_or_else(|| "/dashboard".to_string());
    Json(SignInPage {
        providers: &PROVIDERS,
        error: query.error,
        callback_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_target_must_stay_on_site() {
        assert!(is_relative_target("/dashboard"));
        assert!(is_relative_target("/jobs?q=rust"));
        assert!(!is_relative_target("//evil.com"));
        assert!(!is_relative_target("/\\evil.com"));
        assert!(!is_relative_target("https://evil.com"));
    }

    #[tokio::test]
    async fn backslash_callback_falls_back_to_dashboard() {
        let page = sign_in(Query(SignInQuery {
            error: None,
            callback_url: Some("/\\evil.com".into()),
        }))
        .await;
        assert_eq!(page.0.callback_url, "/dashboard");
    }
}
