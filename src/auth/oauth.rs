use std::time::Duration;

use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::OAuthConfig;

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const GOOGLE_SCOPES: &str = "openid email profile";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

pub const GOOGLE_CALLBACK_PATH: &str = "/api/auth/callback/google";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider rejected the request (status {status}): {message}")]
    Provider { status: u16, message: String },
    #[error("provider profile has no email")]
    MissingEmail,
}

/// Identity asserted by an external provider after a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthIdentity {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn id(&self) -> &'static str;
    fn authorize_url(&self, state: &str) -> String;
    async fn exchange(&self, code: &str) -> Result<OAuthIdentity, OAuthError>;
}

pub fn new_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleProfile {
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Clone)]
pub struct GoogleProvider {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl GoogleProvider {
    pub fn new(cfg: &OAuthConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(HTTP_TIMEOUT).build()?,
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
            redirect_uri: format!("{}{}", cfg.public_url, GOOGLE_CALLBACK_PATH),
        })
    }

    async fn fetch_access_token(&self, code: &str) -> Result<String, OAuthError> {
        let response = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(%status, "google token exchange rejected");
            return Err(OAuthError::Provider {
                status: status.as_u16(),
                message,
            });
        }
        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn id(&self) -> &'static str {
        "google"
    }

    fn authorize_url(&self, state: &str) -> String {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", GOOGLE_SCOPES),
            ("state", state),
            ("prompt", "select_account"),
        ];
        Url::parse_with_params(GOOGLE_AUTHORIZE_URL, &params)
            .map(String::from)
            .unwrap_or_else(|_| GOOGLE_AUTHORIZE_URL.to_string())
    }

    async fn exchange(&self, code: &str) -> Result<OAuthIdentity, OAuthError> {
        let access_token = self.fetch_access_token(code).await?;

        let response = self
            .client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OAuthError::Provider {
                status: status.as_u16(),
                message,
            });
        }
        let profile: GoogleProfile = response.json().await?;
        let email = profile
            .email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .ok_or(OAuthError::MissingEmail)?;

        debug!(email = %email, "google profile fetched");
        Ok(OAuthIdentity {
            email,
            name: profile.name,
            image: profile.picture,
        })
    }
}

#[cfg(test)]
pub mod scripted {
    use async_trait::async_trait;

    use super::{IdentityProvider, OAuthError, OAuthIdentity};

    /// Provider double: code "good" yields the scripted identity, anything else fails.
    pub struct ScriptedProvider {
        pub identity: OAuthIdentity,
    }

    #[async_trait]
    impl IdentityProvider for ScriptedProvider {
        fn id(&self) -> &'static str {
            "google"
        }

        fn authorize_url(&self, state: &str) -> String {
            format!("https://accounts.test/authorize?state={state}")
        }

        async fn exchange(&self, code: &str) -> Result<OAuthIdentity, OAuthError> {
            if code == "good" {
                Ok(self.identity.clone())
            } else {
                Err(OAuthError::Provider {
                    status: 400,
                    message: "invalid_grant".into(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GoogleProvider {
        GoogleProvider::new(&OAuthConfig {
            client_id: "cid".into(),
            client_secret: "csecret".into(),
            public_url: "https://careers.example.com".into(),
            auto_provision: true,
        })
        .unwrap()
    }

    #[test]
    fn authorize_url_carries_client_redirect_and_state() {
        let url = Url::parse(&provider().authorize_url("st4te")).unwrap();
        let q: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(q["client_id"], "cid");
        assert_eq!(
            q["redirect_uri"],
            "https://careers.example.com/api/auth/callback/google"
        );
        assert_eq!(q["response_type"], "code");
        assert_eq!(q["scope"], "openid email profile");
        assert_eq!(q["state"], "st4te");
        assert!(!url.as_str().contains("csecret"));
    }

    #[test]
    fn states_are_random_and_url_safe() {
        let a = new_state();
        let b = new_state();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
