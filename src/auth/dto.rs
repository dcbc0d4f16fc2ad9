use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

use super::claims::Claims;

/// Request body for user registration. Fields are optional so that a
/// missing field is reported as a validation error rather than a parse error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for the credentials sign-in.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Client-visible identity, copied field by field from the session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user: SessionUser,
    pub expires: String, // RFC 3339
}

impl From<&Claims> for Session {
    fn from(claims: &Claims) -> Self {
        let expires = OffsetDateTime::from_unix_timestamp(claims.exp as i64)
            .ok()
            .and_then(|t| t.format(&Rfc3339).ok())
            .unwrap_or_default();
        Self {
            user: SessionUser {
                id: claims.sub,
                name: claims.name.clone(),
                email: claims.email.clone(),
                image: claims.picture.clone(),
            },
            expires,
        }
    }
}

/// Response returned after a credentials sign-in.
#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub session: Session,
}

#[derive(Debug, Serialize)]
pub struct ProviderInfo {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub signin_url: &'static str,
    pub callback_url: &'static str,
}

pub const PROVIDERS: [ProviderInfo; 2] = [
    ProviderInfo {
        id: "credentials",
        name: "Credentials",
        kind: "credentials",
        signin_url: "/api/auth/callback/credentials",
        callback_url: "/api/auth/callback/credentials",
    },
    ProviderInfo {
        id: "google",
        name: "Google",
        kind: "oauth",
        signin_url: "/api/auth/signin/google",
        callback_url: "/api/auth/callback/google",
    },
];
