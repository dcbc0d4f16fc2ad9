//! Sign-in orchestration: registration, the credentials strategy, the
//! provider strategy, and shaping principals into session tokens.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::auth::{
    dto::{CredentialsRequest, RegisterRequest, Session},
    jwt::SessionKeys,
    oauth::OAuthIdentity,
    password::{hash_password, verify_password},
    repo::{StoreError, UserStore},
    repo_types::{NewUser, User},
};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("no user found")]
    NotFound,
    #[error("invalid password")]
    Unauthorized,
    #[error("user already exists")]
    DuplicateKey,
    #[error("automatic account creation is disabled")]
    ProvisioningDisabled,
    #[error(transparent)]
    Store(StoreError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey => AuthError::DuplicateKey,
            other => AuthError::Store(other),
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

/// Creates a credentials account with a freshly hashed password.
pub async fn register(store: &dyn UserStore, req: RegisterRequest) -> Result<User, AuthError> {
    let (Some(name), Some(email), Some(password)) =
        (present(req.name), present(req.email), present(req.password))
    else {
        return Err(AuthError::InvalidInput("All fields are required".into()));
    };

    let email = normalize_email(&email);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AuthError::InvalidInput("Invalid email".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AuthError::InvalidInput("Password too short".into()));
    }

    store.connect().await?;
    if store.find_user_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AuthError::DuplicateKey);
    }

    let password_hash = hash_password(&password)?;
    let user = store
        .create_user(NewUser {
            email,
            name: Some(name.trim().to_string()),
            password_hash: Some(password_hash),
            image: None,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Credentials strategy. An account without a password hash is reported
/// exactly like an unknown email.
pub async fn authorize_credentials(
    store: &dyn UserStore,
    req: CredentialsRequest,
) -> Result<User, AuthError> {
    let (Some(email), Some(password)) = (present(req.email), present(req.password)) else {
        return Err(AuthError::InvalidInput("Invalid credentials".into()));
    };
    let email = normalize_email(&email);

    store.connect().await?;
    let user = match store.find_user_by_email(&email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(AuthError::NotFound);
        }
    };
    let Some(hash) = user.password_hash.as_deref() else {
        warn!(email = %email, user_id = %user.id, "login on provider-only account");
        return Err(AuthError::NotFound);
    };

    if !verify_password(&password, hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AuthError::Unauthorized);
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(user)
}

/// Provider strategy. The provider's email is trusted as-is; when
/// `auto_provision` is set an unseen email gets a record with no password hash.
/// Any store failure denies the sign-in.
pub async fn sign_in_oauth(
    store: &dyn UserStore,
    identity: OAuthIdentity,
    auto_provision: bool,
) -> Result<User, AuthError> {
    let email = normalize_email(&identity.email);
    if !is_valid_email(&email) {
        return Err(AuthError::InvalidInput("Invalid email".into()));
    }

    store.connect().await.map_err(|e| {
        error!(error = %e, "oauth sign-in: store unavailable");
        e
    })?;
    if let Some(existing) = store.find_user_by_email(&email).await? {
        info!(user_id = %existing.id, "oauth sign-in for existing user");
        return Ok(existing);
    }
    if !auto_provision {
        warn!(email = %email, "oauth sign-in denied: auto-provisioning disabled");
        return Err(AuthError::ProvisioningDisabled);
    }

    let created = store
        .create_user(NewUser {
            email: email.clone(),
            name: identity.name,
            password_hash: None,
            image: identity.image,
        })
        .await;

    match created {
        Ok(user) => {
            info!(user_id = %user.id, email = %user.email, "user provisioned from oauth");
            Ok(user)
        }
        // another request provisioned the same email first
        Err(StoreError::DuplicateKey) => store
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::NotFound),
        Err(e) => {
            error!(error = %e, "oauth sign-in: create user failed");
            Err(e.into())
        }
    }
}

/// Shapes a principal into a signed token plus the session object it yields.
pub fn issue_session(keys: &SessionKeys, user: &User) -> Result<(String, Session), AuthError> {
    let (token, claims) = keys.sign(user)?;
    Ok((token, Session::from(&claims)))
}

/// Reads a session out of a token. Invalid or expired tokens read as anonymous.
pub fn read_session(keys: &SessionKeys, token: &str) -> Option<Session> {
    match keys.verify(token) {
        Ok(claims) => Some(Session::from(&claims)),
        Err(e) => {
            warn!(error = %e, "invalid or expired session token");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::memory::MemoryUserStore;
    use crate::config::SessionConfig;

    fn keys() -> SessionKeys {
        SessionKeys::from_config(&SessionConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
            cookie_secure: false,
        })
    }

    fn reg(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: Some(name.into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    fn creds(email: &str, password: &str) -> CredentialsRequest {
        CredentialsRequest {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    fn google(email: &str) -> OAuthIdentity {
        OAuthIdentity {
            email: email.into(),
            name: Some("G User".into()),
            image: Some("https://img.example/g.png".into()),
        }
    }

    #[tokio::test]
    async fn register_stores_hash_not_plaintext() {
        let store = MemoryUserStore::default();
        register(&store, reg("A", "a@x.com", "secret123")).await.unwrap();

        let stored = store.find_user_by_email("a@x.com").await.unwrap().unwrap();
        let hash = stored.password_hash.expect("credential account has a hash");
        assert_ne!(hash, "secret123");
        assert!(verify_password("secret123", &hash).unwrap());
        assert_eq!(stored.name.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn register_requires_every_field() {
        let store = MemoryUserStore::default();
        for req in [
            RegisterRequest { name: None, ..reg("A", "a@x.com", "secret123") },
            RegisterRequest { email: Some("  ".into()), ..reg("A", "a@x.com", "secret123") },
            RegisterRequest { password: None, ..reg("A", "a@x.com", "secret123") },
        ] {
            assert!(matches!(
                register(&store, req).await,
                Err(AuthError::InvalidInput(_))
            ));
        }
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn register_twice_is_duplicate_and_creates_nothing() {
        let store = MemoryUserStore::default();
        register(&store, reg("A", "a@x.com", "secret123")).await.unwrap();
        let second = register(&store, reg("B", "A@X.com ", "other-pass")).await;
        assert!(matches!(second, Err(AuthError::DuplicateKey)));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn credentials_login_success_and_failures() {
        let store = MemoryUserStore::default();
        register(&store, reg("A", "a@x.com", "secret123")).await.unwrap();

        let user = authorize_credentials(&store, creds("a@x.com", "secret123"))
            .await
            .unwrap();
        assert_eq!(user.email, "a@x.com");

        assert!(matches!(
            authorize_credentials(&store, creds("a@x.com", "wrong")).await,
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            authorize_credentials(&store, creds("nobody@x.com", "secret123")).await,
            Err(AuthError::NotFound)
        ));
        assert!(matches!(
            authorize_credentials(&store, CredentialsRequest::default()).await,
            Err(AuthError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn provider_only_account_cannot_use_password_login() {
        let store = MemoryUserStore::default();
        sign_in_oauth(&store, google("g@x.com"), true).await.unwrap();
        assert!(matches!(
            authorize_credentials(&store, creds("g@x.com", "anything1")).await,
            Err(AuthError::NotFound)
        ));
    }

    #[tokio::test]
    async fn oauth_provisions_once_then_reuses() {
        let store = MemoryUserStore::default();
        let first = sign_in_oauth(&store, google("g@x.com"), true).await.unwrap();
        assert!(first.password_hash.is_none());
        assert_eq!(first.image.as_deref(), Some("https://img.example/g.png"));
        assert_eq!(store.count().await, 1);

        let second = sign_in_oauth(&store, google("g@x.com"), true).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn oauth_reuses_credentials_account_with_same_email() {
        let store = MemoryUserStore::default();
        let registered = register(&store, reg("A", "a@x.com", "secret123")).await.unwrap();
        let via_google = sign_in_oauth(&store, google("a@x.com"), true).await.unwrap();
        assert_eq!(via_google.id, registered.id);
        assert!(via_google.password_hash.is_some());
    }

    #[tokio::test]
    async fn oauth_without_auto_provision_denies_unknown_email() {
        let store = MemoryUserStore::default();
        assert!(matches!(
            sign_in_oauth(&store, google("new@x.com"), false).await,
            Err(AuthError::ProvisioningDisabled)
        ));
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn oauth_insert_race_reuses_winning_record() {
        let store = MemoryUserStore::losing_next_insert();
        let user = sign_in_oauth(&store, google("g@x.com"), true).await.unwrap();
        let stored = store.find_user_by_email("g@x.com").await.unwrap().unwrap();
        assert_eq!(user.id, stored.id);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn oauth_fails_closed_when_store_is_down() {
        let store = MemoryUserStore::offline();
        assert!(matches!(
            sign_in_oauth(&store, google("g@x.com"), true).await,
            Err(AuthError::Store(_))
        ));
    }

    #[tokio::test]
    async fn session_mirrors_principal() {
        let store = MemoryUserStore::default();
        let user = sign_in_oauth(&store, google("g@x.com"), true).await.unwrap();
        let keys = keys();

        let (token, issued) = issue_session(&keys, &user).unwrap();
        let read = read_session(&keys, &token).expect("valid token");
        assert_eq!(read, issued);
        assert_eq!(read.user.id, user.id);
        assert_eq!(read.user.email, "g@x.com");
        assert_eq!(read.user.name.as_deref(), Some("G User"));
        assert_eq!(read.user.image, user.image);
        assert!(!read.expires.is_empty());

        assert!(read_session(&keys, "garbage").is_none());
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@x.com"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("a x@y.com"));
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }
}
