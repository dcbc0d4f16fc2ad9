use std::time::Duration;

use anyhow::anyhow;
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{
    auth::{claims::Claims, repo_types::User},
    config::SessionConfig,
    state::AppState,
};

/// Holds session signing and verification keys with config data.
#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl SessionKeys {
    pub fn from_config(cfg: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes.max(0) as u64) * 60),
        }
    }

    /// Copies the principal's identity fields into a signed token.
    pub fn sign(&self, user: &User) -> anyhow::Result<(String, Claims)> {
        let now = OffsetDateTime::now_utc();
        let exp = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(TimeDuration::seconds(secs)))
            .ok_or_else(|| anyhow!("session ttl of {}s overflows the expiry time", self.ttl.as_secs()))?;
        let claims = Claims {
            sub: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            picture: user.image.clone(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user.id, "session token signed");
        Ok((token, claims))
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "session token verified");
        Ok(data.claims)
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn cfg(secret: &str, issuer: &str, audience: &str, ttl_minutes: i64) -> SessionConfig {
        SessionConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes,
            cookie_secure: false,
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            name: Some("A".into()),
            password_hash: Some("$argon2id$...".into()),
            image: Some("https://img.example/a.png".into()),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn sign_and_verify_copies_identity_fields() {
        let keys = SessionKeys::from_config(&cfg("dev-secret", "test-issuer", "test-aud", 5));
        let user = user();
        let (token, signed) = keys.sign(&user).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims, signed);
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.name.as_deref(), Some("A"));
        assert_eq!(claims.picture, user.image);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.exp - claims.iat, 5 * 60);
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good = SessionKeys::from_config(&cfg("same-secret", "good-iss", "good-aud", 5));
        let bad = SessionKeys::from_config(&cfg("same-secret", "bad-iss", "bad-aud", 5));
        let (token, _) = good.sign(&user()).unwrap();
        assert!(bad.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_other_secret() {
        let a = SessionKeys::from_config(&cfg("secret-a", "iss", "aud", 5));
        let b = SessionKeys::from_config(&cfg("secret-b", "iss", "aud", 5));
        let (token, _) = a.sign(&user()).unwrap();
        assert!(b.verify(&token).is_err());
    }

    #[test]
    fn sign_fails_instead_of_overflowing_expiry() {
        let mut keys = SessionKeys::from_config(&cfg("s", "iss", "aud", 5));
        keys.ttl = Duration::from_secs(u64::MAX / 2);
        assert!(keys.sign(&user()).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        // default validation leeway is 60s; expire well beyond it
        let keys = SessionKeys::from_config(&cfg("s", "iss", "aud", 0));
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            sub: Uuid::new_v4(),
            name: None,
            email: "old@x.com".into(),
            picture: None,
            iat: now - 7200,
            exp: now - 3600,
            iss: "iss".into(),
            aud: "aud".into(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert!(keys.verify(&token).is_err());
    }
}
