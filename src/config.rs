use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;

/// Upper bound for `SESSION_TTL_MINUTES` (one year).
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Absolute base URL the provider redirects back to.
    pub public_url: String,
    /// Create a user record the first time a provider-asserted email signs in.
    pub auto_provision: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_connect_timeout_secs: u64,
    pub db_max_connections: u32,
    pub session: SessionConfig,
    pub oauth: OAuthConfig,
    pub gemini: GeminiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[cfg(test)]
    pub fn from_map(vars: &std::collections::HashMap<&str, &str>) -> anyhow::Result<Self> {
        Self::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let ttl_minutes = env.parse_or("SESSION_TTL_MINUTES", 60 * 24 * 30)?;
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&ttl_minutes) {
            bail!(
                "SESSION_TTL_MINUTES must be between 1 and {MAX_SESSION_TTL_MINUTES}, got {ttl_minutes}"
            );
        }

        let session = SessionConfig {
            secret: env.require("SESSION_SECRET")?,
            issuer: env.or("SESSION_ISSUER", "careerpath"),
            audience: env.or("SESSION_AUDIENCE", "careerpath-web"),
            ttl_minutes,
            cookie_secure: env.flag_or("COOKIE_SECURE", true)?,
        };
        let oauth = OAuthConfig {
            client_id: env.require("GOOGLE_CLIENT_ID")?,
            client_secret: env.require("GOOGLE_CLIENT_SECRET")?,
            public_url: env
                .or("PUBLIC_URL", "http://localhost:8080")
                .trim_end_matches('/')
                .to_string(),
            auto_provision: env.flag_or("OAUTH_AUTO_PROVISION", true)?,
        };
        let gemini = GeminiConfig {
            api_key: env.require("GEMINI_API_KEY")?,
            model: env.or("GEMINI_MODEL", "gemini-pro"),
            timeout_secs: env.parse_or("GEMINI_TIMEOUT_SECS", 30)?,
        };

        Ok(Self {
            host: env.or("APP_HOST", "0.0.0.0"),
            port: env.parse_or("APP_PORT", 8080)?,
            database_url: env.require("DATABASE_URL")?,
            db_connect_timeout_secs: env.parse_or("DB_CONNECT_TIMEOUT_SECS", 5)?,
            db_max_connections: env.parse_or("DB_MAX_CONNECTIONS", 10)?,
            session,
            oauth,
            gemini,
        })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn require(&self, key: &str) -> anyhow::Result<String> {
        self.get(key)
            .ok_or_else(|| anyhow!("Required environment variable '{key}' is not set"))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, key: &str, default: T) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("{key} has an invalid value '{raw}'")),
            None => Ok(default),
        }
    }

    fn flag_or(&self, key: &str, default: bool) -> anyhow::Result<bool> {
        match self.get(key).map(|v| v.trim().to_ascii_lowercase()) {
            None => Ok(default),
            Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
            Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
            Some(v) => Err(anyhow!("{key} must be a boolean, got '{v}'")),
        }
    }
}
