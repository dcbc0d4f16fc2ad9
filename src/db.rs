use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::OnceCell;
use tracing::{error, info};

/// Lazily dialed Postgres handle shared by every component that touches the store.
///
/// The first `connect()` call dials; concurrent callers wait on the same attempt.
/// A failed attempt leaves the cell empty so the next caller dials again.
pub struct Database {
    url: String,
    max_connections: u32,
    connect_timeout: Duration,
    pool: OnceCell<PgPool>,
}

impl Database {
    pub fn new(url: impl Into<String>, max_connections: u32, connect_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            max_connections,
            connect_timeout,
            pool: OnceCell::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.pool.initialized()
    }

    pub async fn connect(&self) -> Result<&PgPool, sqlx::Error> {
        self.pool
            .get_or_try_init(|| async {
                info!("connecting to postgres");
                PgPoolOptions::new()
                    .max_connections(self.max_connections)
                    .acquire_timeout(self.connect_timeout)
                    .connect(&self.url)
                    .await
                    .map_err(|e| {
                        error!(error = %e, "postgres connect failed");
                        e
                    })
            })
            .await
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        let pool = self.connect().await.context("connect to database")?;
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_disconnected() {
        let db = Database::new("postgres://localhost/none", 1, Duration::from_millis(10));
        assert!(!db.is_connected());
    }

    #[tokio::test]
    async fn failed_connect_is_propagated_and_not_cached() {
        let db = Database::new("not-a-url", 1, Duration::from_millis(50));
        assert!(db.connect().await.is_err());
        assert!(!db.is_connected());
        assert!(db.connect().await.is_err());
    }
}
