use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::repo_types::{NewUser, User};
use crate::db::Database;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("a user with this email already exists")]
    DuplicateKey,
    #[error("store query failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// Sole reader/writer of user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Idempotent; returns immediately once connected.
    async fn connect(&self) -> Result<(), StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn create_user(&self, fields: NewUser) -> Result<User, StoreError>;
}

pub struct PgUserStore {
    db: Arc<Database>,
}

impl PgUserStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn connect(&self) -> Result<(), StoreError> {
        self.db.connect().await.map_err(StoreError::Connection)?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let pool = self.db.connect().await.map_err(StoreError::Connection)?;
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, image, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, fields: NewUser) -> Result<User, StoreError> {
        let pool = self.db.connect().await.map_err(StoreError::Connection)?;
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password_hash, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, password_hash, image, created_at
            "#,
        )
        .bind(&fields.email)
        .bind(&fields.name)
        .bind(&fields.password_hash)
        .bind(&fields.image)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateKey
            } else {
                StoreError::Query(e)
            }
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use time::OffsetDateTime;
    use tokio::sync::RwLock;
    use uuid::Uuid;

    use super::{StoreError, UserStore};
    use crate::auth::repo_types::{NewUser, User};

    /// Store double keyed by email, mirroring the unique index.
    #[derive(Default)]
    pub struct MemoryUserStore {
        users: RwLock<HashMap<String, User>>,
        offline: bool,
        lose_next_insert: AtomicBool,
    }

    impl MemoryUserStore {
        /// A store whose every call fails as if the database were unreachable.
        pub fn offline() -> Self {
            Self {
                offline: true,
                ..Self::default()
            }
        }

        /// A store where the next insert loses a race: another writer stores
        /// the same email first and the insert hits the unique index.
        pub fn losing_next_insert() -> Self {
            Self {
                lose_next_insert: AtomicBool::new(true),
                ..Self::default()
            }
        }

        pub async fn count(&self) -> usize {
            self.users.read().await.len()
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.offline {
                return Err(StoreError::Connection(sqlx::Error::PoolTimedOut));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn connect(&self) -> Result<(), StoreError> {
            self.check()
        }

        async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
            self.check()?;
            Ok(self.users.read().await.get(email).cloned())
        }

        async fn create_user(&self, fields: NewUser) -> Result<User, StoreError> {
            self.check()?;
            let mut users = self.users.write().await;
            if self.lose_next_insert.swap(false, Ordering::SeqCst) {
                let winner = User {
                    id: Uuid::new_v4(),
                    email: fields.email.clone(),
                    name: fields.name.clone(),
                    password_hash: None,
                    image: fields.image.clone(),
                    created_at: OffsetDateTime::now_utc(),
                };
                users.insert(winner.email.clone(), winner);
            }
            if users.contains_key(&fields.email) {
                return Err(StoreError::DuplicateKey);
            }
            let user = User {
                id: Uuid::new_v4(),
                email: fields.email,
                name: fields.name,
                password_hash: fields.password_hash,
                image: fields.image,
                created_at: OffsetDateTime::now_utc(),
            };
            users.insert(user.email.clone(), user.clone());
            Ok(user)
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryUserStore::default();
        let fields = NewUser {
            email: "a@x.com".into(),
            ..Default::default()
        };
        store.create_user(fields.clone()).await.unwrap();
        assert!(matches!(
            store.create_user(fields).await,
            Err(StoreError::DuplicateKey)
        ));
        assert_eq!(store.count().await, 1);
    }
}
