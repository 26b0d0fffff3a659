//! User lookup interface used by `AuthService`.
use async_trait::async_trait;
use sqlx::PgPool;

use crate::repos::{
    error::RepoError,
    user_repo::{self, NewUser, UserRow},
};

/// The subset of user persistence token issuance needs.
///
/// Implementations must be cheap to share (`Arc<dyn UserStore>` in `AuthService`).
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, RepoError>;

    async fn create(&self, user: NewUser<'_>) -> Result<UserRow, RepoError>;
}

/// Postgres-backed store (`users` table).
#[derive(Clone, Debug)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, RepoError> {
        user_repo::find_by_email(&self.db, email).await
    }

    async fn create(&self, user: NewUser<'_>) -> Result<UserRow, RepoError> {
        user_repo::create(&self.db, user).await
    }
}

#[cfg(test)]
pub(crate) use memory::MemoryUserStore;

#[cfg(test)]
mod memory {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use super::UserStore;
    use crate::repos::{
        error::RepoError,
        user_repo::{NewUser, UserRow},
    };

    /// In-memory double that records how many users were created.
    #[derive(Debug, Default)]
    pub(crate) struct MemoryUserStore {
        users: Mutex<Vec<UserRow>>,
    }

    impl MemoryUserStore {
        pub(crate) fn with_user(email: &str) -> Self {
            let store = Self::default();
            store.users.lock().unwrap().push(UserRow {
                id: Uuid::new_v4(),
                email: email.to_string(),
                first_name: None,
                last_name: None,
                created_at: Utc::now(),
            });
            store
        }

        pub(crate) fn len(&self) -> usize {
            self.users.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, RepoError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn create(&self, user: NewUser<'_>) -> Result<UserRow, RepoError> {
            let row = UserRow {
                id: Uuid::new_v4(),
                email: user.email.to_string(),
                first_name: user.first_name.map(str::to_string),
                last_name: user.last_name.map(str::to_string),
                created_at: Utc::now(),
            };
            self.users.lock().unwrap().push(row.clone());
            Ok(row)
        }
    }
}
