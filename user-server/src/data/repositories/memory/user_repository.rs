use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::data::user_repository::{NewUser, UserCredentials, UserPatch, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::pagination::Pagination;
use crate::domain::user::User;

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// Test double for the Postgres repository. Rows are soft-deleted in place so
/// tests can inspect tombstones.
#[derive(Clone, Default)]
pub(crate) struct InMemoryUserRepository {
    rows: Arc<Mutex<Vec<StoredUser>>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl InMemoryUserRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `delay` before touching the rows.
    pub(crate) fn set_delay(&self, delay: Duration) {
        *self.delay.lock().expect("delay mutex poisoned") = Some(delay);
    }

    pub(crate) fn stored(&self, id: i64) -> Option<User> {
        self.rows
            .lock()
            .expect("rows mutex poisoned")
            .iter()
            .find(|row| row.user.id == id)
            .map(|row| row.user.clone())
    }

    pub(crate) fn password_hash(&self, id: i64) -> Option<String> {
        self.rows
            .lock()
            .expect("rows mutex poisoned")
            .iter()
            .find(|row| row.user.id == id)
            .map(|row| row.password_hash.clone())
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().expect("delay mutex poisoned");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn active<F>(&self, predicate: F) -> Option<StoredUser>
    where
        F: Fn(&User) -> bool,
    {
        self.rows
            .lock()
            .expect("rows mutex poisoned")
            .iter()
            .find(|row| !row.user.is_deleted() && predicate(&row.user))
            .cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        self.pause().await;
        let mut rows = self.rows.lock().expect("rows mutex poisoned");
        for row in rows.iter().filter(|row| !row.user.is_deleted()) {
            if row.user.username == input.username {
                return Err(DomainError::AlreadyExists("username".to_string()));
            }
            if row.user.email == input.email {
                return Err(DomainError::AlreadyExists("email".to_string()));
            }
        }

        let now = Utc::now();
        let id = rows.len() as i64 + 1;
        let user = User::new(id, input.username, input.email, now, now, None)?;
        rows.push(StoredUser {
            user: user.clone(),
            password_hash: input.password_hash,
        });
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        self.pause().await;
        Ok(self.active(|user| user.id == id).map(|row| row.user))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.pause().await;
        Ok(self
            .active(|user| user.username == username)
            .map(|row| row.user))
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, DomainError> {
        self.pause().await;
        Ok(self
            .active(|user| user.email == email || user.username == username)
            .map(|row| row.user))
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        self.pause().await;
        Ok(self
            .active(|user| user.email == email)
            .map(|row| UserCredentials {
                user: row.user,
                password_hash: row.password_hash,
            }))
    }

    async fn list_users(&self, pagination: Pagination) -> Result<(Vec<User>, i64), DomainError> {
        self.pause().await;
        let rows = self.rows.lock().expect("rows mutex poisoned");
        let mut active: Vec<User> = rows
            .iter()
            .filter(|row| !row.user.is_deleted())
            .map(|row| row.user.clone())
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = active.len() as i64;
        let page = active
            .into_iter()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>, DomainError> {
        self.pause().await;
        let mut rows = self.rows.lock().expect("rows mutex poisoned");
        let taken = rows.iter().any(|row| {
            !row.user.is_deleted() && row.user.id != id && row.user.email == patch.email
        });
        if taken {
            return Err(DomainError::AlreadyExists("email".to_string()));
        }

        let Some(row) = rows
            .iter_mut()
            .find(|row| row.user.id == id && !row.user.is_deleted())
        else {
            return Ok(None);
        };
        row.user.username = patch.username;
        row.user.email = patch.email;
        row.user.updated_at = Utc::now();
        Ok(Some(row.user.clone()))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, DomainError> {
        self.pause().await;
        let mut rows = self.rows.lock().expect("rows mutex poisoned");
        match rows
            .iter_mut()
            .find(|row| row.user.id == id && !row.user.is_deleted())
        {
            Some(row) => {
                row.user.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
