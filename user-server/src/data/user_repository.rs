use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::pagination::Pagination;
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct UserPatch {
    pub(crate) username: String,
    pub(crate) email: String,
}

/// Storage for the `users` table. Every lookup ignores soft-deleted rows.
#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, DomainError>;
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, DomainError>;
    /// Returns the requested page together with the total number of active rows.
    async fn list_users(&self, pagination: Pagination) -> Result<(Vec<User>, i64), DomainError>;
    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>, DomainError>;
    /// `false` when no active row matched.
    async fn soft_delete(&self, id: i64) -> Result<bool, DomainError>;
}
