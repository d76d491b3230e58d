use std::sync::Arc;

use tracing::info;

use crate::application::request_context::RequestContext;
use crate::data::user_repository::{NewUser, UserPatch, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::pagination::{PageMeta, PageQuery};
use crate::domain::user::{CreateUserRequest, UpdateUserRequest, User, validate_user_id};
use crate::infrastructure::password::{PasswordError, PasswordService};

#[derive(Debug, Clone)]
pub(crate) struct ListUsersResult {
    pub(crate) users: Vec<User>,
    pub(crate) meta: PageMeta,
}

pub(crate) struct UserService {
    repo: Arc<dyn UserRepository>,
    passwords: Arc<PasswordService>,
}

impl UserService {
    pub(crate) fn new(repo: Arc<dyn UserRepository>, passwords: Arc<PasswordService>) -> Self {
        Self { repo, passwords }
    }

    /// Every step runs under the context deadline; a timed-out insert is
    /// dropped together with its transaction.
    pub(crate) async fn create_user(
        &self,
        ctx: &RequestContext,
        req: CreateUserRequest,
    ) -> Result<User, DomainError> {
        ctx.ensure_active()?;
        let req = req.validate()?;

        let existing = ctx
            .within_deadline(
                self.repo
                    .find_by_email_or_username(&req.email, &req.username),
            )
            .await?;
        if existing.is_some() {
            return Err(DomainError::AlreadyExists("user".to_string()));
        }

        let password_hash = ctx.within_deadline(self.hash_password(req.password)).await?;

        let new_user = NewUser {
            username: req.username,
            email: req.email,
            password_hash,
        };
        let user = ctx.within_deadline(self.repo.create_user(new_user)).await?;

        info!(
            user_id = user.id,
            request_id = %ctx.request_id,
            api_id = %ctx.api_id,
            "user created"
        );
        Ok(user)
    }

    pub(crate) async fn get_user(&self, id: i64) -> Result<User, DomainError> {
        let id = validate_user_id(id)?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {id}")))
    }

    pub(crate) async fn list_users(&self, query: PageQuery) -> Result<ListUsersResult, DomainError> {
        let pagination = query.resolve()?;
        let (users, total) = self.repo.list_users(pagination).await?;

        Ok(ListUsersResult {
            users,
            meta: PageMeta::new(pagination, total),
        })
    }

    pub(crate) async fn update_user(
        &self,
        actor_user_id: i64,
        id: i64,
        req: UpdateUserRequest,
    ) -> Result<User, DomainError> {
        let id = validate_user_id(id)?;
        if actor_user_id != id {
            return Err(DomainError::Forbidden);
        }
        let req = req.validate()?;

        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {id}")))?;

        if let Some(username) = req.username.as_deref()
            && username != current.username
            && let Some(owner) = self.repo.find_by_username(username).await?
            && owner.id != id
        {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }

        let patch = UserPatch {
            username: req.username.unwrap_or(current.username),
            email: req.email.unwrap_or(current.email),
        };
        self.repo
            .update_user(id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {id}")))
    }

    pub(crate) async fn soft_delete(&self, actor_user_id: i64, id: i64) -> Result<(), DomainError> {
        let id = validate_user_id(id)?;
        if actor_user_id != id {
            return Err(DomainError::Forbidden);
        }

        let deleted = self.repo.soft_delete(id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("user id: {id}")));
        }
        info!(user_id = id, "user soft-deleted");
        Ok(())
    }

    async fn hash_password(&self, password: String) -> Result<String, DomainError> {
        let passwords = Arc::clone(&self.passwords);
        tokio::task::spawn_blocking(move || passwords.hash(&password))
            .await
            .map_err(|err| DomainError::Unexpected(err.to_string()))?
            .map_err(|err| match err {
                PasswordError::Empty => DomainError::Validation {
                    field: "password",
                    message: "must not be empty",
                },
                other => DomainError::Unexpected(other.to_string()),
            })
    }
}
