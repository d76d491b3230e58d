use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::DomainError;

const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 50;
const PASSWORD_MIN_LEN: usize = 6;
const PASSWORD_MAX_LEN: usize = 128;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreateUserRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

impl CreateUserRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = normalize_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        let password_len = self.password.chars().count();
        if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&password_len) {
            return Err(DomainError::Validation {
                field: "password",
                message: "must be 6..128 chars",
            });
        }
        Ok(Self {
            username,
            email,
            password: self.password,
        })
    }
}

/// Partial profile update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct UpdateUserRequest {
    pub(crate) username: Option<String>,
    pub(crate) email: Option<String>,
}

impl UpdateUserRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = self
            .username
            .as_deref()
            .map(normalize_username)
            .transpose()?;
        let email = self.email.as_deref().map(normalize_email).transpose()?;
        Ok(Self { username, email })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let email = normalize_email(&self.email)?;
        if self.password.is_empty() {
            return Err(DomainError::Validation {
                field: "password",
                message: "must not be empty",
            });
        }
        Ok(Self {
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub(crate) fn new(
        id: i64,
        username: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }
        let username = username.into();
        if username.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "username",
                message: "must not be empty",
            });
        }
        let email = email.into();
        if email.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "email",
                message: "must not be empty",
            });
        }
        if updated_at < created_at {
            return Err(DomainError::Validation {
                field: "updated_at",
                message: "must be >= created_at",
            });
        }

        Ok(Self {
            id,
            username,
            email,
            created_at,
            updated_at,
            deleted_at,
        })
    }

    pub(crate) fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

pub(crate) fn validate_user_id(id: i64) -> Result<i64, DomainError> {
    if id <= 0 {
        return Err(DomainError::Validation {
            field: "id",
            message: "must be > 0",
        });
    }
    Ok(id)
}

fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(DomainError::Validation {
            field: "username",
            message: "must not be empty",
        });
    }
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(DomainError::Validation {
            field: "username",
            message: "must be 3..50 chars",
        });
    }
    Ok(username.to_string())
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must not be empty",
        });
    }
    if !email.validate_email() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must be a valid email",
        });
    }
    Ok(email)
}
