use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::data::user_repository::{NewUser, UserCredentials, UserPatch, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::pagination::Pagination;
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub(crate) struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(
        &self,
        operation: &'static str,
    ) -> Result<Transaction<'static, Postgres>, DomainError> {
        self.pool.begin().await.map_err(|err| {
            tracing::error!(operation, error = %err, "failed to start transaction");
            map_user_db_error(err)
        })
    }
}

#[derive(FromRow)]
struct UserRow {
    usr_id: i64,
    usr_username: String,
    usr_email: String,
    usr_created_at: DateTime<Utc>,
    usr_updated_at: DateTime<Utc>,
    usr_deleted_at: Option<DateTime<Utc>>,
}

#[derive(FromRow)]
struct UserCredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    usr_password: String,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut tx = self.begin("create_user").await?;
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (usr_username, usr_email, usr_password, usr_created_at, usr_updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING usr_id, usr_username, usr_email, usr_created_at, usr_updated_at, usr_deleted_at
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.password_hash)
        .fetch_one(&mut *tx)
        .await;

        let row = finish(tx, "create_user", result).await?;
        map_row_to_user(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        let mut tx = self.begin("find_by_id").await?;
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT usr_id, usr_username, usr_email, usr_created_at, usr_updated_at, usr_deleted_at
            FROM users
            WHERE usr_id = $1 AND usr_deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await;

        finish(tx, "find_by_id", result)
            .await?
            .map(map_row_to_user)
            .transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let mut tx = self.begin("find_by_username").await?;
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT usr_id, usr_username, usr_email, usr_created_at, usr_updated_at, usr_deleted_at
            FROM users
            WHERE usr_username = $1 AND usr_deleted_at IS NULL
            LIMIT 1
            "#,
        )
        .bind(username)
        .fetch_optional(&mut *tx)
        .await;

        finish(tx, "find_by_username", result)
            .await?
            .map(map_row_to_user)
            .transpose()
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, DomainError> {
        let mut tx = self.begin("find_by_email_or_username").await?;
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT usr_id, usr_username, usr_email, usr_created_at, usr_updated_at, usr_deleted_at
            FROM users
            WHERE (usr_email = $1 OR usr_username = $2) AND usr_deleted_at IS NULL
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(username)
        .fetch_optional(&mut *tx)
        .await;

        finish(tx, "find_by_email_or_username", result)
            .await?
            .map(map_row_to_user)
            .transpose()
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let mut tx = self.begin("find_credentials_by_email").await?;
        let result = sqlx::query_as::<_, UserCredentialsRow>(
            r#"
            SELECT
                usr_id,
                usr_username,
                usr_email,
                usr_password,
                usr_created_at,
                usr_updated_at,
                usr_deleted_at
            FROM users
            WHERE usr_email = $1 AND usr_deleted_at IS NULL
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&mut *tx)
        .await;

        if let Some(r) = finish(tx, "find_credentials_by_email", result).await? {
            let user = map_row_to_user(r.user)?;
            Ok(Some(UserCredentials {
                user,
                password_hash: r.usr_password,
            }))
        } else {
            Ok(None)
        }
    }

    async fn list_users(&self, pagination: Pagination) -> Result<(Vec<User>, i64), DomainError> {
        let limit = i64::from(pagination.limit);
        let offset = i64::from(pagination.offset);

        let mut tx = self.begin("list_users").await?;
        let result = async {
            let total = sqlx::query_scalar::<_, i64>(
                r#"
                SELECT COUNT(*)
                FROM users
                WHERE usr_deleted_at IS NULL
                "#,
            )
            .fetch_one(&mut *tx)
            .await?;

            let rows = sqlx::query_as::<_, UserRow>(
                r#"
                SELECT usr_id, usr_username, usr_email, usr_created_at, usr_updated_at, usr_deleted_at
                FROM users
                WHERE usr_deleted_at IS NULL
                ORDER BY usr_created_at DESC, usr_id DESC
                LIMIT $1
                OFFSET $2
                "#,
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *tx)
            .await?;

            Ok::<_, sqlx::Error>((rows, total))
        }
        .await;

        let (rows, total) = finish(tx, "list_users", result).await?;
        let users = rows
            .into_iter()
            .map(map_row_to_user)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((users, total))
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>, DomainError> {
        let mut tx = self.begin("update_user").await?;
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET usr_username = $2,
                usr_email = $3,
                usr_updated_at = NOW()
            WHERE usr_id = $1 AND usr_deleted_at IS NULL
            RETURNING usr_id, usr_username, usr_email, usr_created_at, usr_updated_at, usr_deleted_at
            "#,
        )
        .bind(id)
        .bind(&patch.username)
        .bind(&patch.email)
        .fetch_optional(&mut *tx)
        .await;

        finish(tx, "update_user", result)
            .await?
            .map(map_row_to_user)
            .transpose()
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, DomainError> {
        let mut tx = self.begin("soft_delete").await?;
        let result = sqlx::query(
            r#"
            UPDATE users
            SET usr_deleted_at = NOW()
            WHERE usr_id = $1 AND usr_deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await;

        let done = finish(tx, "soft_delete", result).await?;
        Ok(done.rows_affected() > 0)
    }
}

/// Commits on success, rolls back and maps the error otherwise.
async fn finish<T>(
    tx: Transaction<'static, Postgres>,
    operation: &'static str,
    result: Result<T, sqlx::Error>,
) -> Result<T, DomainError> {
    match result {
        Ok(value) => {
            tx.commit().await.map_err(|err| {
                tracing::error!(operation, error = %err, "failed to commit transaction");
                map_user_db_error(err)
            })?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(operation, error = %rollback_err, "failed to roll back transaction");
            }
            let mapped = map_user_db_error(err);
            match &mapped {
                DomainError::AlreadyExists(field) => {
                    tracing::warn!(operation, field = %field, "unique constraint violated");
                }
                other => tracing::error!(operation, error = %other, "query failed"),
            }
            Err(mapped)
        }
    }
}

fn map_row_to_user(row: UserRow) -> Result<User, DomainError> {
    User::new(
        row.usr_id,
        row.usr_username,
        row.usr_email,
        row.usr_created_at,
        row.usr_updated_at,
        row.usr_deleted_at,
    )
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_user_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        let resource = match db_err.constraint() {
            Some("users_username_active_key") => "username",
            Some("users_email_active_key") => "email",
            _ => "user",
        };
        return DomainError::AlreadyExists(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
