use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::request_context::RequestContext;
use crate::application::user_service::ListUsersResult;
use crate::domain::pagination::PageQuery;
use crate::domain::user::{CreateUserRequest, UpdateUserRequest, User};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{AppJson, AppPath, AppQuery};
use crate::presentation::http::middleware::auth::AuthenticatedUser;
use crate::presentation::http::response::ApiResponse;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateUserDto {
    #[validate(length(min = 3, max = 50, message = "must be 3..50 chars"))]
    pub(crate) username: String,
    #[validate(email(message = "must be a valid email"))]
    pub(crate) email: String,
    #[validate(length(min = 6, max = 128, message = "must be 6..128 chars"))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateUserDto {
    #[validate(length(min = 3, max = 50, message = "must be 3..50 chars"))]
    pub(crate) username: Option<String>,
    #[validate(email(message = "must be a valid email"))]
    pub(crate) email: Option<String>,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct ListUsersQuery {
    /// Page number, starting at 1
    pub(crate) page: Option<u32>,
    /// Items per page, at most 100; 0 or absent means 10
    #[validate(range(max = 100, message = "must be 1..100"))]
    pub(crate) limit: Option<u32>,
    /// Explicit offset; overrides the one derived from `page`
    pub(crate) offset: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl CreateUserDto {
    /// Field rules apply to the trimmed values the domain will store.
    fn trimmed(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
        }
    }
}

impl UpdateUserDto {
    fn trimmed(self) -> Self {
        Self {
            username: self.username.map(|username| username.trim().to_string()),
            email: self.email.map(|email| email.trim().to_string()),
        }
    }
}

impl From<ListUsersQuery> for PageQuery {
    fn from(query: ListUsersQuery) -> Self {
        Self {
            page: query.page,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

impl From<ListUsersResult> for ApiResponse<Vec<UserDto>> {
    fn from(result: ListUsersResult) -> Self {
        ApiResponse::with_meta(
            "Users retrieved successfully",
            result.users.into_iter().map(UserDto::from).collect(),
            result.meta,
        )
    }
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserDto>),
        (status = 400, description = "Validation error"),
        (status = 408, description = "Request timed out"),
        (status = 409, description = "Username or email already in use"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    AppJson(dto): AppJson<CreateUserDto>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserDto>>)> {
    let dto = dto.trimmed();
    dto.validate()?;
    let req = CreateUserRequest {
        username: dto.username,
        email: dto.email,
        password: dto.password,
    };

    let ctx = ctx.with_timeout(state.create_user_timeout);
    let user = state.user_service.create_user(&ctx, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("User created successfully", UserDto::from(user))),
    ))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User found", body = ApiResponse<UserDto>),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserDto>>)> {
    let user = state.user_service.get_user(id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::new("User retrieved successfully", UserDto::from(user))),
    ))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users listed", body = ApiResponse<Vec<UserDto>>),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_users(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListUsersQuery>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vec<UserDto>>>)> {
    query.validate()?;
    let result = state.user_service.list_users(query.into()).await?;

    Ok((StatusCode::OK, Json(result.into())))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "User id")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the account owner"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username or email already in use"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i64>,
    AppJson(dto): AppJson<UpdateUserDto>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserDto>>)> {
    let dto = dto.trimmed();
    dto.validate()?;
    let req = UpdateUserRequest {
        username: dto.username,
        email: dto.email,
    };

    let user = state.user_service.update_user(auth.user_id, id, req).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::new("User updated successfully", UserDto::from(user))),
    ))
}

#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "User id")
    ),
    responses(
        (status = 204, description = "User soft-deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the account owner"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn soft_delete_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    state.user_service.soft_delete(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
