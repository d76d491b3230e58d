use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::user::LoginRequest;
use crate::infrastructure::jwt::TokenPair;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::AppJson;
use crate::presentation::http::handlers::users::UserDto;
use crate::presentation::http::response::ApiResponse;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct LoginDto {
    #[validate(email(message = "must be a valid email"))]
    pub(crate) email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct RefreshDto {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub(crate) refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TokenPairDto {
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
    pub(crate) token_type: String,
    pub(crate) expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LoginResponseDto {
    pub(crate) user: UserDto,
    pub(crate) tokens: TokenPairDto,
}

impl From<TokenPair> for TokenPairDto {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type,
            expires_in: pair.expires_in,
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<LoginResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    AppJson(dto): AppJson<LoginDto>,
) -> AppResult<(StatusCode, Json<ApiResponse<LoginResponseDto>>)> {
    let dto = LoginDto {
        email: dto.email.trim().to_string(),
        ..dto
    };
    dto.validate()?;
    let req = LoginRequest {
        email: dto.email,
        password: dto.password,
    };

    let result = state.auth_service.login(req).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(
            "Login successful",
            LoginResponseDto {
                user: UserDto::from(result.user),
                tokens: TokenPairDto::from(result.tokens),
            },
        )),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body = RefreshDto,
    responses(
        (status = 200, description = "Tokens refreshed", body = ApiResponse<TokenPairDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid or expired refresh token"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn refresh(
    State(state): State<AppState>,
    AppJson(dto): AppJson<RefreshDto>,
) -> AppResult<(StatusCode, Json<ApiResponse<TokenPairDto>>)> {
    dto.validate()?;
    let tokens = state.auth_service.refresh(&dto.refresh_token).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(
            "Token refreshed successfully",
            TokenPairDto::from(tokens),
        )),
    ))
}
