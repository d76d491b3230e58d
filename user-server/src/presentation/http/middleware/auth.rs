use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::{Span, debug};

use crate::infrastructure::jwt::JwtError;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;

#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: i64,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Unauthorized("Missing authorization header"))
    }
}

pub(crate) async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthorized("Missing authorization header"))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header format"))?;

    let token = bearer_token(auth_header)
        .ok_or(AppError::Unauthorized("Invalid authorization header format"))?;

    let claims = state.jwt.verify_token(token).map_err(|err| match err {
        JwtError::Expired => AppError::Unauthorized("Token has expired"),
        other => {
            debug!(error = %other, "token rejected");
            AppError::Unauthorized("Invalid token")
        }
    })?;
    if claims.is_refresh() {
        return Err(AppError::Unauthorized("Invalid token"));
    }

    Span::current().record("user_id", claims.user_id);
    request.extensions_mut().insert(AuthenticatedUser {
        user_id: claims.user_id,
    });

    Ok(next.run(request).await)
}

fn bearer_token(header_value: &str) -> Option<&str> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}
