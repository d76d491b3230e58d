use std::backtrace::Backtrace;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

use crate::domain::error::DomainError;
use crate::presentation::http::response::{ErrorResponse, FieldError};

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    /// Body extraction failure carrying the extractor's own status
    /// (400, 413 or 415).
    #[error("rejected body ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Domain(err) => domain_response(err),
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::validation(field_errors(&err)),
            ),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse::message("Route not found"),
            ),
            AppError::BadRequest(msg) => {
                warn!(reason = %msg, "bad request");
                (StatusCode::BAD_REQUEST, ErrorResponse::message(msg))
            }
            AppError::Rejected { status, message } => {
                warn!(%status, reason = %message, "request body rejected");
                (status, ErrorResponse::message(message))
            }
            AppError::Unauthorized(reason) => {
                (StatusCode::UNAUTHORIZED, ErrorResponse::message(reason))
            }
            AppError::Internal(err) => {
                error!(error = ?err, backtrace = %Backtrace::force_capture(), "internal error");
                internal()
            }
        };

        (status, Json(body)).into_response()
    }
}

fn domain_response(err: DomainError) -> (StatusCode, ErrorResponse) {
    match err {
        DomainError::Validation { field, message } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::validation(vec![FieldError {
                field: field.to_string(),
                message: message.to_string(),
            }]),
        ),
        DomainError::NotFound(what) => {
            warn!(resource = %what, "not found");
            (
                StatusCode::NOT_FOUND,
                ErrorResponse::message("User not found"),
            )
        }
        DomainError::AlreadyExists(what) => (
            StatusCode::CONFLICT,
            ErrorResponse::message(format!("{} already exists", capitalize(&what))),
        ),
        DomainError::RequestTimeout => (
            StatusCode::REQUEST_TIMEOUT,
            ErrorResponse::message("Request timeout"),
        ),
        DomainError::Forbidden => (StatusCode::FORBIDDEN, ErrorResponse::message("Forbidden")),
        DomainError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            ErrorResponse::message("Invalid email or password"),
        ),
        DomainError::TokenExpired => (
            StatusCode::UNAUTHORIZED,
            ErrorResponse::message("Token has expired"),
        ),
        DomainError::InvalidToken => (
            StatusCode::UNAUTHORIZED,
            ErrorResponse::message("Invalid token"),
        ),
        DomainError::Unexpected(msg) => {
            error!(error = %msg, backtrace = %Backtrace::force_capture(), "unexpected domain error");
            internal()
        }
    }
}

fn internal() -> (StatusCode, ErrorResponse) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::message("Internal server error"),
    )
}

/// Flattens validator output into `{field, message}` pairs, sorted by field.
fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| FieldError {
                field: field.to_string(),
                message: err
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| err.code.to_string()),
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
