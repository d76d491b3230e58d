use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::pagination::PageMeta;

/// Success envelope shared by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ApiResponse<T> {
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) meta: Option<PageMeta>,
}

impl<T> ApiResponse<T> {
    pub(crate) fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta: None,
        }
    }

    pub(crate) fn with_meta(message: impl Into<String>, data: T, meta: PageMeta) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta: Some(meta),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct FieldError {
    pub(crate) field: String,
    pub(crate) message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorResponse {
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) errors: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub(crate) fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }

    pub(crate) fn validation(errors: Vec<FieldError>) -> Self {
        Self {
            message: "Validation failed".to_string(),
            errors: Some(errors),
        }
    }
}
