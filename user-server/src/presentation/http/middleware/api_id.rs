use std::convert::Infallible;

use axum::{
    Router,
    extract::{FromRequestParts, Request},
    http::{HeaderMap, HeaderName, HeaderValue, request::Parts},
    middleware::{self, Next},
    response::Response,
};
use uuid::Uuid;

use crate::application::request_context::RequestContext;
use crate::infrastructure::crypto::generate_api_id;

pub(crate) const API_ID_HEADER: HeaderName = HeaderName::from_static("x-api-id");
pub(crate) const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

const MAX_ID_LEN: usize = 128;

/// Reads or generates `X-API-ID`, stores a `RequestContext` in the request
/// extensions and echoes the id on the response. Expects the request id layer
/// to run first.
pub(crate) async fn api_id_middleware(mut request: Request, next: Next) -> Response {
    let api_id = header_id(request.headers(), &API_ID_HEADER).unwrap_or_else(generate_api_id);
    let request_id = header_id(request.headers(), &REQUEST_ID_HEADER)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestContext::new(request_id, api_id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&api_id) {
        response.headers_mut().insert(API_ID_HEADER, value);
    }
    response
}

pub(crate) fn apply_api_id(router: Router) -> Router {
    router.layer(middleware::from_fn(api_id_middleware))
}

fn header_id(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    if value.is_empty() || value.len() > MAX_ID_LEN {
        return None;
    }
    Some(value.to_string())
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_else(RequestContext::generated))
    }
}
