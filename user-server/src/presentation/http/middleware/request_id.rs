use axum::Router;
use axum::http::Request;
use tower::ServiceBuilder;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use uuid::Uuid;

use super::api_id::REQUEST_ID_HEADER;

/// UUID v4 for requests that arrive without `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MakeUuidRequestId;

impl MakeRequestId for MakeUuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        Uuid::new_v4()
            .to_string()
            .parse()
            .ok()
            .map(RequestId::new)
    }
}

pub(crate) fn apply_request_id(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeUuidRequestId))
            .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER)),
    )
}
