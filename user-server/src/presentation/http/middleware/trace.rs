use std::time::Duration;

use axum::Router;
use axum::http::{Request, Response};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::application::request_context::RequestContext;

pub(crate) fn apply_trace(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &Request<_>| {
                let (request_id, api_id) = req
                    .extensions()
                    .get::<RequestContext>()
                    .map(|ctx| (ctx.request_id.clone(), ctx.api_id.clone()))
                    .unwrap_or_default();
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri(),
                    %request_id,
                    %api_id,
                    user_id = tracing::field::Empty,
                    status = tracing::field::Empty,
                )
            })
            .on_response(|res: &Response<_>, latency: Duration, span: &Span| {
                let status = res.status();
                span.record("status", tracing::field::display(status));
                let latency_ms = latency.as_millis() as u64;
                if status.is_server_error() {
                    tracing::error!(%status, latency_ms, "response");
                } else {
                    tracing::info!(%status, latency_ms, "response");
                }
            }),
    )
}
