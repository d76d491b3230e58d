use axum::Router;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;

use crate::infrastructure::settings::Settings;

pub(crate) fn apply_limits(router: Router, settings: &Settings) -> Router {
    router
        .layer(RequestBodyLimitLayer::new(
            settings.http_request_body_limit_bytes,
        ))
        .layer(GlobalConcurrencyLimitLayer::new(
            settings.http_concurrency_limit,
        ))
}
