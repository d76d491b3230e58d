use std::any::Any;
use std::backtrace::Backtrace;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::error;

use crate::presentation::http::response::ErrorResponse;

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(msg) = err.downcast_ref::<String>() {
        msg.as_str()
    } else if let Some(msg) = err.downcast_ref::<&str>() {
        msg
    } else {
        "unknown panic payload"
    };
    error!(
        panic = %message,
        backtrace = %Backtrace::force_capture(),
        "handler panicked"
    );

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::message("Internal server error")),
    )
        .into_response()
}

pub(crate) fn apply_panic_recovery(router: Router) -> Router {
    router.layer(CatchPanicLayer::custom(handle_panic))
}
