use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;
use crate::presentation::http::handlers::health::healthz;

pub(crate) mod auth;
pub(crate) mod users;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .nest("/auth", auth::router())
        .nest("/users", users::router(state))
        .fallback(|| async { AppError::NotFound })
}
