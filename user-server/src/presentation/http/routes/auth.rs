use axum::{Router, routing::post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::auth::{login, refresh};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}
