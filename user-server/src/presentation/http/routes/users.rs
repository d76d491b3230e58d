use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::http::handlers::users::{
    create_user, get_user, list_users, soft_delete_user, update_user,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/{id}", get(get_user));

    let protected = Router::new()
        .route("/{id}", put(update_user).patch(soft_delete_user))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(protected)
}
