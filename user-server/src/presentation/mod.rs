use std::sync::Arc;
use std::time::Duration;

use crate::application::auth_service::AuthService;
use crate::application::user_service::UserService;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod http;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) user_service: Arc<UserService>,
    pub(crate) auth_service: Arc<AuthService>,
    pub(crate) jwt: Arc<JwtService>,
    pub(crate) create_user_timeout: Duration,
}

impl AppState {
    pub(crate) fn new(
        user_service: Arc<UserService>,
        auth_service: Arc<AuthService>,
        jwt: Arc<JwtService>,
        create_user_timeout: Duration,
    ) -> Self {
        Self {
            user_service,
            auth_service,
            jwt,
            create_user_timeout,
        }
    }
}
