use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::pagination::PageMeta;
use crate::presentation::http::handlers::auth::{
    LoginDto, LoginResponseDto, RefreshDto, TokenPairDto,
};
use crate::presentation::http::handlers::health::HealthDto;
use crate::presentation::http::handlers::users::{CreateUserDto, UpdateUserDto, UserDto};
use crate::presentation::http::response::{ErrorResponse, FieldError};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::health::healthz,
        crate::presentation::http::handlers::auth::login,
        crate::presentation::http::handlers::auth::refresh,
        crate::presentation::http::handlers::users::create_user,
        crate::presentation::http::handlers::users::get_user,
        crate::presentation::http::handlers::users::list_users,
        crate::presentation::http::handlers::users::update_user,
        crate::presentation::http::handlers::users::soft_delete_user
    ),
    components(
        schemas(
            HealthDto,
            LoginDto,
            RefreshDto,
            TokenPairDto,
            LoginResponseDto,
            CreateUserDto,
            UpdateUserDto,
            UserDto,
            PageMeta,
            ErrorResponse,
            FieldError
        )
    ),
    tags(
        (name = "auth", description = "Login and token refresh"),
        (name = "users", description = "User accounts"),
        (name = "health", description = "Liveness probe")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
