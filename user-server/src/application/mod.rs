pub(crate) mod auth_service;
pub(crate) mod request_context;
pub(crate) mod user_service;
