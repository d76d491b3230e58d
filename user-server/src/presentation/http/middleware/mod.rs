pub(crate) mod api_id;
pub(crate) mod auth;
pub(crate) mod cors;
pub(crate) mod limits;
pub(crate) mod panic;
pub(crate) mod request_id;
pub(crate) mod trace;
