//! Identifier generation plus the secret-handling helpers.
//!
//! The service itself only mints API ids; sealing, key derivation and API
//! keys are kept behind `cfg(test)` until a caller needs them.

use uuid::Uuid;

#[cfg(test)]
pub(crate) mod secrets;

/// Fresh `X-API-ID` value for callers that did not send one.
pub(crate) fn generate_api_id() -> String {
    Uuid::new_v4().to_string()
}
