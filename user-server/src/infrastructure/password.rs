use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum PasswordError {
    #[error("password cannot be empty")]
    Empty,

    #[error("invalid password hashing parameters: {0}")]
    InvalidParams(String),

    #[error("failed to hash password: {0}")]
    Hash(String),
}

/// Argon2id work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PasswordCost {
    pub(crate) memory_kib: u32,
    pub(crate) iterations: u32,
    pub(crate) parallelism: u32,
}

impl Default for PasswordCost {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PasswordService {
    params: Params,
}

impl PasswordService {
    pub(crate) fn new(cost: PasswordCost) -> Result<Self, PasswordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|err| PasswordError::InvalidParams(err.to_string()))?;
        Ok(Self { params })
    }

    pub(crate) fn hash(&self, raw_password: &str) -> Result<String, PasswordError> {
        if raw_password.trim().is_empty() {
            return Err(PasswordError::Empty);
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = self
            .argon2()
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| PasswordError::Hash(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    /// Malformed digests and mismatches both yield `false`. Verification runs
    /// with the parameters embedded in the digest.
    pub(crate) fn verify(&self, raw_password: &str, password_hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(password_hash) else {
            return false;
        };
        self.argon2()
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

#[cfg(test)]
pub(crate) fn fast_password_service() -> PasswordService {
    PasswordService::new(PasswordCost {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("test params must be valid")
}
