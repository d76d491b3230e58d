//! AES-256-GCM sealing, scrypt key derivation and API-key helpers.
//!
//! Ciphertexts are laid out as `nonce || ciphertext || tag` (12-byte nonce).
//! The string variants wrap that layout in standard base64.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng, rand_core::RngCore},
};
use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE},
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

pub(crate) const KEY_LEN: usize = 32;
pub(crate) const NONCE_LEN: usize = 12;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CryptoError {
    #[error("key must be {KEY_LEN} bytes for AES-256, got {0}")]
    InvalidKeyLength(usize),

    #[error("encryption failed")]
    Encryption,

    #[error("decryption failed: {0}")]
    Decryption(&'static str),

    #[error("failed to decode base64: {0}")]
    InvalidBase64(String),

    #[error("failed to derive key: {0}")]
    KeyDerivation(String),
}

/// scrypt cost parameters. `log_n = 15` matches N = 32768.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScryptConfig {
    pub(crate) log_n: u8,
    pub(crate) r: u32,
    pub(crate) p: u32,
    pub(crate) key_len: usize,
}

impl Default for ScryptConfig {
    fn default() -> Self {
        Self {
            log_n: 15,
            r: 8,
            p: 1,
            key_len: KEY_LEN,
        }
    }
}

pub(crate) fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = cipher(key)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| CryptoError::Encryption)?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

pub(crate) fn decrypt(data: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = cipher(key)?;
    if data.len() < NONCE_LEN {
        return Err(CryptoError::Decryption("ciphertext too short"));
    }

    let (nonce, ciphertext) = data.split_at(NONCE_LEN);
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::Decryption("authentication failed"))
}

pub(crate) fn encrypt_string(plaintext: &str, key: &[u8]) -> Result<String, CryptoError> {
    let encrypted = encrypt(plaintext.as_bytes(), key)?;
    Ok(STANDARD.encode(encrypted))
}

pub(crate) fn decrypt_string(encoded: &str, key: &[u8]) -> Result<String, CryptoError> {
    let encrypted = STANDARD
        .decode(encoded)
        .map_err(|err| CryptoError::InvalidBase64(err.to_string()))?;
    let decrypted = decrypt(&encrypted, key)?;
    String::from_utf8(decrypted).map_err(|_| CryptoError::Decryption("plaintext is not utf-8"))
}

pub(crate) fn derive_key(
    password: &[u8],
    salt: &[u8],
    config: ScryptConfig,
) -> Result<Vec<u8>, CryptoError> {
    let params = scrypt::Params::new(config.log_n, config.r, config.p, config.key_len)
        .map_err(|err| CryptoError::KeyDerivation(err.to_string()))?;

    let mut key = vec![0u8; config.key_len];
    scrypt::scrypt(password, salt, &params, &mut key)
        .map_err(|err| CryptoError::KeyDerivation(err.to_string()))?;
    Ok(key)
}

pub(crate) fn generate_random_key(len: usize) -> Vec<u8> {
    let mut key = vec![0u8; len];
    OsRng.fill_bytes(&mut key);
    key
}

pub(crate) fn generate_salt(len: usize) -> Vec<u8> {
    generate_random_key(len)
}

pub(crate) fn secure_compare(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

pub(crate) fn secure_compare_str(a: &str, b: &str) -> bool {
    secure_compare(a.as_bytes(), b.as_bytes())
}

/// Hex-encoded SHA-256.
pub(crate) fn hash_sha256(input: &str) -> String {
    format!("{:x}", Sha256::digest(input.as_bytes()))
}

pub(crate) fn generate_api_key() -> String {
    URL_SAFE.encode(generate_random_key(KEY_LEN))
}

pub(crate) fn hash_api_key(api_key: &str) -> String {
    hash_sha256(api_key)
}

pub(crate) fn verify_api_key(api_key: &str, hashed_key: &str) -> bool {
    secure_compare_str(&hash_api_key(api_key), hashed_key)
}

fn cipher(key: &[u8]) -> Result<Aes256Gcm, CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::InvalidKeyLength(key.len()));
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength(key.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_scrypt() -> ScryptConfig {
        ScryptConfig {
            log_n: 10,
            ..ScryptConfig::default()
        }
    }

    #[test]
    fn decrypt_restores_plaintext() {
        let key = generate_random_key(KEY_LEN);
        for message in [&b""[..], &b"a"[..], &b"hello world"[..], &[0u8; 1024][..]] {
            let encrypted = encrypt(message, &key).expect("encrypt");
            assert_eq!(encrypted.len(), NONCE_LEN + message.len() + 16);
            assert_eq!(decrypt(&encrypted, &key).expect("decrypt"), message);
        }
    }

    #[test]
    fn each_encryption_uses_fresh_nonce() {
        let key = generate_random_key(KEY_LEN);
        let first = encrypt(b"same", &key).expect("encrypt");
        let second = encrypt(b"same", &key).expect("encrypt");
        assert_ne!(first[..NONCE_LEN], second[..NONCE_LEN]);
    }

    #[test]
    fn decrypt_with_wrong_key_fails() {
        let key = generate_random_key(KEY_LEN);
        let other = generate_random_key(KEY_LEN);
        let encrypted = encrypt(b"secret", &key).expect("encrypt");

        assert!(matches!(
            decrypt(&encrypted, &other),
            Err(CryptoError::Decryption(_))
        ));
    }

    #[test]
    fn decrypt_rejects_truncated_and_tampered_input() {
        let key = generate_random_key(KEY_LEN);
        let mut encrypted = encrypt(b"secret", &key).expect("encrypt");

        assert_eq!(
            decrypt(&encrypted[..NONCE_LEN - 1], &key),
            Err(CryptoError::Decryption("ciphertext too short"))
        );
        assert!(decrypt(&encrypted[..encrypted.len() - 1], &key).is_err());

        let last = encrypted.len() - 1;
        encrypted[last] ^= 0x01;
        assert!(decrypt(&encrypted, &key).is_err());
    }

    #[test]
    fn key_must_be_32_bytes() {
        assert_eq!(
            encrypt(b"data", &[0u8; 16]),
            Err(CryptoError::InvalidKeyLength(16))
        );
        assert_eq!(
            decrypt(&[0u8; 64], &[0u8; 31]),
            Err(CryptoError::InvalidKeyLength(31))
        );
    }

    #[test]
    fn string_variants_use_base64() {
        let key = generate_random_key(KEY_LEN);
        let encoded = encrypt_string("привет", &key).expect("encrypt");
        assert!(STANDARD.decode(&encoded).is_ok());
        assert_eq!(decrypt_string(&encoded, &key).expect("decrypt"), "привет");

        assert!(matches!(
            decrypt_string("%%% not base64 %%%", &key),
            Err(CryptoError::InvalidBase64(_))
        ));
    }

    #[test]
    fn derived_key_is_deterministic_per_salt() {
        let salt = generate_salt(16);
        let first = derive_key(b"password", &salt, cheap_scrypt()).expect("derive");
        let second = derive_key(b"password", &salt, cheap_scrypt()).expect("derive");
        assert_eq!(first, second);
        assert_eq!(first.len(), KEY_LEN);

        let other_salt = derive_key(b"password", &generate_salt(16), cheap_scrypt())
            .expect("derive");
        assert_ne!(first, other_salt);
    }

    #[test]
    fn derived_key_encrypts() {
        let key = derive_key(b"pass phrase", b"fixed-salt", cheap_scrypt()).expect("derive");
        let encrypted = encrypt(b"payload", &key).expect("encrypt");
        assert_eq!(decrypt(&encrypted, &key).expect("decrypt"), b"payload");
    }

    #[test]
    fn derive_key_rejects_bad_params() {
        let config = ScryptConfig {
            log_n: 0,
            r: 0,
            p: 0,
            key_len: KEY_LEN,
        };
        assert!(matches!(
            derive_key(b"pw", b"salt", config),
            Err(CryptoError::KeyDerivation(_))
        ));
    }

    #[test]
    fn secure_compare_matches_equality() {
        assert!(secure_compare(b"abc", b"abc"));
        assert!(!secure_compare(b"abc", b"abd"));
        assert!(!secure_compare(b"abc", b"abcd"));
        assert!(secure_compare_str("", ""));
    }

    #[test]
    fn api_keys_verify_against_their_hash() {
        let api_key = generate_api_key();
        let hashed = hash_api_key(&api_key);

        assert_eq!(hashed.len(), 64);
        assert!(verify_api_key(&api_key, &hashed));
        assert!(!verify_api_key(&generate_api_key(), &hashed));
    }

    #[test]
    fn sha256_is_hex_encoded() {
        assert_eq!(
            hash_sha256("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
