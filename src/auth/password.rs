//! PBKDF2-HMAC-SHA256 password hashes
//!
//! Encoded as `pbkdf2:sha256:<iterations>$<salt>$<digest-hex>`, the layout
//! Werkzeug's `generate_password_hash` writes, so accounts created by the
//! Flask dashboard keep working.

use pbkdf2::pbkdf2_hmac;
use rand::distributions::{Alphanumeric, DistString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::common::ApiError;

const METHOD: &str = "pbkdf2";
const DIGEST: &str = "sha256";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Werkzeug's count when the hash omits one
const DEFAULT_ITERATIONS: u32 = 600_000;

#[cfg(not(test))]
const ITERATIONS: u32 = DEFAULT_ITERATIONS;
#[cfg(test)]
const ITERATIONS: u32 = 1_000;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password must not be empty")]
    Empty,

    #[error("Malformed password hash")]
    MalformedHash,
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::Empty => ApiError::BadRequest(e.to_string()),
            PasswordError::MalformedHash => ApiError::InternalServer(e.to_string()),
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }

    let salt = Alphanumeric.sample_string(&mut rand::thread_rng(), SALT_LEN);
    let key = derive_key(password, salt.as_bytes(), ITERATIONS);

    Ok(format!(
        "{}:{}:{}${}${}",
        METHOD,
        DIGEST,
        ITERATIONS,
        salt,
        hex::encode(key)
    ))
}

pub fn verify_password(password: &str, encoded: &str) -> Result<bool, PasswordError> {
    let mut parts = encoded.splitn(3, '$');
    let (Some(method), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(PasswordError::MalformedHash);
    };

    let iterations = parse_method(method)?;
    let expected = hex::decode(expected).map_err(|_| PasswordError::MalformedHash)?;
    if expected.len() != KEY_LEN {
        return Err(PasswordError::MalformedHash);
    }

    let actual = derive_key(password, salt.as_bytes(), iterations);
    Ok(actual[..].ct_eq(&expected[..]).into())
}

/// Iteration count from `pbkdf2:sha256[:<iterations>]`
fn parse_method(method: &str) -> Result<u32, PasswordError> {
    let mut args = method.split(':');
    if args.next() != Some(METHOD) || args.next() != Some(DIGEST) {
        return Err(PasswordError::MalformedHash);
    }
    let iterations = match args.next() {
        None | Some("") => DEFAULT_ITERATIONS,
        Some(n) => n
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(PasswordError::MalformedHash)?,
    };
    if args.next().is_some() {
        return Err(PasswordError::MalformedHash);
    }
    Ok(iterations)
}

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}
