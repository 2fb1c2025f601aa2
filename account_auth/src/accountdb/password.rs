//! Salted PBKDF2-HMAC-SHA256 password hashes.
//!
//! Stored format: `pbkdf2-sha256$<iterations>$<salt>$<hash>` with salt and
//! hash base64url-encoded without padding. The iteration count travels with
//! the hash, so raising `PASSWORD_HASH_ITERATIONS` only affects new hashes.

use std::{env, num::NonZeroU32, sync::LazyLock};

use ring::{digest, pbkdf2};
use subtle::ConstantTimeEq;

use crate::utils::{base64url_decode, base64url_encode, gen_random_bytes};

use super::errors::AccountError;

const ALGORITHM_ID: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = digest::SHA256_OUTPUT_LEN;
const DEFAULT_ITERATIONS: u32 = 100_000;

pub(crate) static PASSWORD_HASH_ITERATIONS: LazyLock<u32> = LazyLock::new(|| {
    env::var("PASSWORD_HASH_ITERATIONS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_ITERATIONS)
});

/// Hash verified against when the username is unknown, so both paths cost the same.
pub(super) static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hash_password("not-a-real-password").unwrap_or_else(|e| {
        tracing::error!("Failed to prepare dummy password hash: {}", e);
        String::new()
    })
});

pub(crate) fn hash_password(password: &str) -> Result<String, AccountError> {
    hash_password_with_iterations(password, *PASSWORD_HASH_ITERATIONS)
}

pub(crate) fn hash_password_with_iterations(
    password: &str,
    iterations: u32,
) -> Result<String, AccountError> {
    let iterations = NonZeroU32::new(iterations)
        .ok_or_else(|| AccountError::PasswordHash("iteration count must be positive".into()))?;
    let salt = gen_random_bytes(SALT_LEN)?;

    let mut hash = [0u8; HASH_LEN];
    pbkdf2::derive(pbkdf2::PBKDF2_HMAC_SHA256, iterations, &salt, password.as_bytes(), &mut hash);

    Ok(format!(
        "{ALGORITHM_ID}${}${}${}",
        iterations,
        base64url_encode(&salt),
        base64url_encode(&hash)
    ))
}

/// Check `password` against a stored hash in constant time.
///
/// `Ok(false)` is a mismatch; `Err` means the stored value is not a hash this module produced.
pub(crate) fn verify_password(password: &str, stored: &str) -> Result<bool, AccountError> {
    let parsed = ParsedHash::parse(stored)?;

    let mut computed = vec![0u8; parsed.hash.len()];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        parsed.iterations,
        &parsed.salt,
        password.as_bytes(),
        &mut computed,
    );

    Ok(computed.as_slice().ct_eq(parsed.hash.as_slice()).into())
}

struct ParsedHash {
    iterations: NonZeroU32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

impl ParsedHash {
    fn parse(stored: &str) -> Result<Self, AccountError> {
        let invalid = || AccountError::PasswordHash("unrecognized password hash format".into());

        let mut parts = stored.split('$');
        let (Some(alg), Some(iterations), Some(salt), Some(hash), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(invalid());
        };

        if alg != ALGORITHM_ID {
            return Err(invalid());
        }

        let iterations = iterations
            .parse::<u32>()
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(invalid)?;
        let salt = base64url_decode(salt)?;
        let hash = base64url_decode(hash)?;
        if hash.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            iterations,
            salt,
            hash,
        })
    }
}
