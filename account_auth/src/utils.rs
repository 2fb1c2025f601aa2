use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use http::header::{HeaderMap, SET_COOKIE};
use ring::rand::SecureRandom;
use thiserror::Error;

pub(crate) fn base64url_decode(input: &str) -> Result<Vec<u8>, UtilError> {
    let decoded = URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|_| UtilError::Format("Failed to decode base64url".to_string()))?;
    Ok(decoded)
}

pub(crate) fn base64url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Fill `len` bytes from the system CSPRNG.
pub(crate) fn gen_random_bytes(len: usize) -> Result<Vec<u8>, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| UtilError::Crypto("Failed to generate random bytes".to_string()))?;
    Ok(bytes)
}

/// Generate `len` random bytes and return them base64url-encoded.
pub fn gen_random_string(len: usize) -> Result<String, UtilError> {
    let bytes = gen_random_bytes(len)?;
    Ok(base64url_encode(&bytes))
}

pub(crate) fn header_set_cookie(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
    max_age: i64,
) -> Result<(), UtilError> {
    let cookie =
        format!("{name}={value}; SameSite=Lax; Secure; HttpOnly; Path=/; Max-Age={max_age}");
    tracing::trace!("Set-Cookie for {}", name);
    headers.append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| UtilError::Cookie("Failed to parse cookie".to_string()))?,
    );
    Ok(())
}

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Invalid format: {0}")]
    Format(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_random_string_length_and_alphabet() {
        // Given a request for 32 random bytes
        let s = gen_random_string(32).expect("random string");

        // Then the base64url (no padding) encoding is 43 characters long
        assert_eq!(s.len(), 43);
        assert!(
            s.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_gen_random_string_is_not_repeated() {
        let a = gen_random_string(32).unwrap();
        let b = gen_random_string(32).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_base64url_decode_roundtrip_and_error() {
        let encoded = base64url_encode(b"salt bytes");
        assert_eq!(base64url_decode(&encoded).unwrap(), b"salt bytes");

        // Padding and '+' are not part of the URL-safe no-pad alphabet
        assert!(matches!(
            base64url_decode("ab+c=="),
            Err(UtilError::Format(_))
        ));
    }

    #[test]
    fn test_header_set_cookie() {
        let mut headers = HeaderMap::new();
        header_set_cookie(&mut headers, "__Host-SessionId", "abc", 600).unwrap();

        let value = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert_eq!(
            value,
            "__Host-SessionId=abc; SameSite=Lax; Secure; HttpOnly; Path=/; Max-Age=600"
        );
    }

    #[test]
    fn test_header_set_cookie_rejects_invalid_value() {
        let mut headers = HeaderMap::new();
        let result = header_set_cookie(&mut headers, "name", "bad\nvalue", 0);
        assert!(matches!(result, Err(UtilError::Cookie(_))));
    }
}
