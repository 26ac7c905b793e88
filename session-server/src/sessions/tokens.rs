//! Guest tokens and table QR codes
//!
//! Guest tokens are 32 random bytes (hex encoded) handed out once at
//! admission. Only `sha256(token)` is persisted, as the key of the guest
//! token index.

use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};

use super::error::{SessionError, SessionResult};

/// Raw guest token length in bytes
pub const GUEST_TOKEN_BYTES: usize = 32;

/// Raw QR code length in bytes
const QR_CODE_BYTES: usize = 12;

fn random_hex(len: usize) -> SessionResult<String> {
    let rng = SystemRandom::new();
    let mut buf = vec![0u8; len];
    rng.fill(&mut buf)
        .map_err(|_| SessionError::Internal("Failed to generate secure random bytes".to_string()))?;
    Ok(hex::encode(buf))
}

/// Generate a new guest token (64 hex chars)
pub fn generate_guest_token() -> SessionResult<String> {
    random_hex(GUEST_TOKEN_BYTES)
}

/// Hash a guest token for storage and lookup
pub fn hash_guest_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Generate an opaque URL-safe table QR code (24 hex chars)
pub fn generate_qr_code() -> SessionResult<String> {
    random_hex(QR_CODE_BYTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_token_shape() {
        let a = generate_guest_token().unwrap();
        let b = generate_guest_token().unwrap();
        assert_eq!(a.len(), GUEST_TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_is_stable_and_not_identity() {
        let token = generate_guest_token().unwrap();
        let hash = hash_guest_token(&token);
        assert_eq!(hash, hash_guest_token(&token));
        assert_ne!(hash, token);
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_qr_code_is_url_safe() {
        let code = generate_qr_code().unwrap();
        assert_eq!(code.len(), 24);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
