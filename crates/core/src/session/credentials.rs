//! Credential validation and secret hashing

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};

use super::AuthError;

pub const MIN_SECRET_LEN: usize = 6;

pub fn normalize_email(email: &str) -> Result<String, AuthError> {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(AuthError::InvalidInput(
            "Email and password are required".to_string(),
        ));
    }
    if !normalized.contains('@') {
        return Err(AuthError::InvalidInput("Invalid email".to_string()));
    }
    Ok(normalized)
}

/// Checks that a secret was supplied at all
pub fn require_secret(secret: &str) -> Result<(), AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidInput(
            "Email and password are required".to_string(),
        ));
    }
    Ok(())
}

/// Checks a secret chosen at registration
pub fn validate_new_secret(secret: &str) -> Result<(), AuthError> {
    require_secret(secret)?;
    if secret.chars().count() < MIN_SECRET_LEN {
        return Err(AuthError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_SECRET_LEN
        )));
    }
    Ok(())
}

pub fn hash_secret(secret: &str) -> String {
    let mut salt = [0_u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(secret.as_bytes());
    let digest = hasher.finalize();

    format!(
        "v1${}${}",
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(digest)
    )
}

pub fn verify_secret(stored_hash: &str, secret: &str) -> bool {
    let mut parts = stored_hash.split('$');
    let (Some("v1"), Some(encoded_salt), Some(encoded_digest)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let Ok(salt) = URL_SAFE_NO_PAD.decode(encoded_salt) else {
        return false;
    };
    let Ok(expected_digest) = URL_SAFE_NO_PAD.decode(encoded_digest) else {
        return false;
    };

    let mut hasher = Sha256::new();
    hasher.update(&salt);
    hasher.update(secret.as_bytes());
    expected_digest == hasher.finalize().as_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_roundtrip_uses_fresh_salt() {
        let first = hash_secret("secret1");
        let second = hash_secret("secret1");

        assert_ne!(first, second);
        assert!(verify_secret(&first, "secret1"));
        assert!(verify_secret(&second, "secret1"));
        assert!(!verify_secret(&first, "secret2"));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_secret("", "secret1"));
        assert!(!verify_secret("v2$abc$def", "secret1"));
        assert!(!verify_secret("v1$***$***", "secret1"));
    }

    #[test]
    fn test_email_normalization() {
        assert_eq!(normalize_email("  A@Example.COM ").unwrap(), "a@example.com");
        assert!(matches!(normalize_email("   "), Err(AuthError::InvalidInput(_))));
        assert!(matches!(normalize_email("nobody"), Err(AuthError::InvalidInput(_))));
    }

    #[test]
    fn test_new_secret_length() {
        assert!(validate_new_secret("secret1").is_ok());
        assert!(validate_new_secret("short").is_err());
        assert!(validate_new_secret("").is_err());
    }
}
