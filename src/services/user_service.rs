use hex::encode as hex_encode;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use crate::config::DEFAULT_PBKDF2_ITERATIONS;

const HASH_PREFIX: &str = "pbkdf2:sha256:";

pub fn generate_password_hash(password: &str) -> String {
    let mut salt_bytes = [0u8; 12];
    rand::rngs::OsRng.fill_bytes(&mut salt_bytes);
    let salt = hex_encode(salt_bytes);
    let mut dk = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), DEFAULT_PBKDF2_ITERATIONS, &mut dk);
    format!("{}{}${}${}", HASH_PREFIX, DEFAULT_PBKDF2_ITERATIONS, salt, hex_encode(dk))
}

pub fn verify_password(stored: &str, candidate: &str) -> bool {
    let Some(rest) = stored.strip_prefix(HASH_PREFIX) else {
        return false;
    };
    let Some((iter_s, salt_hash)) = rest.split_once('$') else {
        return false;
    };
    let Some((salt, expected_hash)) = salt_hash.split_once('$') else {
        return false;
    };
    let Ok(iter) = iter_s.parse::<u32>() else {
        return false;
    };
    let mut dk = [0u8; 32];
    pbkdf2_hmac::<Sha256>(candidate.as_bytes(), salt.as_bytes(), iter, &mut dk);
    hex_encode(dk) == expected_hash
}

pub fn random_session_id() -> String {
    let mut b = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut b);
    hex_encode(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = generate_password_hash("Admin123!");
        assert!(hash.starts_with("pbkdf2:sha256:100000$"));
        assert!(verify_password(&hash, "Admin123!"));
        assert!(!verify_password(&hash, "admin123!"));
    }

    #[test]
    fn malformed_hashes_never_verify() {
        assert!(!verify_password("", ""));
        assert!(!verify_password("plain-text", "plain-text"));
        assert!(!verify_password("pbkdf2:sha256:notanumber$salt$hash", "x"));
    }

    #[test]
    fn session_ids_are_random_hex() {
        let a = random_session_id();
        let b = random_session_id();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
