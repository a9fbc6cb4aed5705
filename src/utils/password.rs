use rand::RngCore;
use sha2::Sha512;
use subtle::ConstantTimeEq;

const SALT_BYTES: usize = 32;
const PBKDF2_ROUNDS: u32 = 1000;
const HASH_BYTES: usize = 64;

/// 256 bits of cryptographically strong randomness, hex-encoded.
pub fn generate_salt() -> String {
    let mut salt = [0u8; SALT_BYTES];
    rand::rng().fill_bytes(&mut salt);
    hex::encode(salt)
}

/// PBKDF2-HMAC-SHA512 over the password with the hex salt string,
/// hex-encoded. Deterministic for a given (password, salt) pair.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut derived = [0u8; HASH_BYTES];
    pbkdf2::pbkdf2_hmac::<Sha512>(
        password.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ROUNDS,
        &mut derived,
    );
    hex::encode(derived)
}

/// Constant-time comparison of the stored hash against a freshly
/// derived one, to resist timing attacks. A malformed stored hash
/// never verifies.
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    let Ok(stored) = hex::decode(stored_hash) else {
        return false;
    };

    let mut derived = [0u8; HASH_BYTES];
    pbkdf2::pbkdf2_hmac::<Sha512>(
        password.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ROUNDS,
        &mut derived,
    );

    stored.len() == HASH_BYTES && derived.ct_eq(&stored[..]).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let salt = generate_salt();
        let hash = hash_password("Secur3P@ssw0rd!", &salt);
        assert!(verify_password("Secur3P@ssw0rd!", &salt, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let salt = generate_salt();
        let hash = hash_password("correct-horse-battery-staple", &salt);
        assert!(!verify_password("wrong-password", &salt, &hash));
    }

    #[test]
    fn verify_rejects_wrong_salt() {
        let salt = generate_salt();
        let hash = hash_password("password", &salt);
        assert!(!verify_password("password", &generate_salt(), &hash));
    }

    #[test]
    fn verify_rejects_malformed_stored_hash() {
        assert!(!verify_password("anything", &generate_salt(), "not-hex"));
        assert!(!verify_password("anything", &generate_salt(), "abcd"));
    }

    #[test]
    fn salts_are_unique_and_hex() {
        let a = generate_salt();
        let b = generate_salt();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(hex::decode(&a).is_ok());
    }

    #[test]
    fn hashing_is_deterministic_per_salt() {
        let salt = generate_salt();
        assert_eq!(hash_password("pw", &salt), hash_password("pw", &salt));
        assert_eq!(hash_password("pw", &salt).len(), 128);
    }
}
