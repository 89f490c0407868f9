use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::config::DEFAULT_PBKDF2_ITERATIONS;

pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 16;

/// Stored form of a password: base64 hash and base64 salt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    pub hash: String,
    pub salt: String,
}

impl PasswordDigest {
    /// Well-formed digest that matches no password. Verifying against it
    /// costs the same as a real check.
    pub fn placeholder() -> Self {
        Self {
            hash: STANDARD.encode([0u8; HASH_LENGTH]),
            salt: STANDARD.encode([0u8; SALT_LENGTH]),
        }
    }
}

/// PBKDF2-SHA256 password hasher with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_PBKDF2_ITERATIONS)
    }
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    /// Hash a new password under a fresh random salt.
    pub fn hash(&self, password: &str) -> PasswordDigest {
        let salt = generate_salt();
        let mut derived = self.derive(password, &salt);
        let digest = PasswordDigest {
            hash: STANDARD.encode(derived),
            salt: STANDARD.encode(salt),
        };
        derived.zeroize();
        digest
    }

    /// Constant-time check of `password` against a stored digest.
    /// Malformed stored values never verify.
    pub fn verify(&self, password: &str, digest: &PasswordDigest) -> bool {
        let (Ok(expected), Ok(salt)) = (STANDARD.decode(&digest.hash), STANDARD.decode(&digest.salt)) else {
            return false;
        };
        let mut derived = self.derive(password, &salt);
        let matches = derived.as_slice().ct_eq(expected.as_slice()).unwrap_u8() == 1;
        derived.zeroize();
        matches
    }

    fn derive(&self, password: &str, salt: &[u8]) -> [u8; HASH_LENGTH] {
        let mut out = [0u8; HASH_LENGTH];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, self.iterations, &mut out);
        out
    }
}

/// Generate a cryptographically random salt
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
