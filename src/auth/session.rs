//! In-memory bearer sessions. Only SHA-256 hashes of tokens are kept.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

use super::AuthError;

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Hex form of `hash_token`, used where the hash is persisted.
pub fn hash_token_hex(token: &str) -> String {
    hash_token(token).iter().map(|b| format!("{b:02x}")).collect()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Debug, Clone)]
struct Session {
    doctor_id: Uuid,
    expires_at: Instant,
}

pub struct SessionStore {
    sessions: Mutex<HashMap<[u8; 32], Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Open a session for `doctor_id` and return its bearer token.
    pub fn create(&self, doctor_id: Uuid) -> Result<String, AuthError> {
        let token = generate_token();
        let mut sessions = self.sessions.lock().map_err(|_| AuthError::LockPoisoned)?;
        let now = Instant::now();
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(
            hash_token(&token),
            Session {
                doctor_id,
                expires_at: now + self.ttl,
            },
        );
        Ok(token)
    }

    /// Resolve a token to its doctor. Expired sessions are dropped.
    pub fn validate(&self, token: &str) -> Result<Uuid, AuthError> {
        let key = hash_token(token);
        let mut sessions = self.sessions.lock().map_err(|_| AuthError::LockPoisoned)?;
        match sessions.get(&key) {
            Some(session) if session.expires_at > Instant::now() => Ok(session.doctor_id),
            Some(_) => {
                sessions.remove(&key);
                Err(AuthError::SessionExpired)
            }
            None => Err(AuthError::InvalidSession),
        }
    }

    /// End a session. Unknown tokens are ignored.
    pub fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let mut sessions = self.sessions.lock().map_err(|_| AuthError::LockPoisoned)?;
        sessions.remove(&hash_token(token));
        Ok(())
    }

    pub fn active_count(&self) -> usize {
        let now = Instant::now();
        self.sessions
            .lock()
            .map(|s| s.values().filter(|s| s.expires_at > now).count())
            .unwrap_or(0)
    }
}
