//! Shared types for the HTTP API layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rusqlite::Connection;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::auth::{LogMailer, Mailer, PasswordHasher, SessionStore};
use crate::config::AppConfig;
use crate::db;
use crate::summary::{GeminiClient, SummaryClient, UnconfiguredClient};

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<SessionStore>,
    pub hasher: PasswordHasher,
    pub mailer: Arc<dyn Mailer>,
    pub summary_client: Arc<dyn SummaryClient>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
    pub login_limiter: Arc<Mutex<RateLimiter>>,
}

impl ApiContext {
    /// Context with the log mailer and, when an API key is set, the Gemini client.
    pub fn new(config: AppConfig) -> Self {
        let summary_client: Arc<dyn SummaryClient> = match &config.gemini_api_key {
            Some(key) => match GeminiClient::new(
                &config.gemini_base_url,
                &config.gemini_model,
                key,
                config.ai_timeout.as_secs(),
            ) {
                Ok(client) => Arc::new(client),
                Err(e) => {
                    tracing::warn!(error = %e, "AI client unavailable, summaries disabled");
                    Arc::new(UnconfiguredClient)
                }
            },
            None => {
                tracing::info!("No AI API key configured, summaries disabled");
                Arc::new(UnconfiguredClient)
            }
        };
        Self::with_services(config, Arc::new(LogMailer), summary_client)
    }

    pub fn with_services(
        config: AppConfig,
        mailer: Arc<dyn Mailer>,
        summary_client: Arc<dyn SummaryClient>,
    ) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new(config.session_ttl)),
            hasher: PasswordHasher::new(config.pbkdf2_iterations),
            config: Arc::new(config),
            mailer,
            summary_client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new())),
            login_limiter: Arc::new(Mutex::new(RateLimiter::for_login())),
        }
    }

    /// Fresh connection for one request.
    pub fn open_db(&self) -> Result<Connection, ApiError> {
        Ok(db::open_database(&self.config.database_path)?)
    }
}

// ═══════════════════════════════════════════════════════════
// Doctor context: injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated doctor, injected into request extensions by the auth
/// middleware after successful token validation.
#[derive(Debug, Clone)]
pub struct DoctorContext {
    pub doctor_id: Uuid,
    pub token: String,
}

// ═══════════════════════════════════════════════════════════
// Rate limiter: per-client sliding window
// ═══════════════════════════════════════════════════════════

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3600);

/// Per-client rate limiter with per-minute and per-hour limits.
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    per_minute: u32,
    per_hour: u32,
    last_sweep: Instant,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(120, 2000)
    }

    /// Budget for login attempts against a single email address.
    pub fn for_login() -> Self {
        Self::with_limits(10, 100)
    }

    pub fn with_limits(per_minute: u32, per_hour: u32) -> Self {
        Self {
            windows: HashMap::new(),
            per_minute,
            per_hour,
            last_sweep: Instant::now(),
        }
    }

    /// `Err(retry_after_secs)` once `key` exceeds a window.
    pub fn check(&mut self, key: &str) -> Result<(), u64> {
        self.check_at(key, Instant::now())
    }

    pub(crate) fn check_at(&mut self, key: &str, now: Instant) -> Result<(), u64> {
        self.sweep(now);
        let entries = self.windows.entry(key.to_string()).or_default();

        entries.retain(|ts| now.duration_since(*ts) < HOUR);

        let last_minute = entries
            .iter()
            .filter(|ts| now.duration_since(**ts) < MINUTE)
            .count() as u32;
        if last_minute >= self.per_minute {
            return Err(60);
        }
        if entries.len() as u32 >= self.per_hour {
            return Err(3600);
        }

        entries.push(now);
        Ok(())
    }

    /// Drop keys with no request in the last hour. Runs at most once a minute.
    fn sweep(&mut self, now: Instant) {
        if now.duration_since(self.last_sweep) < MINUTE {
            return;
        }
        self.last_sweep = now;
        self.windows.retain(|_, entries| {
            entries.retain(|ts| now.duration_since(*ts) < HOUR);
            !entries.is_empty()
        });
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Run blocking work (SQLite, PBKDF2, the AI call) off the async workers.
pub async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}
