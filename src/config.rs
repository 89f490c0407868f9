use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Clinic Desk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 12 * 60 * 60;
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 600_000;

/// Get the application data directory (~/ClinicDesk/).
/// Falls back to the working directory when no home is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ClinicDesk")
}

/// Default SQLite database location
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("clinic.db")
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "clinic_desk_lib=debug,tower_http=debug,info"
    } else {
        "clinic_desk_lib=info,warn"
    }
}

/// Runtime configuration, read from `CLINIC_DESK_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub ai_timeout: Duration,
    pub session_ttl: Duration,
    pub pbkdf2_iterations: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database_path: default_database_path(),
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            ai_timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            pbkdf2_iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable values fall back to
    /// the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("CLINIC_DESK_BIND") {
            match raw.parse() {
                Ok(addr) => config.bind_addr = addr,
                Err(_) => tracing::warn!(value = %raw, "Invalid CLINIC_DESK_BIND, using {DEFAULT_BIND_ADDR}"),
            }
        }
        if let Some(path) = lookup("CLINIC_DESK_DB") {
            config.database_path = PathBuf::from(path);
        }
        config.gemini_api_key = lookup("CLINIC_DESK_GEMINI_API_KEY").filter(|k| !k.trim().is_empty());
        if let Some(url) = lookup("CLINIC_DESK_GEMINI_BASE_URL") {
            config.gemini_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("CLINIC_DESK_GEMINI_MODEL") {
            config.gemini_model = model;
        }
        if let Some(secs) = parse_number::<u64>(&lookup, "CLINIC_DESK_AI_TIMEOUT_SECS") {
            config.ai_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_number::<u64>(&lookup, "CLINIC_DESK_SESSION_TTL_SECS") {
            config.session_ttl = Duration::from_secs(secs);
        }
        if let Some(iterations) = parse_number::<u32>(&lookup, "CLINIC_DESK_PBKDF2_ITERATIONS") {
            config.pbkdf2_iterations = iterations.max(1);
        }

        config
    }
}

fn parse_number<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring non-numeric setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_is_named_for_app() {
        assert!(app_data_dir().ends_with("ClinicDesk"));
        assert!(default_database_path().starts_with(app_data_dir()));
    }

    #[test]
    fn defaults_without_environment() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.pbkdf2_iterations, DEFAULT_PBKDF2_ITERATIONS);
    }

    #[test]
    fn overrides_from_environment() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CLINIC_DESK_BIND", "0.0.0.0:9000"),
            ("CLINIC_DESK_DB", "/tmp/test.db"),
            ("CLINIC_DESK_GEMINI_API_KEY", "k-123"),
            ("CLINIC_DESK_GEMINI_BASE_URL", "http://localhost:1234/"),
            ("CLINIC_DESK_SESSION_TTL_SECS", "60"),
        ]));
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.database_path, PathBuf::from("/tmp/test.db"));
        assert_eq!(config.gemini_api_key.as_deref(), Some("k-123"));
        assert_eq!(config.gemini_base_url, "http://localhost:1234");
        assert_eq!(config.session_ttl, Duration::from_secs(60));
    }

    #[test]
    fn bad_values_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CLINIC_DESK_BIND", "not-an-addr"),
            ("CLINIC_DESK_AI_TIMEOUT_SECS", "soon"),
            ("CLINIC_DESK_GEMINI_API_KEY", "   "),
        ]));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.ai_timeout, Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS));
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }
}
