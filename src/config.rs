use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "HMS";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Upper bound on rows returned by every list endpoint.
pub const LIST_LIMIT: usize = 100;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
pub const DEFAULT_PASSWORD_ITERATIONS: u32 = 210_000;

/// Get the application data directory (~/HMS/)
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the SQLite database
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("hms.db")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "hms_lib=info,hms=info,tower_http=info"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings, read from `HMS_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub token_ttl_secs: u64,
    /// Bearer token that resolves to the administrative identity `0`.
    pub admin_token: Option<String>,
    /// Require callers to supply a non-zero `appointment_id` on create.
    pub require_client_appointment_id: bool,
    pub password_iterations: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8080))),
            db_path: default_db_path(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            admin_token: None,
            require_client_appointment_id: false,
            password_iterations: DEFAULT_PASSWORD_ITERATIONS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = lookup("HMS_BIND_ADDR") {
            config.bind_addr = parse("HMS_BIND_ADDR", v)?;
        }
        if let Some(v) = lookup("HMS_DB_PATH") {
            config.db_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("HMS_TOKEN_TTL_SECS") {
            config.token_ttl_secs = parse("HMS_TOKEN_TTL_SECS", v)?;
        }
        if let Some(v) = lookup("HMS_ADMIN_TOKEN") {
            config.admin_token = Some(v).filter(|t| !t.is_empty());
        }
        if let Some(v) = lookup("HMS_REQUIRE_CLIENT_APPOINTMENT_ID") {
            config.require_client_appointment_id = parse_flag("HMS_REQUIRE_CLIENT_APPOINTMENT_ID", v)?;
        }
        if let Some(v) = lookup("HMS_PASSWORD_ITERATIONS") {
            config.password_iterations = parse("HMS_PASSWORD_ITERATIONS", v)?;
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

fn parse_flag(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value }),
    }
}
