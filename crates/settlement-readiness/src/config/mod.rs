use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::readiness::domain::{ScoringPolicy, CERT_VALIDITY_DAYS, SHOOTING_VALIDITY_DAYS};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let settlements = env::var("APP_SETTLEMENTS")
            .map(|raw| parse_settlement_list(&raw))
            .unwrap_or_default();
        let snapshot_path = non_empty_var("APP_SNAPSHOT_PATH").map(PathBuf::from);
        let weights_path = non_empty_var("APP_WEIGHTS_PATH").map(PathBuf::from);

        let policy = ScoringPolicy {
            shooting_validity_days: validity_days(
                "APP_SHOOTING_VALIDITY_DAYS",
                SHOOTING_VALIDITY_DAYS,
            )?,
            cert_validity_days: validity_days("APP_CERT_VALIDITY_DAYS", CERT_VALIDITY_DAYS)?,
            ..ScoringPolicy::default()
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig {
                settlements,
                snapshot_path,
                weights_path,
                policy,
            },
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn validity_days(key: &'static str, default: i64) -> Result<i64, ConfigError> {
    match non_empty_var(key) {
        None => Ok(default),
        Some(raw) => match raw.parse::<i64>() {
            Ok(days) if days >= 0 => Ok(days),
            _ => Err(ConfigError::InvalidValidityWindow { key, value: raw }),
        },
    }
}

/// Splits a comma-separated settlement list, keeping first occurrences in order.
pub fn parse_settlement_list(raw: &str) -> Vec<String> {
    let mut settlements: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        if !settlements.iter().any(|existing| existing == name) {
            settlements.push(name.to_string());
        }
    }
    settlements
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Data sources and scoring windows for the readiness engine.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Master settlement list; its order breaks priority ties.
    pub settlements: Vec<String>,
    pub snapshot_path: Option<PathBuf>,
    pub weights_path: Option<PathBuf>,
    pub policy: ScoringPolicy,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidValidityWindow { key: &'static str, value: String },
    MissingVariable { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidValidityWindow { key, value } => {
                write!(f, "{key} must be a non-negative number of days (got '{value}')")
            }
            ConfigError::MissingVariable { key } => write!(f, "{key} must be set"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidValidityWindow { .. }
            | ConfigError::MissingVariable { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
