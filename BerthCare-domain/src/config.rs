//! Application configuration loaded from the environment

use std::env;
use std::fmt;

use berthcare_data::database::{DatabaseConfig, DatabaseError};
use thiserror::Error;
use tracing::warn;

/// Port used when no usable port is configured
pub const DEFAULT_PORT: u16 = 3000;

const DEFAULT_SERVICE_NAME: &str = "berthcare-backend";

const DEFAULT_JWT_ISSUER: &str = "berthcare-backend";
const DEFAULT_JWT_AUDIENCE: &str = "berthcare-mobile";
const DEFAULT_ACCESS_TTL_SECONDS: i64 = 60 * 60 * 24;
const DEFAULT_REFRESH_TTL_SECONDS: i64 = 60 * 60 * 24 * 30;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid database configuration: {0}")]
    Database(#[from] DatabaseError),
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    /// Unknown names fall back to development
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => AppEnvironment::Production,
            "test" => AppEnvironment::Test,
            _ => AppEnvironment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, AppEnvironment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Test => "test",
            AppEnvironment::Production => "production",
        }
    }

    fn default_log_level(&self) -> &'static str {
        match self {
            AppEnvironment::Development | AppEnvironment::Test => "debug",
            AppEnvironment::Production => "info",
        }
    }
}

/// Process configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: AppEnvironment,
    pub service_name: String,
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit one span per HTTP request
    pub enable_request_logs: bool,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

/// Token signing settings
#[derive(Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// HMAC secret; token operations fail until one is set
    pub jwt_secret: Option<String>,
    pub issuer: String,
    pub audience: String,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
}

impl AuthConfig {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        AuthConfig {
            jwt_secret: non_empty("JWT_SECRET"),
            issuer: non_empty("JWT_ISSUER").unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_string()),
            audience: non_empty("JWT_AUDIENCE").unwrap_or_else(|| DEFAULT_JWT_AUDIENCE.to_string()),
            access_ttl_seconds: parse_positive_int(lookup("JWT_ACCESS_TTL").as_deref(), DEFAULT_ACCESS_TTL_SECONDS),
            refresh_ttl_seconds: parse_positive_int(lookup("JWT_REFRESH_TTL").as_deref(), DEFAULT_REFRESH_TTL_SECONDS),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|key| env::var(key).ok());
        config.database = DatabaseConfig::from_env()?;
        Ok(config)
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// The database section keeps its defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("APP_ENV")
            .map(|value| AppEnvironment::parse(&value))
            .unwrap_or(AppEnvironment::Development);

        let port_value = lookup("PORT");
        let port = resolve_port(port_value.as_deref());
        if port_value.is_some() && port == DEFAULT_PORT && port_value.as_deref() != Some("3000") {
            warn!("Unusable PORT value {:?}, falling back to {}", port_value, DEFAULT_PORT);
        }

        let log_level = lookup("LOG_LEVEL")
            .map(|value| value.trim().to_ascii_lowercase())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| environment.default_log_level().to_string());

        let service_name = lookup("SERVICE_NAME")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());

        let enable_request_logs = parse_boolean(lookup("LOG_ENABLE_REQUEST_LOGS").as_deref(), true);

        AppConfig {
            port,
            environment,
            service_name,
            log_level,
            enable_request_logs,
            database: DatabaseConfig::default(),
            auth: AuthConfig::from_lookup(&lookup),
        }
    }
}

/// Parse a loose boolean flag, returning `default` for missing or unknown values
pub fn parse_boolean(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "true" | "1" | "yes" | "y" | "on") => true,
        Some(v) if matches!(v.as_str(), "false" | "0" | "no" | "n" | "off") => false,
        _ => default,
    }
}

/// Parse a strictly positive integer, returning `default` otherwise
pub fn parse_positive_int(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

/// A port as supplied by a caller or the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortValue<'a> {
    Number(i64),
    Text(&'a str),
    Missing,
}

impl From<i64> for PortValue<'_> {
    fn from(value: i64) -> Self {
        PortValue::Number(value)
    }
}

impl From<u16> for PortValue<'_> {
    fn from(value: u16) -> Self {
        PortValue::Number(i64::from(value))
    }
}

impl From<i32> for PortValue<'_> {
    fn from(value: i32) -> Self {
        PortValue::Number(i64::from(value))
    }
}

impl<'a> From<&'a str> for PortValue<'a> {
    fn from(value: &'a str) -> Self {
        PortValue::Text(value)
    }
}

impl<'a> From<Option<&'a str>> for PortValue<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(PortValue::Missing, PortValue::Text)
    }
}

/// Resolve the listening port.
///
/// Numbers are used as-is when they fall in 1..=65535. Text is read like a
/// leading integer (`"8080"` and `"8080/tcp"` give 8080). Anything else,
/// including a missing value, yields [`DEFAULT_PORT`].
pub fn resolve_port<'a>(value: impl Into<PortValue<'a>>) -> u16 {
    let number = match value.into() {
        PortValue::Number(number) => Some(number),
        PortValue::Text(text) => leading_integer(text),
        PortValue::Missing => None,
    };

    number
        .and_then(|n| u16::try_from(n).ok())
        .filter(|port| *port != 0)
        .unwrap_or(DEFAULT_PORT)
}

fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let magnitude: i64 = digits[..end].parse().ok()?;

    Some(if negative { -magnitude } else { magnitude })
}
