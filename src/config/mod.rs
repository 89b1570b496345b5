//! Configuration module for the timetable backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Default request body limit, large enough for a full timetable export.
pub const DEFAULT_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the JSON document file
    pub data_file: PathBuf,
    /// Directory holding the front-end bundle
    pub public_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Maximum accepted request body in bytes
    pub body_limit: usize,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Invalid value in the environment.
#[derive(Debug)]
pub struct ConfigError {
    pub variable: &'static str,
    pub value: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid value for {}: {:?}", self.variable, self.value)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let data_file = env::var("TIMETABLE_DATA_FILE")
            .unwrap_or_else(|_| "./data/timetable.json".to_string())
            .into();

        let public_dir = env::var("TIMETABLE_PUBLIC_DIR")
            .unwrap_or_else(|_| "./public".to_string())
            .into();

        let host: IpAddr = parse_var("TIMETABLE_HOST", "0.0.0.0")?;
        let port: u16 = parse_var("PORT", "5000")?;
        let body_limit = parse_var("TIMETABLE_BODY_LIMIT", &DEFAULT_BODY_LIMIT.to_string())?;

        let log_level = env::var("TIMETABLE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("TIMETABLE_LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            data_file,
            public_dir,
            bind_addr: SocketAddr::new(host, port),
            body_limit,
            log_level,
            log_format,
        })
    }
}

fn parse_var<T: std::str::FromStr>(variable: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = env::var(variable).unwrap_or_else(|_| default.to_string());
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError { variable, value })
}
