//! Runtime configuration loaded from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `BOOK_CATALOG_STORE_PATH` | `data/books.json` |
//! | `BOOK_CATALOG_HTTP_ADDR` | `0.0.0.0:5000` |
//! | `BOOK_CATALOG_GRPC_ADDR` | `[::]:50051` |
//! | `BOOK_CATALOG_REQUEST_TIMEOUT_MS` | `5000` |
//! | `BOOK_CATALOG_LOG_FORMAT` | `pretty` (`pretty` or `json`) |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::observability::LogFormat;

pub const STORE_PATH_VAR: &str = "BOOK_CATALOG_STORE_PATH";
pub const HTTP_ADDR_VAR: &str = "BOOK_CATALOG_HTTP_ADDR";
pub const GRPC_ADDR_VAR: &str = "BOOK_CATALOG_GRPC_ADDR";
pub const REQUEST_TIMEOUT_VAR: &str = "BOOK_CATALOG_REQUEST_TIMEOUT_MS";
pub const LOG_FORMAT_VAR: &str = "BOOK_CATALOG_LOG_FORMAT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a socket address like 127.0.0.1:5000 (got '{value}')")]
    InvalidAddr { name: &'static str, value: String },
    #[error("{name} must be a positive integer (got '{value}')")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must be one of: pretty, json (got '{value}')")]
    InvalidLogFormat { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Location of the catalog document.
    pub store_path: PathBuf,
    /// Bind address for the HTTP transport.
    pub http_addr: SocketAddr,
    /// Bind address for the gRPC transport.
    pub grpc_addr: SocketAddr,
    /// How long a transport waits for one operation before answering with
    /// a timeout.
    pub request_timeout: Duration,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_path: PathBuf::from("data/books.json"),
            http_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            grpc_addr: SocketAddr::from(([0u16; 8], 50051)),
            request_timeout: Duration::from_millis(5000),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name).and_then(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
        };
        let mut config = Config::default();

        if let Some(path) = var(STORE_PATH_VAR) {
            config.store_path = PathBuf::from(path);
        }
        if let Some(addr) = var(HTTP_ADDR_VAR) {
            config.http_addr = parse_addr(HTTP_ADDR_VAR, &addr)?;
        }
        if let Some(addr) = var(GRPC_ADDR_VAR) {
            config.grpc_addr = parse_addr(GRPC_ADDR_VAR, &addr)?;
        }
        if let Some(ms) = var(REQUEST_TIMEOUT_VAR) {
            config.request_timeout = Duration::from_millis(parse_millis(REQUEST_TIMEOUT_VAR, &ms)?);
        }
        if let Some(format) = var(LOG_FORMAT_VAR) {
            config.log_format = parse_log_format(LOG_FORMAT_VAR, &format)?;
        }

        Ok(config)
    }
}

fn parse_addr(name: &'static str, value: &str) -> Result<SocketAddr, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidAddr {
        name,
        value: value.to_string(),
    })
}

fn parse_millis(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        }),
    }
}

fn parse_log_format(name: &'static str, value: &str) -> Result<LogFormat, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "pretty" | "text" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        _ => Err(ConfigError::InvalidLogFormat {
            name,
            value: value.to_string(),
        }),
    }
}
