use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the saturation recorder
#[derive(Error, Debug)]
pub enum SatrecError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned {status} for realm {realm}")]
    UpstreamStatus { realm: u32, status: u16 },

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Market data errors
    #[error("Invalid market data: {0}")]
    InvalidMarketData(String),

    #[error("Realm {realm}: sentinel not ready after {attempts} attempts")]
    GateExhausted { realm: u32, attempts: u32 },

    #[error("Realm {realm}: sentinel not ready within {waited_secs}s")]
    GateTimeout { realm: u32, waited_secs: u64 },

    // Persistence errors
    #[error("Corrupt history file {}: {reason}", path.display())]
    CorruptHistory { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type alias for SatrecError
pub type Result<T> = std::result::Result<T, SatrecError>;
