//! Link-Ripper: a single-page link extractor
//!
//! This crate fetches one web page, tokenizes its HTML as it streams in,
//! and reports every anchor target it finds together with a per-hostname
//! tally. The core pipeline lives in [`ripper`]; the HTTP API, the rip
//! counter and the CLI are built around it.

pub mod config;
pub mod output;
pub mod ripper;
pub mod server;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Link-Ripper operations
#[derive(Debug, Error)]
pub enum RipperError {
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid environment override {name}: {value}")]
    InvalidEnv { name: String, value: String },
}

/// URL-specific errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("Empty URL")]
    Empty,

    #[error("Missing protocol scheme")]
    MissingScheme,

    #[error("Invalid URI for request: {0}")]
    NotRequestUri(String),

    #[error("Invalid control character in URL")]
    ControlCharacter,

    #[error("Invalid URL escape: {0}")]
    InvalidEscape(String),

    #[error("Invalid character in host name: {0}")]
    InvalidHost(String),

    #[error("Invalid port in host: {0}")]
    InvalidPort(String),

    #[error("Invalid userinfo")]
    InvalidUserinfo,

    #[error("Relative URL not supported: {0}")]
    Relative(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),

    #[error("Failed to parse URL: {0}")]
    Parse(String),
}

/// Result type alias for Link-Ripper operations
pub type Result<T> = std::result::Result<T, RipperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use output::{tally_hostnames, RipResult};
pub use ripper::{RipObserver, RipOutcome, RipReport, Ripper, Termination};
pub use crate::url::{parse_request_uri, parse_target, path_join, RequestUri};
