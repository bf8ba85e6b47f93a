//! Configuration module for Link-Ripper
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus the PORT environment override.
//!
//! # Example
//!
//! ```no_run
//! use link_ripper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("ripper.toml")).unwrap();
//! println!("Listening on port {}", config.server.port);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetcherConfig, ServerConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, apply_port_override, compute_config_hash, load_config,
    load_config_with_hash, PORT_ENV,
};
pub use validation::validate;
