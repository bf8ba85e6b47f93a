use crate::config::types::{Config, FetcherConfig, ServerConfig};
use crate::ConfigError;

/// Longest allowed fetch timeout, in seconds
const MAX_TIMEOUT_SECS: u64 = 600;

/// Smallest allowed token size limit, in bytes
const MIN_TOKEN_BYTES: usize = 1024;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_server_config(&config.server)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 || config.timeout_secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and {}, got {}",
            MAX_TIMEOUT_SECS, config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 || config.connect_timeout_secs > config.timeout_secs {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be between 1 and timeout_secs ({}), got {}",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }

    if let Some(limit) = config.max_token_bytes {
        if limit < MIN_TOKEN_BYTES {
            return Err(ConfigError::Validation(format!(
                "max_token_bytes must be >= {}, got {}",
                MIN_TOKEN_BYTES, limit
            )));
        }
    }

    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.port == 0 {
        return Err(ConfigError::Validation("port cannot be 0".to_string()));
    }

    if config.static_dir.is_empty() {
        return Err(ConfigError::Validation(
            "static_dir cannot be empty".to_string(),
        ));
    }

    if config.count_file.is_empty() {
        return Err(ConfigError::Validation(
            "count_file cannot be empty".to_string(),
        ));
    }

    Ok(())
}
