use serde::Deserialize;

/// Main configuration structure for Link-Ripper
///
/// Every section and key may be omitted; missing values take the defaults
/// below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetcher: FetcherConfig,
    pub server: ServerConfig,
}

/// Page fetching and tokenizing configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User-Agent header sent with every fetch
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Deadline for the whole request, body included (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Deadline for establishing the connection (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Largest single HTML token the tokenizer will buffer, if limited
    #[serde(rename = "max-token-bytes")]
    pub max_token_bytes: Option<usize>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("link-ripper/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_token_bytes: None,
        }
    }
}

/// HTTP API configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on; the PORT environment variable overrides it
    pub port: u16,

    /// Directory of static UI files served at `/`
    #[serde(rename = "static-dir")]
    pub static_dir: String,

    /// Flat file holding the number of completed rips
    #[serde(rename = "count-file")]
    pub count_file: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            static_dir: "./ui/build".to_string(),
            count_file: "ripCount".to_string(),
        }
    }
}
