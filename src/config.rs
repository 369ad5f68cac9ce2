use std::env;

/// Number of blocks behind the chain head to process in one run.
pub const DEFAULT_BLOCK_WINDOW: u64 = 100;

/// Number of concurrent fetch workers. The bottleneck is the network
/// round-trip per block, not CPU, so this is sized for I/O concurrency.
pub const DEFAULT_WORKER_COUNT: usize = 8;

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub window_size: u64,
    pub pool_size: usize,
    pub rust_log: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables
    ///
    /// GETBLOCK_API_KEY is required. BLOCK_WINDOW and WORKER_COUNT are
    /// optional overrides for the window size and worker pool size.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("GETBLOCK_API_KEY")
            .map_err(|_| ConfigError::MissingVariable("GETBLOCK_API_KEY".to_string()))?;

        let window_size = match env::var("BLOCK_WINDOW") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(format!("BLOCK_WINDOW must be an integer, got '{}'", raw))
            })?,
            Err(_) => DEFAULT_BLOCK_WINDOW,
        };

        let pool_size = match env::var("WORKER_COUNT") {
            Ok(raw) => {
                let parsed = raw.parse::<usize>().map_err(|_| {
                    ConfigError::InvalidValue(format!(
                        "WORKER_COUNT must be an integer, got '{}'",
                        raw
                    ))
                })?;
                if parsed == 0 {
                    return Err(ConfigError::InvalidValue(
                        "WORKER_COUNT must be at least 1".to_string(),
                    ));
                }
                parsed
            }
            Err(_) => DEFAULT_WORKER_COUNT,
        };

        let rust_log = env::var("RUST_LOG").ok();

        Ok(Self {
            api_key,
            window_size,
            pool_size,
            rust_log,
        })
    }
}
