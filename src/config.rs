use crate::error::{Result, RdfsError};

use std::path::Path;

use serde::Deserialize;

static CONFIG_FILE_ENV_KEY: &str = "RDFS_CONFIG_FILE";

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub filesystem: FileSystem,
    pub connection: Connection,
    pub transfer: Transfer,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FileSystem {
    /// Endpoint used when the caller passes a blank endpoint string.
    pub endpoint: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Connection {
    pub connect_retries: u32,
    /// Delay before the first reconnect attempt; doubles on every retry.
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Transfer {
    pub chunk_size: u64,
}

impl Config {
    /// Loads the config named by `RDFS_CONFIG_FILE`, falling back to defaults
    /// when the variable is unset. A file that is named but missing or
    /// malformed is an error, not a silent fallback.
    pub fn load_from_env_or_default() -> Result<Self> {
        match std::env::var(CONFIG_FILE_ENV_KEY) {
            Ok(_) => Self::load_from_file(),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn load_from_file() -> Result<Self> {
        let path = std::env::var(CONFIG_FILE_ENV_KEY).map_err(|_| {
            RdfsError::ConfigError(format!(
                "Could not read {} environment variable.",
                CONFIG_FILE_ENV_KEY
            ))
        })?;
        let path = Path::new(&path);

        if !path.exists() {
            return Err(RdfsError::ConfigError(format!(
                "{} does not exist.",
                path.display()
            )));
        }
        if !path.is_file() {
            return Err(RdfsError::ConfigError(format!(
                "{} is not a file.",
                path.display()
            )));
        }

        let config = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&config)?;

        Ok(config)
    }
}

impl Transfer {
    /// Chunk size as a buffer length; a configured size of 0 is clamped to 1
    /// so copy loops always make progress.
    pub fn chunk_bytes(&self) -> usize {
        std::cmp::max(1, self.chunk_size as usize)
    }
}

impl std::default::Default for FileSystem {
    fn default() -> Self {
        Self {
            endpoint: String::from("http://localhost:42000"),
        }
    }
}

impl std::default::Default for Connection {
    fn default() -> Self {
        Self {
            connect_retries: 3,
            retry_backoff_ms: 100,
        }
    }
}

impl std::default::Default for Transfer {
    fn default() -> Self {
        Self { chunk_size: 4096 }
    }
}
