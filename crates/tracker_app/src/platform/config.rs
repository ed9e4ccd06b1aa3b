use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracker_engine::{ApiSettings, EngineConfig, DEFAULT_BASE_URL, DEFAULT_WEBHOOK_URL};

pub const CONFIG_FILENAME: &str = "tracker.ron";

/// Settings read from `tracker.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub base_url: String,
    pub webhook_url: String,
    pub poll_interval_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub output_dir: PathBuf,
    pub max_download_bytes: u64,
    pub log_level: String,
    pub log_to_file: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            webhook_url: DEFAULT_WEBHOOK_URL.to_string(),
            poll_interval_ms: 2000,
            connect_timeout_ms: api.connect_timeout.as_millis() as u64,
            request_timeout_ms: api.request_timeout.as_millis() as u64,
            output_dir: PathBuf::from("output"),
            max_download_bytes: api.max_download_bytes,
            log_level: "info".to_string(),
            log_to_file: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub webhook_url: Option<String>,
    pub output_dir: Option<PathBuf>,
}

impl TrackerConfig {
    /// Reads `path`. A missing file yields `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(webhook_url) = overrides.webhook_url {
            self.webhook_url = webhook_url;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.output_dir = output_dir;
        }
    }

    pub fn poll_interval(&self) -> Duration {
        // A zero period would spin the timer.
        Duration::from_millis(self.poll_interval_ms.max(100))
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            api: ApiSettings {
                base_url: self.base_url.clone(),
                webhook_url: self.webhook_url.clone(),
                connect_timeout: Duration::from_millis(self.connect_timeout_ms),
                request_timeout: Duration::from_millis(self.request_timeout_ms),
                max_download_bytes: self.max_download_bytes,
            },
            output_dir: self.output_dir.clone(),
        }
    }
}
