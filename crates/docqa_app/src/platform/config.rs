use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use docqa_engine::ApiSettings;
use engine_logging::engine_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_CONFIG_FILENAME: &str = "docqa.ron";

/// On-disk client configuration. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub upload_path: String,
    pub upload_field: String,
    pub query_path: String,
    pub enhanced_query_path: String,
    pub health_path: String,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let settings = ApiSettings::default();
        Self {
            base_url: settings.base_url,
            upload_path: settings.upload_path,
            upload_field: settings.upload_field,
            query_path: settings.query_path,
            enhanced_query_path: settings.enhanced_query_path,
            health_path: settings.health_path,
            connect_timeout_secs: None,
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    pub fn into_settings(self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url,
            upload_path: self.upload_path,
            upload_field: self.upload_field,
            query_path: self.query_path,
            enhanced_query_path: self.enhanced_query_path,
            health_path: self.health_path,
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Load `explicit` if given (it must exist), else `./docqa.ron` if present,
/// else defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILENAME);
            match read_config(&path) {
                Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                    Ok(AppConfig::default())
                }
                other => other,
            }
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    engine_info!("Loaded config from {:?}", path);
    Ok(config)
}
