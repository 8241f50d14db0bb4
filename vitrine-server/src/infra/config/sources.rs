use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub library: FileLibraryConfig,
    #[serde(default)]
    pub enqueue: FileEnqueueConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cors_allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileLibraryConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Humantime duration, e.g. `30m` or `1h 30m`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fanart_extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor_extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_route: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileEnqueueConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_jobs: Option<usize>,
    /// Humantime duration; `0s` skips the wait.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shutdown_grace: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub library_root: Option<PathBuf>,
    /// Kept raw so a bad value is reported instead of silently ignored.
    pub refresh_interval: Option<String>,
    pub enqueue_enabled: Option<bool>,
    pub api_key: Option<String>,
    pub ledger_path: Option<PathBuf>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        let mut env_config = Self::default();

        env_config.config_path =
            std::env::var("VITRINE_CONFIG").ok().map(PathBuf::from);
        env_config.server_host = std::env::var("SERVER_HOST").ok();
        env_config.server_port = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|s| s.parse().ok());
        env_config.cors_allowed_origins = parse_csv_var("CORS_ALLOWED_ORIGINS");

        env_config.library_root =
            std::env::var("VITRINE_LIBRARY_ROOT").ok().map(PathBuf::from);
        env_config.refresh_interval =
            std::env::var("VITRINE_REFRESH_INTERVAL").ok();

        env_config.enqueue_enabled = parse_bool_var("VITRINE_ENQUEUE_ENABLED");
        env_config.api_key = std::env::var("VITRINE_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty());
        env_config.ledger_path =
            std::env::var("VITRINE_LEDGER_PATH").ok().map(PathBuf::from);

        env_config
    }
}

fn parse_csv_var(name: &str) -> Option<Vec<String>> {
    std::env::var(name).ok().map(|raw| {
        raw.split(',')
            .filter_map(|part| {
                let trimmed = part.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect()
    })
}

fn parse_bool_var(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|raw| {
        match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    })
}
