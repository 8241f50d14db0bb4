use std::{path::PathBuf, time::Duration};

use vitrine_core::MediaLayout;

pub const DEFAULT_PORT: u16 = 31471;
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub library: LibraryConfig,
    pub enqueue: EnqueueConfig,
    pub metadata: ConfigMetadata,
}

impl Config {
    /// Defaults for every section, serving the library at `root`.
    pub fn with_library_root(root: impl Into<PathBuf>) -> Self {
        Self {
            server: ServerConfig::default(),
            library: LibraryConfig::new(root),
            enqueue: EnqueueConfig::default(),
            metadata: ConfigMetadata::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `*` allows any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    pub root: PathBuf,
    pub refresh_interval: Duration,
    pub layout: MediaLayout,
}

impl LibraryConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            layout: MediaLayout::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueueConfig {
    pub enabled: bool,
    /// When unset the enqueue routes accept unauthenticated requests.
    pub api_key: Option<String>,
    pub ledger_path: PathBuf,
    pub ledger_table: String,
    pub ledger_column: String,
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub max_concurrent_jobs: usize,
    /// How long shutdown waits for queued and running jobs.
    pub shutdown_grace: Duration,
}

impl Default for EnqueueConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            ledger_path: PathBuf::from("../db/downloaded.db"),
            ledger_table: "MissAV".to_string(),
            ledger_column: "bvid".to_string(),
            program: "python3".to_string(),
            args: vec!["main.py".to_string()],
            working_dir: PathBuf::from(".."),
            max_concurrent_jobs: 4,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
