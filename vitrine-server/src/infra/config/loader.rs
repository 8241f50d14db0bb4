use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;
use vitrine_core::{MediaLayout, ledger::is_sql_identifier};

use super::{
    models::{
        Config, ConfigMetadata, EnqueueConfig, LibraryConfig, ServerConfig,
        DEFAULT_REFRESH_INTERVAL, DEFAULT_SHUTDOWN_GRACE,
    },
    sources::{EnvConfig, FileConfig},
    validation::ConfigWarnings,
};

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] = ["vitrine.toml", "config/vitrine.toml"];

/// Values given on the command line; they win over every other source.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub library_root: Option<PathBuf>,
}

#[derive(Debug, Default, Clone)]
struct ConfigLoaderOptions {
    config_path: Option<PathBuf>,
    overrides: ConfigOverrides,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.options.overrides = overrides;
        self
    }

    /// Loads `.env`, gathers the environment and composes the final
    /// configuration.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match dotenvy::dotenv() {
            Ok(_) => true,
            Err(dotenvy::Error::Io(_)) => false,
            Err(err) => return Err(err.into()),
        };

        let mut load = self.load_with_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Composes the configuration from an already gathered environment.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let mut warnings = ConfigWarnings::default();
        if config_path.is_none() {
            warnings.push_with_hint(
                "No vitrine.toml detected; using defaults and environment variables",
                "Pass --config or set VITRINE_CONFIG to use a configuration file",
            );
        }

        let config = compose_config(
            file_config.unwrap_or_default(),
            env,
            &self.options.overrides,
            config_path,
            &mut warnings,
        )?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let (path, explicit) = if let Some(path) = &self.options.config_path {
            (path.clone(), true)
        } else if let Some(path) = &env.config_path {
            (path.clone(), true)
        } else {
            match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => (path, false),
                None => return Ok((None, None)),
            }
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn compose_config(
    file: FileConfig,
    env: EnvConfig,
    overrides: &ConfigOverrides,
    config_path: Option<PathBuf>,
    warnings: &mut ConfigWarnings,
) -> Result<Config, ConfigLoadError> {
    let FileConfig {
        server: file_server,
        library: file_library,
        enqueue: file_enqueue,
    } = file;

    let server_defaults = ServerConfig::default();
    let server = ServerConfig {
        host: overrides
            .host
            .clone()
            .or(env.server_host)
            .or(file_server.host)
            .unwrap_or(server_defaults.host),
        port: overrides
            .port
            .or(env.server_port)
            .or(file_server.port)
            .unwrap_or(server_defaults.port),
        cors_allowed_origins: env
            .cors_allowed_origins
            .or(file_server.cors_allowed_origins)
            .unwrap_or(server_defaults.cors_allowed_origins),
    };

    let root = overrides
        .library_root
        .clone()
        .or(env.library_root)
        .or(file_library.root)
        .ok_or(ConfigLoadError::MissingLibraryRoot)?;

    let refresh_interval = match (env.refresh_interval, file_library.refresh_interval) {
        (Some(raw), _) => parse_interval("VITRINE_REFRESH_INTERVAL", &raw)?,
        (None, Some(raw)) => parse_interval("library.refresh_interval", &raw)?,
        (None, None) => DEFAULT_REFRESH_INTERVAL,
    };

    let layout_defaults = MediaLayout::default();
    let layout = MediaLayout {
        poster_extension: extension(
            "library.poster_extension",
            file_library.poster_extension,
            layout_defaults.poster_extension,
        )?,
        fanart_extension: extension(
            "library.fanart_extension",
            file_library.fanart_extension,
            layout_defaults.fanart_extension,
        )?,
        descriptor_extension: extension(
            "library.descriptor_extension",
            file_library.descriptor_extension,
            layout_defaults.descriptor_extension,
        )?,
        video_extension: extension(
            "library.video_extension",
            file_library.video_extension,
            layout_defaults.video_extension,
        )?,
        file_route: file_route(file_library.file_route, layout_defaults.file_route)?,
    };

    let library = LibraryConfig {
        root,
        refresh_interval,
        layout,
    };
    if !library.root.is_dir() {
        warnings.push_with_hint(
            format!("library root {} is not a directory", library.root.display()),
            "The initial catalog build will fail until the directory exists",
        );
    }

    let enqueue_defaults = EnqueueConfig::default();
    let enqueue = EnqueueConfig {
        enabled: env
            .enqueue_enabled
            .or(file_enqueue.enabled)
            .unwrap_or(enqueue_defaults.enabled),
        api_key: env
            .api_key
            .or(file_enqueue.api_key.filter(|key| !key.trim().is_empty())),
        ledger_path: env
            .ledger_path
            .or(file_enqueue.ledger_path)
            .unwrap_or(enqueue_defaults.ledger_path),
        ledger_table: sql_identifier(
            "enqueue.ledger_table",
            file_enqueue.ledger_table,
            enqueue_defaults.ledger_table,
        )?,
        ledger_column: sql_identifier(
            "enqueue.ledger_column",
            file_enqueue.ledger_column,
            enqueue_defaults.ledger_column,
        )?,
        program: file_enqueue
            .program
            .filter(|program| !program.trim().is_empty())
            .unwrap_or(enqueue_defaults.program),
        args: file_enqueue.args.unwrap_or(enqueue_defaults.args),
        working_dir: file_enqueue
            .working_dir
            .unwrap_or(enqueue_defaults.working_dir),
        max_concurrent_jobs: match file_enqueue.max_concurrent_jobs {
            Some(0) => {
                return Err(ConfigLoadError::InvalidValue {
                    key: "enqueue.max_concurrent_jobs",
                    reason: "must be at least 1".to_string(),
                });
            }
            Some(max) => max,
            None => enqueue_defaults.max_concurrent_jobs,
        },
        shutdown_grace: match file_enqueue.shutdown_grace {
            Some(raw) => humantime::parse_duration(raw.trim()).map_err(|source| {
                ConfigLoadError::InvalidDuration {
                    key: "enqueue.shutdown_grace",
                    value: raw.clone(),
                    source,
                }
            })?,
            None => DEFAULT_SHUTDOWN_GRACE,
        },
    };
    if enqueue.enabled && enqueue.api_key.is_none() {
        warnings.push_with_hint(
            "Enqueue routes are enabled without an API key; anyone can start acquisition jobs",
            "Set VITRINE_API_KEY or enqueue.api_key",
        );
    }

    Ok(Config {
        server,
        library,
        enqueue,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded: false,
        },
    })
}

fn parse_interval(
    key: &'static str,
    raw: &str,
) -> Result<Duration, ConfigLoadError> {
    let interval = humantime::parse_duration(raw.trim()).map_err(|source| {
        ConfigLoadError::InvalidDuration {
            key,
            value: raw.to_string(),
            source,
        }
    })?;
    if interval.is_zero() {
        return Err(ConfigLoadError::InvalidValue {
            key,
            reason: "refresh interval must be greater than zero".to_string(),
        });
    }
    Ok(interval)
}

fn extension(
    key: &'static str,
    value: Option<String>,
    default: String,
) -> Result<String, ConfigLoadError> {
    let Some(value) = value else {
        return Ok(default);
    };
    let trimmed = value.trim().trim_start_matches('.');
    if trimmed.is_empty() || trimmed.contains(['/', '\\', '\0']) {
        return Err(ConfigLoadError::InvalidValue {
            key,
            reason: format!("{value:?} is not a file extension"),
        });
    }
    Ok(trimmed.to_string())
}

fn file_route(
    value: Option<String>,
    default: String,
) -> Result<String, ConfigLoadError> {
    let Some(value) = value else {
        return Ok(default);
    };
    let trimmed = value.trim().trim_end_matches('/');
    if !trimmed.starts_with('/') || trimmed.len() < 2 || trimmed.contains(['{', '}', '*']) {
        return Err(ConfigLoadError::InvalidValue {
            key: "library.file_route",
            reason: format!("{value:?} must be an absolute URL path such as /file"),
        });
    }
    Ok(trimmed.to_string())
}

fn sql_identifier(
    key: &'static str,
    value: Option<String>,
    default: String,
) -> Result<String, ConfigLoadError> {
    match value {
        Some(name) if is_sql_identifier(&name) => Ok(name),
        Some(name) => Err(ConfigLoadError::InvalidValue {
            key,
            reason: format!("{name:?} is not a plain SQL identifier"),
        }),
        None => Ok(default),
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {}", path.display())]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(
        "library root is not configured; pass --library-root, set VITRINE_LIBRARY_ROOT or library.root"
    )]
    MissingLibraryRoot,
    #[error("invalid duration {value:?} for {key}")]
    InvalidDuration {
        key: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}
