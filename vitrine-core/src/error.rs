use std::path::PathBuf;

use thiserror::Error;
use vitrine_model::{ItemId, ModelError};

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("invalid item identifier: {0}")]
    InvalidId(#[from] ModelError),

    #[error("path {path:?} escapes the item directory")]
    PathEscape { path: String },
}

/// Why a descriptor could not be turned into [`crate::Metadata`].
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("{0}")]
    Structure(&'static str),
}

/// Descriptor missing or malformed. Callers degrade to defaults.
#[derive(Error, Debug)]
#[error("metadata unavailable for {id} ({}): {cause}", path.display())]
pub struct MetadataError {
    pub id: ItemId,
    pub path: PathBuf,
    #[source]
    pub cause: DescriptorError,
}

#[derive(Error, Debug)]
#[error("failed to read fanart directory {}: {source}", path.display())]
pub struct FanartError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read library root {}: {source}", path.display())]
    ReadRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog scan task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid ledger identifier {0:?}: expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier(String),

    #[error("ledger query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}")]
    Exited {
        program: String,
        status: std::process::ExitStatus,
    },
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    InvalidId(#[from] ModelError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
