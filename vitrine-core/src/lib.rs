//! Core library for the Vitrine media catalog.
//!
//! A library is a directory whose immediate subdirectories are items. Each
//! item directory carries a poster, an optional `.nfo` descriptor, optional
//! fanart images and an optional video file, all named after the directory.
//!
//! - [`library`]: naming rules and safe path resolution
//! - [`metadata`]: descriptor parsing with title/date fallbacks
//! - [`fanart`]: deterministic fanart ordering
//! - [`catalog`]: the in-memory listing and its periodic refresh
//! - [`detail`]: per-item detail assembly
//! - [`ledger`] and [`dispatch`]: enqueueing acquisition jobs

pub mod catalog;
pub mod detail;
pub mod dispatch;
pub mod error;
pub mod fanart;
pub mod ledger;
pub mod library;
pub mod metadata;

pub use catalog::{BuildOutcome, CatalogCache, CatalogSnapshot, CatalogStatus};
pub use detail::DetailService;
pub use dispatch::{
    CommandLauncher, Dispatch, DownloadDispatcher, JobLauncher, JobOutcome,
    JobResult, JobTicket,
};
pub use error::{
    CatalogError, DescriptorError, DispatchError, FanartError, LaunchError,
    LedgerError, LibraryError, MetadataError,
};
pub use fanart::FanartResolver;
pub use ledger::{Ledger, MemoryLedger, SqliteLedger};
pub use library::{MediaLayout, MediaLibrary};
pub use metadata::{Metadata, MetadataReader, ResolvedMetadata};

pub use vitrine_model as model;
