//! Core data model definitions shared across Vitrine crates.

pub mod catalog;
pub mod details;
pub mod dispatch;
pub mod error;
pub mod ids;

pub use catalog::CatalogEntry;
pub use details::DetailRecord;
pub use dispatch::DispatchStatus;
pub use error::{ModelError, Result as ModelResult};
pub use ids::{ItemId, JobId};
