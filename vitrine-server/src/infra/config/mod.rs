pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigOverrides};
pub use models::{Config, ConfigMetadata, EnqueueConfig, LibraryConfig, ServerConfig};
pub use validation::{ConfigWarning, ConfigWarnings};
