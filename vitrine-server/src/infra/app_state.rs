use std::{fmt, sync::Arc};

use vitrine_core::{CatalogCache, DetailService, DownloadDispatcher, MediaLibrary};

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub library: Arc<MediaLibrary>,
    pub catalog: Arc<CatalogCache>,
    pub details: Arc<DetailService>,
    /// `None` when enqueueing is disabled; the enqueue routes are then
    /// not mounted.
    pub dispatcher: Option<Arc<DownloadDispatcher>>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("library_root", &self.library.root())
            .field("enqueue_enabled", &self.dispatcher.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wires the catalog and detail services over `config.library`. The
    /// catalog starts empty; call [`CatalogCache::build`] before serving.
    pub fn new(config: Arc<Config>, dispatcher: Option<Arc<DownloadDispatcher>>) -> Self {
        let library = Arc::new(MediaLibrary::new(
            config.library.root.clone(),
            config.library.layout.clone(),
        ));
        Self {
            catalog: Arc::new(CatalogCache::new(Arc::clone(&library))),
            details: Arc::new(DetailService::new(Arc::clone(&library))),
            library,
            config,
            dispatcher,
        }
    }
}
