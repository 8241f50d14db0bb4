//! The in-memory catalog listing.
//!
//! [`CatalogCache`] owns the current list of [`CatalogEntry`] values behind a
//! single-writer / multi-reader lock. A rebuild holds the write lock from
//! the moment it starts until the new list is installed, so readers see
//! either the previous complete build or the next one and never a mixture.
//!
//! # Rebuild heuristic
//!
//! A rebuild first counts the item directories that have a poster. If that
//! count equals the number of cached entries the rebuild is skipped and the
//! cache is left untouched. This is cheap but unsound: replacing one valid
//! item with another, or renaming an item, keeps the count and therefore
//! keeps the stale listing until some other change moves the count.

mod refresh;

use std::{
    fs,
    sync::Arc,
    time::{Duration, Instant, SystemTime},
};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use vitrine_model::{CatalogEntry, ItemId};

use crate::{error::CatalogError, library::MediaLibrary, metadata::MetadataReader};

pub use refresh::spawn_refresh;

/// An immutable view of one complete build.
pub type CatalogSnapshot = Arc<[CatalogEntry]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The listing was discarded and rebuilt.
    Rebuilt { items: usize, elapsed: Duration },
    /// The valid-item count matched the cache, so nothing was rebuilt.
    Unchanged { items: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStatus {
    pub items: usize,
    /// Completion time of the last rebuild that replaced the listing.
    pub built_at: Option<DateTime<Utc>>,
    /// Completion time of the last successful `build()`, skipped or not.
    pub checked_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct CatalogState {
    entries: CatalogSnapshot,
    built_at: Option<DateTime<Utc>>,
    checked_at: Option<DateTime<Utc>>,
}

/// One immediate subdirectory of the library root.
#[derive(Debug)]
struct Candidate {
    id: ItemId,
    modified: SystemTime,
    has_poster: bool,
}

#[derive(Debug)]
enum BuildPlan {
    Unchanged { valid: usize },
    Rebuild(Vec<CatalogEntry>),
}

#[derive(Debug)]
pub struct CatalogCache {
    library: Arc<MediaLibrary>,
    metadata: MetadataReader,
    state: RwLock<CatalogState>,
}

impl CatalogCache {
    pub fn new(library: Arc<MediaLibrary>) -> Self {
        let metadata = MetadataReader::new(Arc::clone(&library));
        Self {
            library,
            metadata,
            state: RwLock::new(CatalogState {
                entries: Arc::from(Vec::new()),
                built_at: None,
                checked_at: None,
            }),
        }
    }

    /// Scans the library root and replaces the listing unless the
    /// valid-item count is unchanged (see the module docs).
    ///
    /// Fails only when the root itself cannot be listed; the previous
    /// listing is kept in that case.
    pub async fn build(&self) -> Result<BuildOutcome, CatalogError> {
        let mut state = self.state.write().await;
        let started = Instant::now();
        info!(root = %self.library.root().display(), "building catalog");

        let library = Arc::clone(&self.library);
        let metadata = self.metadata.clone();
        let cached = state.entries.len();
        let plan = tokio::task::spawn_blocking(move || {
            plan_build(&library, &metadata, cached)
        })
        .await??;

        let now = Utc::now();
        state.checked_at = Some(now);
        match plan {
            BuildPlan::Unchanged { valid } => {
                info!(items = valid, "catalog unchanged");
                Ok(BuildOutcome::Unchanged { items: valid })
            }
            BuildPlan::Rebuild(entries) => {
                let items = entries.len();
                state.entries = Arc::from(entries);
                state.built_at = Some(now);
                let elapsed = started.elapsed();
                info!(items, ?elapsed, "catalog built");
                Ok(BuildOutcome::Rebuilt { items, elapsed })
            }
        }
    }

    /// The entries of the last completed build, most recently modified
    /// first.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        Arc::clone(&self.state.read().await.entries)
    }

    pub async fn status(&self) -> CatalogStatus {
        let state = self.state.read().await;
        CatalogStatus {
            items: state.entries.len(),
            built_at: state.built_at,
            checked_at: state.checked_at,
        }
    }
}

fn plan_build(
    library: &MediaLibrary,
    metadata: &MetadataReader,
    cached: usize,
) -> Result<BuildPlan, CatalogError> {
    let candidates = survey(library)?;
    let valid = candidates.iter().filter(|c| c.has_poster).count();
    if valid == cached {
        return Ok(BuildPlan::Unchanged { valid });
    }

    let mut entries = Vec::with_capacity(valid);
    for candidate in candidates {
        if !candidate.has_poster {
            debug!(item_id = %candidate.id, "poster not found, skipping");
            continue;
        }
        let title = match metadata.read(&candidate.id) {
            Ok(resolved) => resolved.title,
            Err(err) => {
                warn!(item_id = %candidate.id, error = %err, "using identifier as title");
                candidate.id.to_string()
            }
        };
        let poster_path =
            library.file_url(&candidate.id, &library.poster_name(&candidate.id));
        entries.push(CatalogEntry {
            id: candidate.id,
            title,
            poster_path,
        });
    }
    Ok(BuildPlan::Rebuild(entries))
}

/// Lists item directories, newest modification first. Ties are broken by
/// identifier so a single build is deterministic.
fn survey(library: &MediaLibrary) -> Result<Vec<Candidate>, CatalogError> {
    let root = library.root();
    let read_dir = fs::read_dir(root).map_err(|source| CatalogError::ReadRoot {
        path: root.to_path_buf(),
        source,
    })?;

    let mut candidates = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|source| CatalogError::ReadRoot {
            path: root.to_path_buf(),
            source,
        })?;
        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => {}
            Ok(_) => continue,
            Err(err) => {
                warn!(path = %entry.path().display(), error = %err, "cannot stat entry");
                continue;
            }
        }

        let Ok(name) = entry.file_name().into_string() else {
            warn!(path = %entry.path().display(), "skipping non UTF-8 directory name");
            continue;
        };
        let id = match ItemId::parse(name) {
            Ok(id) => id,
            Err(err) => {
                warn!(path = %entry.path().display(), error = %err, "skipping directory");
                continue;
            }
        };
        let modified = match entry.metadata().and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(err) => {
                warn!(item_id = %id, error = %err, "cannot read modification time");
                continue;
            }
        };
        let has_poster = fs::metadata(library.poster_file(&id)).is_ok();
        candidates.push(Candidate {
            id,
            modified,
            has_poster,
        });
    }

    candidates.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(candidates)
}
