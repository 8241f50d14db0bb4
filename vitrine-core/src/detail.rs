//! Per-item detail assembly.
//!
//! Nothing here is cached: every call re-reads the descriptor, lists the
//! item directory for fanart and checks for the video file.

use std::{fs, sync::Arc};

use tokio::task::JoinError;
use tracing::{debug, warn};
use vitrine_model::{DetailRecord, ItemId};

use crate::{fanart::FanartResolver, library::MediaLibrary, metadata::MetadataReader};

/// Release date reported when the descriptor is missing or malformed.
pub const UNKNOWN_RELEASE_DATE: &str = "Unknown";

#[derive(Debug, Clone)]
pub struct DetailService {
    library: Arc<MediaLibrary>,
    metadata: MetadataReader,
    fanart: FanartResolver,
}

impl DetailService {
    pub fn new(library: Arc<MediaLibrary>) -> Self {
        Self {
            metadata: MetadataReader::new(Arc::clone(&library)),
            fanart: FanartResolver::new(Arc::clone(&library)),
            library,
        }
    }

    /// Blocking. An item directory that does not exist still yields a
    /// record built entirely from defaults.
    pub fn assemble(&self, id: &ItemId) -> DetailRecord {
        let (title, release_date) = match self.metadata.read(id) {
            Ok(resolved) => (resolved.title, resolved.release_date),
            Err(err) => {
                debug!(item_id = %id, error = %err, "detail falling back to defaults");
                (id.to_string(), UNKNOWN_RELEASE_DATE.to_string())
            }
        };

        let ordered_fanart_paths = self.fanart.resolve(id).unwrap_or_else(|err| {
            warn!(item_id = %id, error = %err, "fanart listing failed");
            Vec::new()
        });

        let video_path = fs::metadata(self.library.video_file(id))
            .ok()
            .filter(|meta| meta.is_file())
            .map(|_| self.library.file_url(id, &self.library.video_name(id)));

        DetailRecord {
            id: id.clone(),
            title,
            release_date,
            ordered_fanart_paths,
            video_path,
        }
    }

    pub async fn detail(&self, id: ItemId) -> Result<DetailRecord, JoinError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.assemble(&id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::MediaLayout;
    use tempfile::TempDir;

    fn setup() -> (TempDir, DetailService) {
        let dir = TempDir::new().unwrap();
        let library = Arc::new(MediaLibrary::new(dir.path(), MediaLayout::default()));
        (dir, DetailService::new(library))
    }

    fn id(raw: &str) -> ItemId {
        ItemId::parse(raw).unwrap()
    }

    #[test]
    fn missing_descriptor_uses_defaults() {
        let (dir, service) = setup();
        fs::create_dir(dir.path().join("ABC-001")).unwrap();

        let record = service.assemble(&id("ABC-001"));
        assert_eq!(record.title, "ABC-001");
        assert_eq!(record.release_date, "Unknown");
        assert!(record.ordered_fanart_paths.is_empty());
        assert!(record.video_path.is_none());
    }

    #[test]
    fn missing_item_directory_still_answers() {
        let (_dir, service) = setup();
        let record = service.assemble(&id("GHOST-1"));
        assert_eq!(record.title, "GHOST-1");
        assert_eq!(record.release_date, "Unknown");
        assert!(record.ordered_fanart_paths.is_empty());
    }

    #[test]
    fn assembles_full_record() {
        let (dir, service) = setup();
        let item = dir.path().join("ABC-002");
        fs::create_dir(&item).unwrap();
        fs::write(
            item.join("ABC-002.nfo"),
            "<movie><title>Full</title><releasedate>2024-03-01</releasedate></movie>",
        )
        .unwrap();
        fs::write(item.join("ABC-002.mp4"), b"video").unwrap();
        fs::write(item.join("ABC-002-fanart.jpg"), b"").unwrap();
        fs::write(item.join("ABC-002-fanart-2.jpg"), b"").unwrap();
        fs::write(item.join("ABC-002-fanart-1.jpg"), b"").unwrap();
        fs::write(item.join("ABC-002-poster.jpg"), b"").unwrap();

        let record = service.assemble(&id("ABC-002"));
        assert_eq!(record.title, "Full");
        assert_eq!(record.release_date, "2024-03-01");
        assert_eq!(
            record.ordered_fanart_paths,
            vec![
                "/file/ABC-002/ABC-002-fanart-1.jpg",
                "/file/ABC-002/ABC-002-fanart-2.jpg",
                "/file/ABC-002/ABC-002-fanart.jpg",
            ]
        );
        assert_eq!(record.video_path.as_deref(), Some("/file/ABC-002/ABC-002.mp4"));
    }

    #[test]
    fn descriptor_without_date_reports_empty_date() {
        let (dir, service) = setup();
        let item = dir.path().join("ABC-003");
        fs::create_dir(&item).unwrap();
        fs::write(item.join("ABC-003.nfo"), "<movie><title>T</title></movie>").unwrap();

        let record = service.assemble(&id("ABC-003"));
        assert_eq!(record.title, "T");
        assert_eq!(record.release_date, "");
    }

    #[test]
    fn video_directory_is_not_a_video() {
        let (dir, service) = setup();
        let item = dir.path().join("ABC-004");
        fs::create_dir_all(item.join("ABC-004.mp4")).unwrap();

        assert!(service.assemble(&id("ABC-004")).video_path.is_none());
    }

    #[tokio::test]
    async fn async_detail_matches_blocking_assembly() -> anyhow::Result<()> {
        let (dir, service) = setup();
        fs::create_dir(dir.path().join("ABC-005"))?;
        let record = service.detail(id("ABC-005")).await?;
        assert_eq!(record, service.assemble(&id("ABC-005")));
        Ok(())
    }
}
