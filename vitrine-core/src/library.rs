//! Naming conventions for an item directory and safe path resolution.
//!
//! ```text
//! <root>/<id>/<id>-poster.jpg        required for catalog inclusion
//! <root>/<id>/<id>.nfo               optional descriptor
//! <root>/<id>/<id>-fanart[-N].jpg    optional, any number
//! <root>/<id>/<id>.mp4               optional video
//! ```

use std::path::{Component, Path, PathBuf};

use vitrine_model::ItemId;

use crate::error::LibraryError;

/// File extensions and the URL prefix used to build client-facing paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLayout {
    pub poster_extension: String,
    pub fanart_extension: String,
    pub descriptor_extension: String,
    pub video_extension: String,
    /// URL prefix under which item files are served, without trailing `/`.
    pub file_route: String,
}

impl Default for MediaLayout {
    fn default() -> Self {
        Self {
            poster_extension: "jpg".to_string(),
            fanart_extension: "jpg".to_string(),
            descriptor_extension: "nfo".to_string(),
            video_extension: "mp4".to_string(),
            file_route: "/file".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaLibrary {
    root: PathBuf,
    layout: MediaLayout,
}

impl MediaLibrary {
    pub fn new(root: impl Into<PathBuf>, layout: MediaLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &MediaLayout {
        &self.layout
    }

    pub fn item_dir(&self, id: &ItemId) -> PathBuf {
        self.root.join(id.as_str())
    }

    pub fn poster_name(&self, id: &ItemId) -> String {
        format!("{id}-poster.{}", self.layout.poster_extension)
    }

    pub fn poster_file(&self, id: &ItemId) -> PathBuf {
        self.item_dir(id).join(self.poster_name(id))
    }

    pub fn descriptor_file(&self, id: &ItemId) -> PathBuf {
        self.item_dir(id)
            .join(format!("{id}.{}", self.layout.descriptor_extension))
    }

    pub fn video_name(&self, id: &ItemId) -> String {
        format!("{id}.{}", self.layout.video_extension)
    }

    pub fn video_file(&self, id: &ItemId) -> PathBuf {
        self.item_dir(id).join(self.video_name(id))
    }

    /// Common prefix of every fanart file name for `id`.
    pub fn fanart_prefix(&self, id: &ItemId) -> String {
        format!("{id}-fanart")
    }

    pub fn fanart_suffix(&self) -> String {
        format!(".{}", self.layout.fanart_extension)
    }

    /// Client-facing URL path of a file inside an item directory.
    pub fn file_url(&self, id: &ItemId, file_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.layout.file_route.trim_end_matches('/'),
            id,
            file_name
        )
    }

    /// Resolves a request for `<root>/<id>/<relative>` without touching the
    /// filesystem.
    ///
    /// Only plain name components are accepted in `relative`; `..`, `.`,
    /// absolute paths and drive prefixes are rejected, so the result always
    /// stays inside the item directory.
    pub fn resolve_file(
        &self,
        raw_id: &str,
        relative: &str,
    ) -> Result<PathBuf, LibraryError> {
        let id = ItemId::parse(raw_id)?;
        let relative_path = Path::new(relative);

        let mut components = 0usize;
        for component in relative_path.components() {
            match component {
                Component::Normal(part)
                    if !part.to_string_lossy().contains('\0') =>
                {
                    components += 1;
                }
                _ => {
                    return Err(LibraryError::PathEscape {
                        path: relative.to_string(),
                    });
                }
            }
        }
        if components == 0 {
            return Err(LibraryError::PathEscape {
                path: relative.to_string(),
            });
        }

        Ok(self.item_dir(&id).join(relative_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> MediaLibrary {
        MediaLibrary::new("/srv/media", MediaLayout::default())
    }

    fn id(raw: &str) -> ItemId {
        ItemId::parse(raw).unwrap()
    }

    #[test]
    fn derives_item_file_names() {
        let lib = library();
        let item = id("ABC-001");
        assert_eq!(
            lib.poster_file(&item),
            PathBuf::from("/srv/media/ABC-001/ABC-001-poster.jpg")
        );
        assert_eq!(
            lib.descriptor_file(&item),
            PathBuf::from("/srv/media/ABC-001/ABC-001.nfo")
        );
        assert_eq!(
            lib.video_file(&item),
            PathBuf::from("/srv/media/ABC-001/ABC-001.mp4")
        );
        assert_eq!(lib.fanart_prefix(&item), "ABC-001-fanart");
        assert_eq!(lib.fanart_suffix(), ".jpg");
    }

    #[test]
    fn builds_file_urls_under_the_file_route() {
        let lib = library();
        let item = id("ABC-001");
        assert_eq!(
            lib.file_url(&item, &lib.poster_name(&item)),
            "/file/ABC-001/ABC-001-poster.jpg"
        );

        let custom = MediaLibrary::new(
            "/srv/media",
            MediaLayout {
                file_route: "/media/".to_string(),
                ..MediaLayout::default()
            },
        );
        assert_eq!(custom.file_url(&item, "x.jpg"), "/media/ABC-001/x.jpg");
    }

    #[test]
    fn resolves_nested_files_inside_the_item_directory() {
        let lib = library();
        let path = lib.resolve_file("ABC-001", "extra/still.jpg").unwrap();
        assert_eq!(
            path,
            PathBuf::from("/srv/media/ABC-001/extra/still.jpg")
        );
    }

    #[test]
    fn rejects_traversal_in_the_relative_path() {
        let lib = library();
        for relative in [
            "../../etc/passwd",
            "../ABC-002/ABC-002.mp4",
            "a/../../b",
            "/etc/passwd",
            "./poster.jpg",
            "",
        ] {
            assert!(
                matches!(
                    lib.resolve_file("ABC-001", relative),
                    Err(LibraryError::PathEscape { .. })
                ),
                "{relative:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_traversal_in_the_identifier() {
        let lib = library();
        assert!(matches!(
            lib.resolve_file("..", "etc/passwd"),
            Err(LibraryError::InvalidId(_))
        ));
        assert!(matches!(
            lib.resolve_file("", "x.jpg"),
            Err(LibraryError::InvalidId(_))
        ));
    }
}
