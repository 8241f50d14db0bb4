//! Item descriptor (`<id>.nfo`) parsing.
//!
//! Descriptors are Kodi-style XML documents rooted at `<movie>`. Only the
//! direct children `title`, `releasedate` and `premiered` are read; every
//! other element is skipped. The bytes are always decoded as UTF-8: a
//! leading byte-order mark is stripped and any `encoding` named in the XML
//! declaration is ignored.

use std::{fs, sync::Arc};

use quick_xml::{events::Event, reader::Reader};
use tracing::debug;
use vitrine_model::ItemId;

use crate::{
    error::{DescriptorError, MetadataError},
    library::MediaLibrary,
};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const ROOT_ELEMENT: &[u8] = b"movie";

/// Raw fields read from a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub premiered: Option<String>,
}

/// Title and date after fallbacks have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMetadata {
    pub title: String,
    pub release_date: String,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    ReleaseDate,
    Premiered,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"title" => Some(Field::Title),
            b"releasedate" => Some(Field::ReleaseDate),
            b"premiered" => Some(Field::Premiered),
            _ => None,
        }
    }
}

impl Metadata {
    pub fn parse(bytes: &[u8]) -> Result<Self, DescriptorError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let text = std::str::from_utf8(bytes)?;

        // Field text is kept verbatim, surrounding whitespace included.
        let mut xml = Reader::from_str(text);

        let mut metadata = Metadata::default();
        let mut depth = 0usize;
        let mut current: Option<Field> = None;

        loop {
            match xml.read_event()? {
                Event::Start(ref e) => {
                    depth += 1;
                    if depth == 1 {
                        if e.name().as_ref() != ROOT_ELEMENT {
                            return Err(DescriptorError::Structure(
                                "root element is not <movie>",
                            ));
                        }
                    } else if depth == 2 {
                        current = Field::from_tag(e.name().as_ref());
                        if let Some(field) = current {
                            // A repeated element replaces the earlier value.
                            *metadata.slot(field) = Some(String::new());
                        }
                    }
                }
                Event::Empty(ref e) => {
                    if depth == 0 {
                        if e.name().as_ref() != ROOT_ELEMENT {
                            return Err(DescriptorError::Structure(
                                "root element is not <movie>",
                            ));
                        }
                        return Ok(metadata);
                    }
                }
                Event::Text(ref t) if depth == 2 => {
                    if let Some(field) = current {
                        let text = t.unescape()?;
                        metadata.append(field, &text);
                    }
                }
                Event::CData(t) if depth == 2 => {
                    if let Some(field) = current {
                        let raw = t.into_inner();
                        let text = std::str::from_utf8(&raw)?;
                        metadata.append(field, text);
                    }
                }
                Event::End(_) => {
                    if depth == 2 {
                        current = None;
                    }
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(metadata);
                    }
                }
                Event::Eof => {
                    return Err(DescriptorError::Structure(
                        "unexpected end of document",
                    ));
                }
                _ => {}
            }
        }
    }

    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::ReleaseDate => &mut self.release_date,
            Field::Premiered => &mut self.premiered,
        }
    }

    fn append(&mut self, field: Field, text: &str) {
        self.slot(field).get_or_insert_with(String::new).push_str(text);
    }

    /// Applies the fallbacks: an empty title becomes `id`, an empty release
    /// date falls back to `premiered`, and if both are empty the date is
    /// empty.
    pub fn resolve(self, id: &ItemId) -> ResolvedMetadata {
        let title = self
            .title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| id.to_string());
        let release_date = self
            .release_date
            .filter(|date| !date.is_empty())
            .or(self.premiered)
            .unwrap_or_default();
        ResolvedMetadata {
            title,
            release_date,
        }
    }
}

/// Reads and resolves an item's descriptor.
#[derive(Debug, Clone)]
pub struct MetadataReader {
    library: Arc<MediaLibrary>,
}

impl MetadataReader {
    pub fn new(library: Arc<MediaLibrary>) -> Self {
        Self { library }
    }

    /// Blocking; call from a blocking context.
    pub fn read(&self, id: &ItemId) -> Result<ResolvedMetadata, MetadataError> {
        let path = self.library.descriptor_file(id);
        let parsed = fs::read(&path)
            .map_err(DescriptorError::from)
            .and_then(|bytes| Metadata::parse(&bytes));

        match parsed {
            Ok(metadata) => Ok(metadata.resolve(id)),
            Err(cause) => {
                debug!(item_id = %id, path = %path.display(), error = %cause, "descriptor unavailable");
                Err(MetadataError {
                    id: id.clone(),
                    path,
                    cause,
                })
            }
        }
    }
}
