//! Fanart discovery and ordering.
//!
//! Fanart files are named `<id>-fanart.<ext>` or `<id>-fanart-<N>.<ext>`.
//! Numbered files come first in ascending `N`; files without a number
//! follow, ordered by their generated URL path. The numbers are the
//! author's explicit ordering and always win over directory order.

use std::{cmp::Ordering, fs, sync::Arc};

use vitrine_model::ItemId;

use crate::{error::FanartError, library::MediaLibrary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanartFile {
    pub path: String,
    pub numeric_suffix: Option<u64>,
}

impl FanartFile {
    fn order(&self, other: &Self) -> Ordering {
        match (self.numeric_suffix, other.numeric_suffix) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.path.cmp(&other.path)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.path.cmp(&other.path),
        }
    }
}

/// Returns `None` when `name` is not a fanart file for this prefix/suffix,
/// `Some(None)` for an unnumbered match and `Some(Some(n))` for `-<n>`.
fn classify(name: &str, prefix: &str, suffix: &str) -> Option<Option<u64>> {
    let rest = name.strip_prefix(prefix)?.strip_suffix(suffix)?;
    let digits = rest.strip_prefix('-').unwrap_or(rest);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Some(None);
    }
    Some(digits.parse().ok())
}

/// Orders fanart for `id` given the names found in its directory.
pub fn order_fanart<I, S>(library: &MediaLibrary, id: &ItemId, names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let prefix = library.fanart_prefix(id);
    let suffix = library.fanart_suffix();

    let mut files: Vec<FanartFile> = names
        .into_iter()
        .filter_map(|name| {
            let name = name.as_ref();
            classify(name, &prefix, &suffix).map(|numeric_suffix| FanartFile {
                path: library.file_url(id, name),
                numeric_suffix,
            })
        })
        .collect();

    files.sort_by(FanartFile::order);
    files.into_iter().map(|file| file.path).collect()
}

#[derive(Debug, Clone)]
pub struct FanartResolver {
    library: Arc<MediaLibrary>,
}

impl FanartResolver {
    pub fn new(library: Arc<MediaLibrary>) -> Self {
        Self { library }
    }

    /// Blocking. Lists the item directory and returns ordered fanart URL
    /// paths; directories and non-UTF-8 names are skipped.
    pub fn resolve(&self, id: &ItemId) -> Result<Vec<String>, FanartError> {
        let dir = self.library.item_dir(id);
        let entries = fs::read_dir(&dir).map_err(|source| FanartError {
            path: dir.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| FanartError {
                path: dir.clone(),
                source,
            })?;
            let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            if is_dir {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }

        Ok(order_fanart(&self.library, id, names))
    }
}
