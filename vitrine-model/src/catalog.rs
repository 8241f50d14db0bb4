use crate::ids::ItemId;

/// One row of the catalog listing.
///
/// Entries are produced by a catalog build and never mutated afterwards; a
/// rebuild replaces the whole set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogEntry {
    pub id: ItemId,
    pub title: String,
    /// URL path of the poster image, e.g. `/file/ABC-001/ABC-001-poster.jpg`.
    #[cfg_attr(feature = "serde", serde(rename = "poster"))]
    pub poster_path: String,
}
