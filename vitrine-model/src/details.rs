use crate::ids::ItemId;

/// Per-item detail, computed fresh for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DetailRecord {
    pub id: ItemId,
    pub title: String,
    pub release_date: String,
    /// Ordered fanart URL paths. Always present, possibly empty.
    #[cfg_attr(feature = "serde", serde(rename = "fanarts", default))]
    pub ordered_fanart_paths: Vec<String>,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "videoFile", default, skip_serializing_if = "Option::is_none")
    )]
    pub video_path: Option<String>,
}
