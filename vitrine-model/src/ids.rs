use std::fmt;

use uuid::Uuid;

use crate::error::{ModelError, Result};

/// Identifier of one catalog item: the name of its directory under the
/// library root.
///
/// An `ItemId` is always a single, non-empty path component. It never
/// contains a separator or NUL and is never `.` or `..`, so joining it
/// onto the library root cannot leave the root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemId(String);

impl ItemId {
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ModelError::EmptyId);
        }
        if raw == "."
            || raw == ".."
            || raw.contains(['/', '\\', '\0'])
        {
            return Err(ModelError::InvalidId(raw));
        }
        Ok(Self(raw))
    }

    /// Canonical ledger form: upper-cased.
    pub fn normalized(&self) -> Self {
        Self(self.0.to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ItemId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(raw).map_err(serde::de::Error::custom)
    }
}

/// Identifier of one dispatched acquisition job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JobId(pub Uuid);

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl JobId {
    pub fn new() -> Self {
        JobId(Uuid::now_v7())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_traversal_components() {
        assert_eq!(ItemId::parse(""), Err(ModelError::EmptyId));
        assert!(ItemId::parse(".").is_err());
        assert!(ItemId::parse("..").is_err());
        assert!(ItemId::parse("a/b").is_err());
        assert!(ItemId::parse("a\\b").is_err());
        assert!(ItemId::parse("a\0b").is_err());
    }

    #[test]
    fn accepts_dotted_names_that_are_not_relative_components() {
        let id = ItemId::parse("abc-123.v2").unwrap();
        assert_eq!(id.as_str(), "abc-123.v2");
    }

    #[test]
    fn normalized_upper_cases() {
        let id = ItemId::parse("abp-123").unwrap();
        assert_eq!(id.normalized().as_str(), "ABP-123");
        // The receiver keeps its casing.
        assert_eq!(id.as_str(), "abp-123");
    }

    #[test]
    fn job_ids_are_unique() {
        assert_ne!(JobId::new(), JobId::new());
    }
}
