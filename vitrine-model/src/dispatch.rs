use std::fmt;

use crate::ids::ItemId;

/// Result of an enqueue request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "snake_case"))]
pub enum DispatchStatus {
    /// The ledger already records this identifier; nothing was dispatched.
    AlreadyPresent { id: ItemId },
    /// An acquisition job is queued for this identifier.
    Enqueued { id: ItemId },
}

impl DispatchStatus {
    pub fn id(&self) -> &ItemId {
        match self {
            DispatchStatus::AlreadyPresent { id }
            | DispatchStatus::Enqueued { id } => id,
        }
    }
}

/// The plain-text message returned to enqueue callers.
impl fmt::Display for DispatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchStatus::AlreadyPresent { id } => {
                write!(f, "{id} already downloaded")
            }
            DispatchStatus::Enqueued { id } => {
                write!(f, "Add {id} to download queue")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_the_enqueue_contract() {
        let id = ItemId::parse("ABC-001").unwrap();
        let present = DispatchStatus::AlreadyPresent { id: id.clone() };
        let queued = DispatchStatus::Enqueued { id };
        assert!(present.to_string().ends_with("already downloaded"));
        assert!(queued.to_string().starts_with("Add"));
        assert_eq!(queued.to_string(), "Add ABC-001 to download queue");
    }
}
