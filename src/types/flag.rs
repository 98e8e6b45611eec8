//! The tri-state deletion flag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Requested state of an entity's `IsMarkedForDeletion` column.
///
/// On the wire this is a nullable boolean: `null` (or an absent field) means
/// the request does not touch the entity, `true` marks it deleted and `false`
/// restores it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum DeletionFlag {
    /// No change requested.
    #[default]
    Unset,
    /// Mark the entity deleted.
    Deleted,
    /// Clear the deleted mark.
    Restored,
}

impl DeletionFlag {
    /// Returns true if the request carries an explicit value.
    pub fn is_set(&self) -> bool {
        !matches!(self, DeletionFlag::Unset)
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, DeletionFlag::Deleted)
    }

    pub fn is_restored(&self) -> bool {
        matches!(self, DeletionFlag::Restored)
    }
}

impl From<Option<bool>> for DeletionFlag {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => DeletionFlag::Unset,
            Some(true) => DeletionFlag::Deleted,
            Some(false) => DeletionFlag::Restored,
        }
    }
}

impl From<DeletionFlag> for Option<bool> {
    fn from(flag: DeletionFlag) -> Self {
        match flag {
            DeletionFlag::Unset => None,
            DeletionFlag::Deleted => Some(true),
            DeletionFlag::Restored => Some(false),
        }
    }
}

impl From<bool> for DeletionFlag {
    fn from(value: bool) -> Self {
        Some(value).into()
    }
}

impl fmt::Display for DeletionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionFlag::Unset => write!(f, "unset"),
            DeletionFlag::Deleted => write!(f, "deleted"),
            DeletionFlag::Restored => write!(f, "restored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default)]
        flag: DeletionFlag,
    }

    #[test]
    fn null_and_absent_are_unset() {
        let held: Holder = serde_json::from_str(r#"{"flag": null}"#).unwrap();
        assert_eq!(held.flag, DeletionFlag::Unset);

        let held: Holder = serde_json::from_str("{}").unwrap();
        assert_eq!(held.flag, DeletionFlag::Unset);
    }

    #[test]
    fn booleans_map_to_explicit_states() {
        let held: Holder = serde_json::from_str(r#"{"flag": true}"#).unwrap();
        assert_eq!(held.flag, DeletionFlag::Deleted);

        let held: Holder = serde_json::from_str(r#"{"flag": false}"#).unwrap();
        assert_eq!(held.flag, DeletionFlag::Restored);
    }

    #[test]
    fn serializes_back_to_nullable_bool() {
        assert_eq!(serde_json::to_string(&DeletionFlag::Unset).unwrap(), "null");
        assert_eq!(serde_json::to_string(&DeletionFlag::Deleted).unwrap(), "true");
        assert_eq!(
            serde_json::to_string(&DeletionFlag::Restored).unwrap(),
            "false"
        );
    }

    #[test]
    fn predicates_are_exclusive() {
        for flag in [
            DeletionFlag::Unset,
            DeletionFlag::Deleted,
            DeletionFlag::Restored,
        ] {
            let count = [flag.is_deleted(), flag.is_restored(), !flag.is_set()]
                .iter()
                .filter(|b| **b)
                .count();
            assert_eq!(count, 1, "{flag:?}");
        }
    }
}
