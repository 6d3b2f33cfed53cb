//! # Key Path References
//!
//! Partition, primary-sort, and static keys each reference a property of the
//! enclosing schema by path. The layout compiler validates that every key
//! path maps to a declared property; a dangling key reference is a compile
//! error, not a runtime condition.

use serde::{Deserialize, Serialize};

/// Direction of a primary sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc", alias = "ascending")]
    Ascending = 0,
    #[serde(rename = "desc", alias = "descending")]
    Descending = 1,
}

impl SortDirection {
    pub const fn value(&self) -> i32 {
        *self as i32
    }

    pub const fn from_value(value: i32) -> Option<SortDirection> {
        match value {
            0 => Some(SortDirection::Ascending),
            1 => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

/// One component of a schema's partition key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionKey {
    /// The logical path of the referenced property.
    pub path: String,
}

/// One component of a schema's primary sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimarySortKey {
    /// The logical path of the referenced property.
    pub path: String,

    #[serde(default)]
    pub direction: SortDirection,
}

/// A path holding data shared by all rows with the same partition key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticKey {
    /// The logical path of the referenced property.
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_direction_values_roundtrip() {
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            assert_eq!(SortDirection::from_value(direction.value()), Some(direction));
        }
        assert_eq!(SortDirection::from_value(2), None);
    }

    #[test]
    fn sort_direction_defaults_to_ascending() {
        let key: PrimarySortKey = serde_json::from_str(r#"{"path": "id"}"#).unwrap();
        assert_eq!(key.direction, SortDirection::Ascending);
    }

    #[test]
    fn sort_direction_accepts_long_form() {
        let key: PrimarySortKey =
            serde_json::from_str(r#"{"path": "id", "direction": "descending"}"#).unwrap();
        assert_eq!(key.direction, SortDirection::Descending);
    }
}
