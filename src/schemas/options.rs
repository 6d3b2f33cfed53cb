//! Schema-wide options.

use serde::{Deserialize, Serialize};

/// Options that apply to a schema as a whole rather than to any single
/// property.
///
/// Absent options hash and compile exactly as a default-constructed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaOptions {
    /// When set, rows of this schema reject sparse fields whose path is not
    /// declared in the schema.
    #[serde(default)]
    pub disallow_unschematized: bool,

    /// When set, a per-property timestamp is maintained for change tracking.
    #[serde(default)]
    pub enable_property_level_timestamp: bool,

    /// When set, the system properties prefix is not reserved in this schema.
    #[serde(default)]
    pub disable_system_prefix: bool,
}
