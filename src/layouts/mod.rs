//! # Physical Layouts
//!
//! A `Layout` is the compiled physical form of a schema: an ordered set of
//! columns with pre-computed byte offsets and presence-bit indices for the
//! fixed region, plus sparse columns for everything variable-length or
//! scope-typed. Compilation is deterministic: the same schema always
//! produces byte-identical layout metadata, because serialization
//! compatibility depends on it.
//!
//! ## Fixed Region
//!
//! ```text
//! +----------------------------+------------------------------------+
//! | presence bitmask           | fixed slots                        |
//! | [(nullable_count+7)/8]     | declaration order, computed widths |
//! +----------------------------+------------------------------------+
//! ```
//!
//! Each nullable fixed column owns one presence bit, assigned in
//! declaration order. Non-nullable fixed columns are always present.
//!
//! ## Module Structure
//!
//! - `code`: the `LayoutCode` wire enum
//! - `type_argument`: declared element types of scope columns
//! - `compiler`: `Schema` + `Namespace` -> `Layout`
//! - `resolver`: schema-id -> compiled layout cache

pub mod code;
pub mod compiler;
pub mod resolver;
pub mod type_argument;

#[cfg(test)]
mod tests;

pub use code::LayoutCode;
pub use compiler::LayoutCompiler;
pub use resolver::LayoutResolver;
pub use type_argument::{TypeArgument, TypeArgumentList};

use hashbrown::HashMap;

use crate::schemas::SchemaId;

/// Where a column's value lives within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnStorage {
    /// A fixed-width slot in the fixed region.
    ///
    /// `offset` is relative to the start of the fixed region (the presence
    /// bitmask); `bit` is the presence-bit index for nullable columns.
    Fixed {
        offset: usize,
        size: usize,
        bit: Option<usize>,
    },

    /// A self-describing (code, path, value) triple in the sparse region.
    Sparse,
}

/// One compiled column of a layout.
#[derive(Debug, Clone)]
pub struct LayoutColumn {
    pub path: String,
    pub type_code: LayoutCode,
    pub storage: ColumnStorage,
    pub nullable: bool,
    pub type_args: TypeArgumentList,
    /// Ordinal within the layout; doubles as the column's path token.
    pub index: usize,
}

/// The compiled physical form of a schema.
///
/// Immutable after compilation and safely shared across any number of
/// concurrent row sessions.
#[derive(Debug, Clone)]
pub struct Layout {
    name: String,
    schema_id: SchemaId,
    columns: Vec<LayoutColumn>,
    path_map: HashMap<String, usize>,
    bitmask_bytes: usize,
    fixed_size: usize,
}

impl Layout {
    pub(crate) fn new(
        name: String,
        schema_id: SchemaId,
        columns: Vec<LayoutColumn>,
        bitmask_bytes: usize,
        fixed_size: usize,
    ) -> Layout {
        let path_map = columns
            .iter()
            .map(|column| (column.path.clone(), column.index))
            .collect();
        Layout {
            name,
            schema_id,
            columns,
            path_map,
            bitmask_bytes,
            fixed_size,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_id(&self) -> SchemaId {
        self.schema_id
    }

    pub fn columns(&self) -> &[LayoutColumn] {
        &self.columns
    }

    /// Finds a column by its logical path.
    pub fn column(&self, path: &str) -> Option<&LayoutColumn> {
        self.path_map.get(path).map(|&index| &self.columns[index])
    }

    pub fn column_at(&self, index: usize) -> Option<&LayoutColumn> {
        self.columns.get(index)
    }

    /// Resolves a path to its token (the column ordinal), when the path is
    /// schematized.
    pub fn token(&self, path: &str) -> Option<u32> {
        self.path_map.get(path).map(|&index| index as u32)
    }

    /// Resolves a token back to its path.
    pub fn path_of_token(&self, token: u32) -> Option<&str> {
        self.columns.get(token as usize).map(|c| c.path.as_str())
    }

    /// Size in bytes of the leading presence bitmask.
    pub fn bitmask_bytes(&self) -> usize {
        self.bitmask_bytes
    }

    /// Total size in bytes of the fixed region (bitmask plus all fixed
    /// slots).
    pub fn fixed_size(&self) -> usize {
        self.fixed_size
    }
}
