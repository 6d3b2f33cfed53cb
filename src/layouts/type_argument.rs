//! # Scope Type Arguments
//!
//! A `TypeArgument` describes the declared element type of a scope column:
//! an array's item type, a map's key and value types, a tuple's positional
//! types, or a UDT reference by schema id. Type arguments nest arbitrarily.

use crate::layouts::LayoutCode;
use crate::schemas::SchemaId;

/// The declared type of one scope element position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeArgument {
    pub code: LayoutCode,
    /// Resolved schema id when `code` is a schema scope.
    pub schema_id: SchemaId,
    pub type_args: TypeArgumentList,
}

impl TypeArgument {
    pub fn of(code: LayoutCode) -> TypeArgument {
        TypeArgument {
            code,
            schema_id: SchemaId::NONE,
            type_args: TypeArgumentList::new(),
        }
    }

    pub fn with_args(code: LayoutCode, type_args: TypeArgumentList) -> TypeArgument {
        TypeArgument {
            code,
            schema_id: SchemaId::NONE,
            type_args,
        }
    }

    pub fn udt(schema_id: SchemaId) -> TypeArgument {
        TypeArgument {
            code: LayoutCode::Schema,
            schema_id,
            type_args: TypeArgumentList::new(),
        }
    }
}

/// An ordered list of type arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeArgumentList(Vec<TypeArgument>);

impl TypeArgumentList {
    pub fn new() -> TypeArgumentList {
        TypeArgumentList(Vec::new())
    }

    pub fn of(args: Vec<TypeArgument>) -> TypeArgumentList {
        TypeArgumentList(args)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TypeArgument> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeArgument> {
        self.0.iter()
    }
}
