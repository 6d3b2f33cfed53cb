//! # Logical Schema Model
//!
//! A schema describes either table or UDT metadata: which properties a row
//! holds and the types of those properties. Schemas are parsed from JSON,
//! grouped into a `Namespace` so UDT properties can cross-reference each
//! other, and compiled once into a physical [`crate::layouts::Layout`].
//!
//! ## Schema JSON Format
//!
//! ```json
//! {
//!     "name": "Restaurant",
//!     "id": 1,
//!     "type": "schema",
//!     "options": { "disallowUnschematized": true },
//!     "properties": [
//!         { "path": "city", "type": { "type": "utf8" } },
//!         { "path": "rating", "type": { "type": "float64", "storage": "fixed" } }
//!     ],
//!     "partitionKeys": [ { "path": "city" } ]
//! }
//! ```
//!
//! Malformed JSON yields `None` from [`Schema::parse`], never an error.
//!
//! ## Module Structure
//!
//! - `property`: `Property` and the `PropertyType` sum type
//! - `keys`: partition, primary-sort, and static key references
//! - `options`: schema-wide options
//! - `hash`: structural schema hashing (`SchemaHash`)

pub mod hash;
pub mod keys;
pub mod options;
pub mod property;


pub use hash::SchemaHash;
pub use keys::{PartitionKey, PrimarySortKey, SortDirection, StaticKey};
pub use options::SchemaOptions;
pub use property::{PrimitivePropertyType, Property, PropertyType, StorageKind};

use eyre::Result;
use serde::{Deserialize, Serialize};

use crate::layouts::{Layout, LayoutCompiler};

/// The unique identifier of a schema within the scope of a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(pub i32);

impl SchemaId {
    /// Size of the serialized form in bytes.
    pub const BYTES: usize = 4;

    /// The absent schema id.
    pub const NONE: SchemaId = SchemaId(0);

    /// Marks an unresolved schema reference.
    pub const INVALID: SchemaId = SchemaId(i32::MIN);

    pub const fn value(&self) -> i32 {
        self.0
    }
}

/// The logical type name of a property as it appears in schema JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum TypeKind {
    #[serde(rename = "null")]
    Null = 0,
    #[serde(rename = "bool")]
    Boolean = 1,
    #[serde(rename = "int8")]
    Int8 = 2,
    #[serde(rename = "int16")]
    Int16 = 3,
    #[serde(rename = "int32")]
    Int32 = 4,
    #[serde(rename = "int64")]
    Int64 = 5,
    #[serde(rename = "uint8")]
    UInt8 = 6,
    #[serde(rename = "uint16")]
    UInt16 = 7,
    #[serde(rename = "uint32")]
    UInt32 = 8,
    #[serde(rename = "uint64")]
    UInt64 = 9,
    #[serde(rename = "varint")]
    VarInt = 10,
    #[serde(rename = "varuint")]
    VarUInt = 11,
    #[serde(rename = "float32")]
    Float32 = 12,
    #[serde(rename = "float64")]
    Float64 = 13,
    #[serde(rename = "float128")]
    Float128 = 14,
    #[serde(rename = "decimal")]
    Decimal = 15,
    #[serde(rename = "datetime")]
    DateTime = 16,
    #[serde(rename = "unixdatetime")]
    UnixDateTime = 17,
    #[serde(rename = "guid")]
    Guid = 18,
    #[serde(rename = "utf8")]
    Utf8 = 19,
    #[serde(rename = "binary")]
    Binary = 20,
    #[serde(rename = "object")]
    Object = 21,
    #[serde(rename = "array")]
    Array = 22,
    #[serde(rename = "map")]
    Map = 23,
    #[serde(rename = "set")]
    Set = 24,
    #[serde(rename = "tuple")]
    Tuple = 25,
    #[serde(rename = "tagged")]
    Tagged = 26,
    #[serde(rename = "schema")]
    Schema = 27,
    #[serde(rename = "any")]
    Any = 28,
    #[serde(rename = "enum")]
    Enum = 29,
}

impl TypeKind {
    /// Stable discriminant folded into the schema hash.
    pub const fn value(&self) -> i32 {
        *self as i32
    }
}

/// Versions of the HybridRow Schema Definition Language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SchemaLanguageVersion {
    #[serde(rename = "v1")]
    V1,
    #[default]
    #[serde(other)]
    Unspecified,
}

/// A schema describes either table or UDT metadata.
///
/// The schema of a table or UDT describes the structure of a row: which
/// properties it holds and the types of those properties. UDTs describe
/// nested structured objects that may appear either within a table property
/// or within another UDT.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Documentary only; never affects layout or hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<SchemaLanguageVersion>,

    #[serde(default = "Schema::default_id")]
    pub id: SchemaId,

    pub name: String,

    #[serde(rename = "type", default = "Schema::default_type")]
    pub type_kind: TypeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<SchemaOptions>,

    #[serde(default)]
    pub properties: Vec<Property>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partition_keys: Vec<PartitionKey>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_sort_keys: Vec<PrimarySortKey>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub static_keys: Vec<StaticKey>,
}

impl Schema {
    fn default_id() -> SchemaId {
        SchemaId::NONE
    }

    fn default_type() -> TypeKind {
        TypeKind::Schema
    }

    /// Parses a JSON fragment into a schema.
    ///
    /// Malformed JSON, or a document whose `type` is not `"schema"`, yields
    /// `None`.
    pub fn parse(value: &str) -> Option<Schema> {
        let schema: Schema = serde_json::from_str(value).ok()?;
        (schema.type_kind == TypeKind::Schema).then_some(schema)
    }

    /// Compiles this logical schema into a physical layout that can be used
    /// to read and write rows.
    ///
    /// Requires that `namespace` contains this schema.
    pub fn compile(&self, namespace: &Namespace) -> Result<Layout> {
        LayoutCompiler::compile(namespace, self)
    }

    /// Renders this schema as JSON. Encoding failures degrade to an embedded
    /// error object rather than raising.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|error| format!("{{\"error\": \"{}\"}}", error))
    }
}

/// The set of all schemas that may cross-reference each other via UDT
/// properties.
///
/// Both layout compilation and schema hashing resolve UDT references against
/// the enclosing namespace. Namespaces are immutable once constructed and may
/// be shared freely.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<SchemaLanguageVersion>,

    #[serde(default)]
    pub schemas: Vec<Schema>,
}

impl Namespace {
    /// Parses a JSON fragment into a namespace. Malformed JSON yields `None`.
    pub fn parse(value: &str) -> Option<Namespace> {
        serde_json::from_str(value).ok()
    }

    /// Wraps a single schema into a namespace of one.
    pub fn of(schema: Schema) -> Namespace {
        Namespace {
            schemas: vec![schema],
            ..Namespace::default()
        }
    }

    /// Whether `schema` is defined within this namespace.
    pub fn contains(&self, schema: &Schema) -> bool {
        self.schemas
            .iter()
            .any(|s| s.id == schema.id && s.name == schema.name)
    }

    /// Finds a schema by id.
    pub fn schema_by_id(&self, id: SchemaId) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.id == id)
    }
}
