//! # Properties and Property Types
//!
//! A property pairs a `path` (unique within its schema) with a
//! `PropertyType`. Property types form a single tagged union with one variant
//! per concrete kind, each carrying exactly the fields that kind needs:
//!
//! | Variant | Nested types |
//! |---------|--------------|
//! | `Primitive` | none (storage class + fixed length) |
//! | `Array`, `Set` | one item type |
//! | `Object` | nested property list |
//! | `Map` | key type + value type |
//! | `Tagged`, `Tuple` | item type list |
//! | `Udt` | schema reference by name or id |
//!
//! The JSON form is polymorphic over `"type"`; parsing goes through a raw
//! intermediate so each variant only retains its own fields.

use serde::{Deserialize, Serialize};

use crate::schemas::{SchemaId, TypeKind};

/// How a primitive property is stored within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum StorageKind {
    /// Self-describing (code, path, value) triple in the sparse region.
    #[default]
    #[serde(rename = "sparse")]
    Sparse = 0,

    /// A fixed-width slot at a layout-computed offset.
    #[serde(rename = "fixed")]
    Fixed = 1,

    /// A variable-length value; laid out in the sparse region.
    #[serde(rename = "variable")]
    Variable = 2,
}

impl StorageKind {
    pub const fn value(&self) -> i32 {
        *self as i32
    }
}

/// A single named column within a schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    /// Documentary only; never affects layout or hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// The logical path of the property, unique within its schema.
    pub path: String,

    #[serde(rename = "type")]
    pub property_type: PropertyType,
}

/// A primitive (leaf) property type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitivePropertyType {
    pub kind: TypeKind,
    pub nullable: bool,
    pub api_type: Option<String>,
    pub storage: StorageKind,
    /// Declared length for fixed-storage variable kinds; zero when unused.
    pub length: u32,
}

#[derive(Debug, Clone)]
pub struct ArrayPropertyType {
    pub nullable: bool,
    pub api_type: Option<String>,
    pub immutable: bool,
    pub items: Option<Box<PropertyType>>,
}

#[derive(Debug, Clone)]
pub struct ObjectPropertyType {
    pub nullable: bool,
    pub api_type: Option<String>,
    pub immutable: bool,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone)]
pub struct MapPropertyType {
    pub nullable: bool,
    pub api_type: Option<String>,
    pub immutable: bool,
    pub keys: Option<Box<PropertyType>>,
    pub values: Option<Box<PropertyType>>,
}

#[derive(Debug, Clone)]
pub struct SetPropertyType {
    pub nullable: bool,
    pub api_type: Option<String>,
    pub immutable: bool,
    pub items: Option<Box<PropertyType>>,
}

/// Tagged properties pair one or more typed values with an API-specific
/// uint8 type code. The code is implicitly in position 0 within the resulting
/// scope and is not listed in `items`.
#[derive(Debug, Clone)]
pub struct TaggedPropertyType {
    pub nullable: bool,
    pub api_type: Option<String>,
    pub immutable: bool,
    pub items: Vec<PropertyType>,
}

impl TaggedPropertyType {
    pub const MIN_TAGGED_ARGUMENTS: usize = 1;
    pub const MAX_TAGGED_ARGUMENTS: usize = 2;
}

#[derive(Debug, Clone)]
pub struct TuplePropertyType {
    pub nullable: bool,
    pub api_type: Option<String>,
    pub immutable: bool,
    pub items: Vec<PropertyType>,
}

/// A reference to a UDT schema, resolved against the enclosing namespace by
/// id when one is given and the name must then agree, otherwise by unique
/// name.
#[derive(Debug, Clone)]
pub struct UdtPropertyType {
    pub nullable: bool,
    pub api_type: Option<String>,
    pub immutable: bool,
    pub name: String,
    pub id: SchemaId,
}

/// The polymorphic type of a property.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PropertyTypeRaw", into = "PropertyTypeRaw")]
pub enum PropertyType {
    Primitive(PrimitivePropertyType),
    Array(ArrayPropertyType),
    Object(ObjectPropertyType),
    Map(MapPropertyType),
    Set(SetPropertyType),
    Tagged(TaggedPropertyType),
    Tuple(TuplePropertyType),
    Udt(UdtPropertyType),
}

impl PropertyType {
    /// The logical type kind of this property type.
    pub fn kind(&self) -> TypeKind {
        match self {
            PropertyType::Primitive(p) => p.kind,
            PropertyType::Array(_) => TypeKind::Array,
            PropertyType::Object(_) => TypeKind::Object,
            PropertyType::Map(_) => TypeKind::Map,
            PropertyType::Set(_) => TypeKind::Set,
            PropertyType::Tagged(_) => TypeKind::Tagged,
            PropertyType::Tuple(_) => TypeKind::Tuple,
            PropertyType::Udt(_) => TypeKind::Schema,
        }
    }

    pub fn nullable(&self) -> bool {
        match self {
            PropertyType::Primitive(p) => p.nullable,
            PropertyType::Array(p) => p.nullable,
            PropertyType::Object(p) => p.nullable,
            PropertyType::Map(p) => p.nullable,
            PropertyType::Set(p) => p.nullable,
            PropertyType::Tagged(p) => p.nullable,
            PropertyType::Tuple(p) => p.nullable,
            PropertyType::Udt(p) => p.nullable,
        }
    }

    pub fn api_type(&self) -> Option<&str> {
        match self {
            PropertyType::Primitive(p) => p.api_type.as_deref(),
            PropertyType::Array(p) => p.api_type.as_deref(),
            PropertyType::Object(p) => p.api_type.as_deref(),
            PropertyType::Map(p) => p.api_type.as_deref(),
            PropertyType::Set(p) => p.api_type.as_deref(),
            PropertyType::Tagged(p) => p.api_type.as_deref(),
            PropertyType::Tuple(p) => p.api_type.as_deref(),
            PropertyType::Udt(p) => p.api_type.as_deref(),
        }
    }

    /// Whether this is a scope type declared immutable. Primitives are never
    /// immutable scopes.
    pub fn immutable(&self) -> bool {
        match self {
            PropertyType::Primitive(_) => false,
            PropertyType::Array(p) => p.immutable,
            PropertyType::Object(p) => p.immutable,
            PropertyType::Map(p) => p.immutable,
            PropertyType::Set(p) => p.immutable,
            PropertyType::Tagged(p) => p.immutable,
            PropertyType::Tuple(p) => p.immutable,
            PropertyType::Udt(p) => p.immutable,
        }
    }

    pub fn is_scope(&self) -> bool {
        !matches!(self, PropertyType::Primitive(_))
    }
}

// JSON bridge. The SDL is polymorphic over "type"; the raw struct is the
// union of all fields any kind can carry.

fn default_nullable() -> bool {
    true
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyTypeRaw {
    #[serde(rename = "type")]
    kind: TypeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_type: Option<String>,

    #[serde(default = "default_nullable")]
    nullable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    storage: Option<StorageKind>,

    #[serde(default)]
    length: u32,

    #[serde(default)]
    immutable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    items: Option<ItemsRaw>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<Vec<Property>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    keys: Option<Box<PropertyType>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Box<PropertyType>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<SchemaId>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ItemsRaw {
    One(Box<PropertyType>),
    Many(Vec<PropertyType>),
}

impl TryFrom<PropertyTypeRaw> for PropertyType {
    type Error = String;

    fn try_from(raw: PropertyTypeRaw) -> Result<Self, Self::Error> {
        let nullable = raw.nullable;
        let api_type = raw.api_type;
        let immutable = raw.immutable;

        let one_item = |items: Option<ItemsRaw>, kind: &str| match items {
            None => Ok(None),
            Some(ItemsRaw::One(item)) => Ok(Some(item)),
            Some(ItemsRaw::Many(_)) => Err(format!("{kind} items must be a single type")),
        };
        let many_items = |items: Option<ItemsRaw>, kind: &str| match items {
            None => Ok(Vec::new()),
            Some(ItemsRaw::Many(items)) => Ok(items),
            Some(ItemsRaw::One(_)) => Err(format!("{kind} items must be a list of types")),
        };

        match raw.kind {
            TypeKind::Array => Ok(PropertyType::Array(ArrayPropertyType {
                nullable,
                api_type,
                immutable,
                items: one_item(raw.items, "array")?,
            })),
            TypeKind::Set => Ok(PropertyType::Set(SetPropertyType {
                nullable,
                api_type,
                immutable,
                items: one_item(raw.items, "set")?,
            })),
            TypeKind::Object => Ok(PropertyType::Object(ObjectPropertyType {
                nullable,
                api_type,
                immutable,
                properties: raw.properties.unwrap_or_default(),
            })),
            TypeKind::Map => Ok(PropertyType::Map(MapPropertyType {
                nullable,
                api_type,
                immutable,
                keys: raw.keys,
                values: raw.values,
            })),
            TypeKind::Tuple => Ok(PropertyType::Tuple(TuplePropertyType {
                nullable,
                api_type,
                immutable,
                items: many_items(raw.items, "tuple")?,
            })),
            TypeKind::Tagged => {
                let items = many_items(raw.items, "tagged")?;
                if !(TaggedPropertyType::MIN_TAGGED_ARGUMENTS
                    ..=TaggedPropertyType::MAX_TAGGED_ARGUMENTS)
                    .contains(&items.len())
                {
                    return Err(format!(
                        "tagged types must carry {} to {} items, not {}",
                        TaggedPropertyType::MIN_TAGGED_ARGUMENTS,
                        TaggedPropertyType::MAX_TAGGED_ARGUMENTS,
                        items.len()
                    ));
                }
                Ok(PropertyType::Tagged(TaggedPropertyType {
                    nullable,
                    api_type,
                    immutable,
                    items,
                }))
            }
            TypeKind::Schema => {
                let name = raw
                    .name
                    .ok_or_else(|| "schema references must carry a name".to_string())?;
                Ok(PropertyType::Udt(UdtPropertyType {
                    nullable,
                    api_type,
                    immutable,
                    name,
                    id: raw.id.unwrap_or(SchemaId::INVALID),
                }))
            }
            kind => Ok(PropertyType::Primitive(PrimitivePropertyType {
                kind,
                nullable,
                api_type,
                storage: raw.storage.unwrap_or_default(),
                length: raw.length,
            })),
        }
    }
}

impl From<PropertyType> for PropertyTypeRaw {
    fn from(property_type: PropertyType) -> Self {
        let mut raw = PropertyTypeRaw {
            kind: property_type.kind(),
            api_type: None,
            nullable: property_type.nullable(),
            storage: None,
            length: 0,
            immutable: property_type.immutable(),
            items: None,
            properties: None,
            keys: None,
            values: None,
            name: None,
            id: None,
        };
        match property_type {
            PropertyType::Primitive(p) => {
                raw.api_type = p.api_type;
                raw.storage = Some(p.storage);
                raw.length = p.length;
            }
            PropertyType::Array(p) => {
                raw.api_type = p.api_type;
                raw.items = p.items.map(ItemsRaw::One);
            }
            PropertyType::Set(p) => {
                raw.api_type = p.api_type;
                raw.items = p.items.map(ItemsRaw::One);
            }
            PropertyType::Object(p) => {
                raw.api_type = p.api_type;
                raw.properties = Some(p.properties);
            }
            PropertyType::Map(p) => {
                raw.api_type = p.api_type;
                raw.keys = p.keys;
                raw.values = p.values;
            }
            PropertyType::Tagged(p) => {
                raw.api_type = p.api_type;
                raw.items = Some(ItemsRaw::Many(p.items));
            }
            PropertyType::Tuple(p) => {
                raw.api_type = p.api_type;
                raw.items = Some(ItemsRaw::Many(p.items));
            }
            PropertyType::Udt(p) => {
                raw.api_type = p.api_type;
                raw.name = Some(p.name);
                if p.id != SchemaId::INVALID {
                    raw.id = Some(p.id);
                }
            }
        }
        raw
    }
}
