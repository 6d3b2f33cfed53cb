//! # Layout Codes
//!
//! Type codes used in the binary encoding to indicate the formatting of
//! succeeding bytes. The numeric values are part of the wire format and must
//! never change. Booleans carry their value in the code itself
//! (`BooleanFalse` vs `Boolean`); scope codes come in mutable/immutable
//! pairs one apart.

/// Type code used in the binary encoding to indicate the formatting of
/// succeeding bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LayoutCode {
    Invalid = 0,

    Null = 1,
    BooleanFalse = 2,
    Boolean = 3,

    Int8 = 5,
    Int16 = 6,
    Int32 = 7,
    Int64 = 8,
    UInt8 = 9,
    UInt16 = 10,
    UInt32 = 11,
    UInt64 = 12,
    VarInt = 13,
    VarUInt = 14,

    Float32 = 15,
    Float64 = 16,
    Decimal = 17,

    DateTime = 18,
    Guid = 19,

    Utf8 = 20,
    Binary = 21,

    Float128 = 22,
    UnixDateTime = 23,
    MongoDbObjectId = 24,

    ObjectScope = 30,
    ImmutableObjectScope = 31,
    ArrayScope = 32,
    ImmutableArrayScope = 33,
    TypedArrayScope = 34,
    ImmutableTypedArrayScope = 35,
    TupleScope = 36,
    ImmutableTupleScope = 37,
    TypedTupleScope = 38,
    ImmutableTypedTupleScope = 39,
    MapScope = 40,
    ImmutableMapScope = 41,
    TypedMapScope = 42,
    ImmutableTypedMapScope = 43,
    SetScope = 44,
    ImmutableSetScope = 45,
    TypedSetScope = 46,
    ImmutableTypedSetScope = 47,
    NullableScope = 48,
    ImmutableNullableScope = 49,
    TaggedScope = 50,
    ImmutableTaggedScope = 51,
    Tagged2Scope = 52,
    ImmutableTagged2Scope = 53,

    /// Nested row (UDT).
    Schema = 68,
    ImmutableSchema = 69,

    EndScope = 70,
}

impl LayoutCode {
    /// Size of the serialized code in bytes.
    pub const BYTES: usize = 1;

    pub const fn value(&self) -> u8 {
        *self as u8
    }

    /// Maps a wire byte back to its code. Unrecognized values are
    /// unrecoverable decode errors for the caller.
    pub const fn from_value(value: u8) -> Option<LayoutCode> {
        use LayoutCode::*;
        Some(match value {
            0 => Invalid,
            1 => Null,
            2 => BooleanFalse,
            3 => Boolean,
            5 => Int8,
            6 => Int16,
            7 => Int32,
            8 => Int64,
            9 => UInt8,
            10 => UInt16,
            11 => UInt32,
            12 => UInt64,
            13 => VarInt,
            14 => VarUInt,
            15 => Float32,
            16 => Float64,
            17 => Decimal,
            18 => DateTime,
            19 => Guid,
            20 => Utf8,
            21 => Binary,
            22 => Float128,
            23 => UnixDateTime,
            24 => MongoDbObjectId,
            30 => ObjectScope,
            31 => ImmutableObjectScope,
            32 => ArrayScope,
            33 => ImmutableArrayScope,
            34 => TypedArrayScope,
            35 => ImmutableTypedArrayScope,
            36 => TupleScope,
            37 => ImmutableTupleScope,
            38 => TypedTupleScope,
            39 => ImmutableTypedTupleScope,
            40 => MapScope,
            41 => ImmutableMapScope,
            42 => TypedMapScope,
            43 => ImmutableTypedMapScope,
            44 => SetScope,
            45 => ImmutableSetScope,
            46 => TypedSetScope,
            47 => ImmutableTypedSetScope,
            48 => NullableScope,
            49 => ImmutableNullableScope,
            50 => TaggedScope,
            51 => ImmutableTaggedScope,
            52 => Tagged2Scope,
            53 => ImmutableTagged2Scope,
            68 => Schema,
            69 => ImmutableSchema,
            70 => EndScope,
            _ => return None,
        })
    }

    pub const fn is_scope(&self) -> bool {
        let v = self.value();
        (v >= 30 && v <= 53) || v == 68 || v == 69
    }

    /// Whether items of this scope are addressed by ordinal rather than by
    /// path. Object and schema scopes hold named fields; everything else is
    /// positional.
    pub const fn is_indexed_scope(&self) -> bool {
        self.is_scope()
            && !matches!(
                self,
                LayoutCode::ObjectScope
                    | LayoutCode::ImmutableObjectScope
                    | LayoutCode::Schema
                    | LayoutCode::ImmutableSchema
            )
    }

    /// Whether the scope's item count is known upfront. Sized scopes carry a
    /// count header; unsized scopes end with an explicit end-scope marker.
    pub const fn is_sized_scope(&self) -> bool {
        self.is_scope() && !self.is_unsized_scope()
    }

    const fn is_unsized_scope(&self) -> bool {
        matches!(
            self,
            LayoutCode::ObjectScope
                | LayoutCode::ImmutableObjectScope
                | LayoutCode::Schema
                | LayoutCode::ImmutableSchema
        )
    }

    pub const fn is_nullable_scope(&self) -> bool {
        matches!(
            self,
            LayoutCode::NullableScope | LayoutCode::ImmutableNullableScope
        )
    }

    /// Whether this is the read-only member of a scope pair.
    pub const fn is_immutable_variant(&self) -> bool {
        self.is_scope() && self.value() % 2 == 1
    }

    /// The immutable member of this scope pair.
    pub const fn immutable(&self) -> LayoutCode {
        if self.is_scope() && !self.is_immutable_variant() {
            match Self::from_value(self.value() + 1) {
                Some(code) => code,
                None => *self,
            }
        } else {
            *self
        }
    }

    /// The mutable member of this scope pair.
    pub const fn mutable(&self) -> LayoutCode {
        if self.is_immutable_variant() {
            match Self::from_value(self.value() - 1) {
                Some(code) => code,
                None => *self,
            }
        } else {
            *self
        }
    }

    /// The encoded size of a value of this code in the sparse region, when
    /// that size is fixed. Variable-length and scope codes return `None`;
    /// nulls and booleans occupy no value bytes at all.
    pub const fn fixed_size(&self) -> Option<usize> {
        use LayoutCode::*;
        Some(match self {
            Null | BooleanFalse | Boolean => 0,
            Int8 | UInt8 => 1,
            Int16 | UInt16 => 2,
            Int32 | UInt32 | Float32 => 4,
            Int64 | UInt64 | Float64 | DateTime | UnixDateTime => 8,
            Decimal | Guid | Float128 => 16,
            MongoDbObjectId => 12,
            _ => return None,
        })
    }
}
