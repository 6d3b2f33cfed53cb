//! # Layout Compiler
//!
//! Compiles a logical `Schema` plus its enclosing `Namespace` into a
//! physical `Layout`:
//!
//! 1. Fixed-storage primitives get sequential byte offsets in declaration
//!    order, after a leading presence bitmask sized to the nullable count.
//! 2. Everything else (variable-length primitives, scopes, UDT references)
//!    becomes a sparse column with no fixed offset; those values are written
//!    to the sparse region as self-describing (code, path, value) triples.
//!
//! Compilation is deterministic and validating: duplicate property paths,
//! dangling key paths, fixed storage on variable-length kinds, and
//! unresolved UDT references are all compile errors. Out-of-namespace
//! schemas are a caller defect, reported immediately rather than as a row
//! result.

use eyre::{bail, ensure, Result};

use crate::layouts::{
    ColumnStorage, Layout, LayoutCode, LayoutColumn, TypeArgument, TypeArgumentList,
};
use crate::schemas::hash::resolve_udt;
use crate::schemas::{Namespace, PropertyType, Schema, StorageKind, TypeKind};

/// Compiles logical schemas into physical layouts.
pub struct LayoutCompiler;

impl LayoutCompiler {
    /// Compiles `schema` against `namespace`.
    ///
    /// Requires `namespace` to contain `schema`.
    pub fn compile(namespace: &Namespace, schema: &Schema) -> Result<Layout> {
        ensure!(
            namespace.contains(schema),
            "schema '{}' is not defined within the namespace",
            schema.name
        );

        let mut columns: Vec<LayoutColumn> = Vec::with_capacity(schema.properties.len());
        let mut slot_offset = 0usize;
        let mut presence_bits = 0usize;

        for property in &schema.properties {
            ensure!(
                columns.iter().all(|c| c.path != property.path),
                "duplicate property path '{}' in schema '{}'",
                property.path,
                schema.name
            );

            let column = Self::compile_property(
                namespace,
                schema,
                &property.path,
                &property.property_type,
                columns.len(),
                &mut slot_offset,
                &mut presence_bits,
            )?;
            columns.push(column);
        }

        Self::validate_key_paths(schema)?;

        let bitmask_bytes = presence_bits.div_ceil(8);
        // Slot offsets were assigned relative to the end of the bitmask;
        // rebase them to the start of the fixed region.
        for column in &mut columns {
            if let ColumnStorage::Fixed { offset, .. } = &mut column.storage {
                *offset += bitmask_bytes;
            }
        }

        Ok(Layout::new(
            schema.name.clone(),
            schema.id,
            columns,
            bitmask_bytes,
            bitmask_bytes + slot_offset,
        ))
    }

    fn compile_property(
        namespace: &Namespace,
        schema: &Schema,
        path: &str,
        property_type: &PropertyType,
        index: usize,
        slot_offset: &mut usize,
        presence_bits: &mut usize,
    ) -> Result<LayoutColumn> {
        match property_type {
            PropertyType::Primitive(p) => {
                let type_code = primitive_code(p.kind).ok_or_else(|| {
                    eyre::eyre!(
                        "property '{}' in schema '{}' has no storable type",
                        path,
                        schema.name
                    )
                })?;

                match p.storage {
                    StorageKind::Fixed => {
                        let Some(size) = fixed_slot_size(type_code) else {
                            bail!(
                                "property '{}' in schema '{}': {:?} values cannot use fixed storage",
                                path,
                                schema.name,
                                p.kind
                            );
                        };
                        let bit = p.nullable.then(|| {
                            let bit = *presence_bits;
                            *presence_bits += 1;
                            bit
                        });
                        let offset = *slot_offset;
                        *slot_offset += size;
                        Ok(LayoutColumn {
                            path: path.to_string(),
                            type_code,
                            storage: ColumnStorage::Fixed { offset, size, bit },
                            nullable: p.nullable,
                            type_args: TypeArgumentList::new(),
                            index,
                        })
                    }
                    StorageKind::Sparse | StorageKind::Variable => Ok(LayoutColumn {
                        path: path.to_string(),
                        type_code,
                        storage: ColumnStorage::Sparse,
                        nullable: p.nullable,
                        type_args: TypeArgumentList::new(),
                        index,
                    }),
                }
            }
            scope => {
                let argument = Self::type_argument_of(namespace, scope)?;
                Ok(LayoutColumn {
                    path: path.to_string(),
                    type_code: argument.code,
                    storage: ColumnStorage::Sparse,
                    nullable: scope.nullable(),
                    type_args: argument.type_args,
                    index,
                })
            }
        }
    }

    /// Builds the `TypeArgument` tree for a property type, resolving UDT
    /// references against the namespace.
    pub fn type_argument_of(
        namespace: &Namespace,
        property_type: &PropertyType,
    ) -> Result<TypeArgument> {
        let immutable = property_type.immutable();
        let scope_code = |code: LayoutCode| if immutable { code.immutable() } else { code };

        match property_type {
            PropertyType::Primitive(p) => {
                let code = primitive_code(p.kind)
                    .ok_or_else(|| eyre::eyre!("{:?} values have no layout code", p.kind))?;
                Ok(TypeArgument::of(code))
            }
            PropertyType::Array(p) => {
                let mut args = Vec::new();
                if let Some(items) = &p.items {
                    args.push(Self::type_argument_of(namespace, items)?);
                }
                Ok(TypeArgument::with_args(
                    scope_code(LayoutCode::ArrayScope),
                    TypeArgumentList::of(args),
                ))
            }
            PropertyType::Set(p) => {
                let mut args = Vec::new();
                if let Some(items) = &p.items {
                    args.push(Self::type_argument_of(namespace, items)?);
                }
                Ok(TypeArgument::with_args(
                    scope_code(LayoutCode::SetScope),
                    TypeArgumentList::of(args),
                ))
            }
            PropertyType::Object(_) => Ok(TypeArgument::of(scope_code(LayoutCode::ObjectScope))),
            PropertyType::Map(p) => {
                let mut args = Vec::new();
                if let Some(keys) = &p.keys {
                    args.push(Self::type_argument_of(namespace, keys)?);
                }
                if let Some(values) = &p.values {
                    args.push(Self::type_argument_of(namespace, values)?);
                }
                Ok(TypeArgument::with_args(
                    scope_code(LayoutCode::MapScope),
                    TypeArgumentList::of(args),
                ))
            }
            PropertyType::Tuple(p) => {
                let args = p
                    .items
                    .iter()
                    .map(|item| Self::type_argument_of(namespace, item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(TypeArgument::with_args(
                    scope_code(LayoutCode::TupleScope),
                    TypeArgumentList::of(args),
                ))
            }
            PropertyType::Tagged(p) => {
                let args = p
                    .items
                    .iter()
                    .map(|item| Self::type_argument_of(namespace, item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(TypeArgument::with_args(
                    scope_code(LayoutCode::TaggedScope),
                    TypeArgumentList::of(args),
                ))
            }
            PropertyType::Udt(p) => {
                let udt = resolve_udt(namespace, &p.name, p.id)?;
                let mut argument = TypeArgument::udt(udt.id);
                argument.code = scope_code(LayoutCode::Schema);
                Ok(argument)
            }
        }
    }

    fn validate_key_paths(schema: &Schema) -> Result<()> {
        let has_path =
            |path: &str| schema.properties.iter().any(|property| property.path == path);

        for key in &schema.partition_keys {
            ensure!(
                has_path(&key.path),
                "partition key path '{}' does not reference a property of schema '{}'",
                key.path,
                schema.name
            );
        }
        for key in &schema.primary_sort_keys {
            ensure!(
                has_path(&key.path),
                "primary sort key path '{}' does not reference a property of schema '{}'",
                key.path,
                schema.name
            );
        }
        for key in &schema.static_keys {
            ensure!(
                has_path(&key.path),
                "static key path '{}' does not reference a property of schema '{}'",
                key.path,
                schema.name
            );
        }
        Ok(())
    }
}

/// Maps a primitive type kind to its layout code. Scope kinds and the
/// non-storable kinds (`any`, `enum`) return `None`.
fn primitive_code(kind: TypeKind) -> Option<LayoutCode> {
    Some(match kind {
        TypeKind::Null => LayoutCode::Null,
        TypeKind::Boolean => LayoutCode::Boolean,
        TypeKind::Int8 => LayoutCode::Int8,
        TypeKind::Int16 => LayoutCode::Int16,
        TypeKind::Int32 => LayoutCode::Int32,
        TypeKind::Int64 => LayoutCode::Int64,
        TypeKind::UInt8 => LayoutCode::UInt8,
        TypeKind::UInt16 => LayoutCode::UInt16,
        TypeKind::UInt32 => LayoutCode::UInt32,
        TypeKind::UInt64 => LayoutCode::UInt64,
        TypeKind::VarInt => LayoutCode::VarInt,
        TypeKind::VarUInt => LayoutCode::VarUInt,
        TypeKind::Float32 => LayoutCode::Float32,
        TypeKind::Float64 => LayoutCode::Float64,
        TypeKind::Float128 => LayoutCode::Float128,
        TypeKind::Decimal => LayoutCode::Decimal,
        TypeKind::DateTime => LayoutCode::DateTime,
        TypeKind::UnixDateTime => LayoutCode::UnixDateTime,
        TypeKind::Guid => LayoutCode::Guid,
        TypeKind::Utf8 => LayoutCode::Utf8,
        TypeKind::Binary => LayoutCode::Binary,
        _ => return None,
    })
}

/// Slot width of a fixed-storage column. Booleans occupy one byte in the
/// fixed region even though their sparse form is carried by the code alone.
fn fixed_slot_size(code: LayoutCode) -> Option<usize> {
    match code {
        LayoutCode::Boolean => Some(1),
        LayoutCode::Null | LayoutCode::BooleanFalse => None,
        other => match other.fixed_size() {
            Some(0) | None => None,
            size => size,
        },
    }
}
