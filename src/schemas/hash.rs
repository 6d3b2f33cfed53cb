//! # Structural Schema Hashing
//!
//! Recursively folds a schema's structure into one `HashCode128` for
//! compatibility and versioning checks: schema id, type kind, options, every
//! key reference, and every property's type, including UDT schemas
//! transitively. Documentary fields (comments) never participate, so two
//! schemas differing only in comments hash identically.

use eyre::{bail, ensure, Result};

use crate::hash::{murmur3, HashCode128};
use crate::schemas::{
    Namespace, PartitionKey, PrimarySortKey, Property, PropertyType, Schema, SchemaId,
    SchemaOptions, StaticKey,
};

/// Computes logical hashes for schemas defined within a namespace.
pub struct SchemaHash;

impl SchemaHash {
    /// Computes the logical hash for a logical schema.
    ///
    /// Fails when the schema contains a UDT reference that cannot be resolved
    /// unambiguously within `namespace`.
    pub fn compute_hash(
        namespace: &Namespace,
        schema: &Schema,
        seed: HashCode128,
    ) -> Result<HashCode128> {
        let mut hash = seed;

        hash = murmur3::hash128_i32(schema.id.value(), hash);
        hash = murmur3::hash128_i32(schema.type_kind.value(), hash);
        hash = Self::hash_options(schema.options.as_ref(), hash);

        for partition_key in &schema.partition_keys {
            hash = Self::hash_partition_key(partition_key, hash);
        }
        for sort_key in &schema.primary_sort_keys {
            hash = Self::hash_primary_sort_key(sort_key, hash);
        }
        for static_key in &schema.static_keys {
            hash = Self::hash_static_key(static_key, hash);
        }
        for property in &schema.properties {
            hash = Self::hash_property(namespace, property, hash)?;
        }

        Ok(hash)
    }

    fn hash_options(options: Option<&SchemaOptions>, seed: HashCode128) -> HashCode128 {
        let options = options.copied().unwrap_or_default();
        let mut hash = seed;
        hash = murmur3::hash128_bool(options.disallow_unschematized, hash);
        hash = murmur3::hash128_bool(options.enable_property_level_timestamp, hash);
        hash = murmur3::hash128_bool(options.disable_system_prefix, hash);
        hash
    }

    fn hash_property(
        namespace: &Namespace,
        property: &Property,
        seed: HashCode128,
    ) -> Result<HashCode128> {
        let hash = murmur3::hash128_str(&property.path, seed);
        Self::hash_property_type(namespace, &property.property_type, hash)
    }

    fn hash_property_type(
        namespace: &Namespace,
        property_type: &PropertyType,
        seed: HashCode128,
    ) -> Result<HashCode128> {
        let mut hash = seed;

        hash = murmur3::hash128_i32(property_type.kind().value(), hash);
        hash = murmur3::hash128_bool(property_type.nullable(), hash);
        if let Some(api_type) = property_type.api_type() {
            hash = murmur3::hash128_str(api_type, hash);
        }

        match property_type {
            PropertyType::Primitive(p) => {
                hash = murmur3::hash128_i32(p.storage.value(), hash);
                hash = murmur3::hash128_u32(p.length, hash);
                Ok(hash)
            }
            PropertyType::Array(p) => {
                hash = murmur3::hash128_bool(p.immutable, hash);
                if let Some(items) = &p.items {
                    hash = Self::hash_property_type(namespace, items, hash)?;
                }
                Ok(hash)
            }
            PropertyType::Object(p) => {
                hash = murmur3::hash128_bool(p.immutable, hash);
                for nested in &p.properties {
                    hash = Self::hash_property(namespace, nested, hash)?;
                }
                Ok(hash)
            }
            PropertyType::Map(p) => {
                hash = murmur3::hash128_bool(p.immutable, hash);
                if let Some(keys) = &p.keys {
                    hash = Self::hash_property_type(namespace, keys, hash)?;
                }
                if let Some(values) = &p.values {
                    hash = Self::hash_property_type(namespace, values, hash)?;
                }
                Ok(hash)
            }
            PropertyType::Set(p) => {
                hash = murmur3::hash128_bool(p.immutable, hash);
                if let Some(items) = &p.items {
                    hash = Self::hash_property_type(namespace, items, hash)?;
                }
                Ok(hash)
            }
            PropertyType::Tagged(p) => {
                hash = murmur3::hash128_bool(p.immutable, hash);
                for item in &p.items {
                    hash = Self::hash_property_type(namespace, item, hash)?;
                }
                Ok(hash)
            }
            PropertyType::Tuple(p) => {
                hash = murmur3::hash128_bool(p.immutable, hash);
                for item in &p.items {
                    hash = Self::hash_property_type(namespace, item, hash)?;
                }
                Ok(hash)
            }
            PropertyType::Udt(p) => {
                hash = murmur3::hash128_bool(p.immutable, hash);
                let udt = resolve_udt(namespace, &p.name, p.id)?;
                Self::compute_hash(namespace, udt, hash)
            }
        }
    }

    fn hash_partition_key(key: &PartitionKey, seed: HashCode128) -> HashCode128 {
        murmur3::hash128_str(&key.path, seed)
    }

    fn hash_primary_sort_key(key: &PrimarySortKey, seed: HashCode128) -> HashCode128 {
        let hash = murmur3::hash128_str(&key.path, seed);
        murmur3::hash128_i32(key.direction.value(), hash)
    }

    fn hash_static_key(key: &StaticKey, seed: HashCode128) -> HashCode128 {
        murmur3::hash128_str(&key.path, seed)
    }
}

/// Resolves a UDT reference against `namespace` by id when one is given (the
/// name must then agree), otherwise by unique name.
pub fn resolve_udt<'a>(namespace: &'a Namespace, name: &str, id: SchemaId) -> Result<&'a Schema> {
    if id == SchemaId::INVALID {
        let mut matches = namespace.schemas.iter().filter(|s| s.name == name);
        let schema = matches
            .next()
            .ok_or_else(|| eyre::eyre!("cannot resolve schema reference '{name}'"))?;
        ensure!(
            matches.next().is_none(),
            "ambiguous schema reference: '{name}'"
        );
        Ok(schema)
    } else {
        let Some(schema) = namespace.schema_by_id(id) else {
            bail!("cannot resolve schema reference '{name}:{}'", id.value());
        };
        ensure!(
            schema.name == name,
            "ambiguous schema reference: '{name}:{}'",
            id.value()
        );
        Ok(schema)
    }
}
