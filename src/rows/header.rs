//! # Row Header
//!
//! Every serialized row begins with a five byte header:
//!
//! ```text
//! +--------------+---------------------+
//! | version (u8) | schema id (i32, LE) |
//! +--------------+---------------------+
//! ```
//!
//! The version byte gates decoding: only recognized values are accepted, and
//! `0x00` is reserved as an explicit invalid marker.

use eyre::{ensure, Result};

use crate::schemas::SchemaId;

/// Version of the row binary format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HybridRowVersion {
    Invalid = 0,
    V1 = 0x81,
}

impl HybridRowVersion {
    /// Size of the serialized version tag in bytes.
    pub const BYTES: usize = 1;

    pub const fn value(&self) -> u8 {
        *self as u8
    }

    pub const fn from_value(value: u8) -> Option<HybridRowVersion> {
        match value {
            0 => Some(HybridRowVersion::Invalid),
            0x81 => Some(HybridRowVersion::V1),
            _ => None,
        }
    }
}

/// The header prefixed to every serialized row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HybridRowHeader {
    pub version: HybridRowVersion,
    pub schema_id: SchemaId,
}

impl HybridRowHeader {
    /// Size of the serialized header in bytes.
    pub const BYTES: usize = HybridRowVersion::BYTES + SchemaId::BYTES;

    pub const fn new(version: HybridRowVersion, schema_id: SchemaId) -> Self {
        Self { version, schema_id }
    }

    /// Decodes a header from the first 5 bytes of `buffer`.
    pub fn decode(buffer: &[u8]) -> Result<Self> {
        ensure!(
            buffer.len() >= Self::BYTES,
            "expected at least {} readable bytes, not {}",
            Self::BYTES,
            buffer.len()
        );
        let version = HybridRowVersion::from_value(buffer[0])
            .ok_or_else(|| eyre::eyre!("unrecognized row version byte {:#04x}", buffer[0]))?;
        ensure!(
            version != HybridRowVersion::Invalid,
            "row version byte is the reserved invalid marker"
        );
        let schema_id = SchemaId(i32::from_le_bytes(buffer[1..5].try_into().unwrap()));
        Ok(Self { version, schema_id })
    }

    /// Encodes the header into the first 5 bytes of `buffer`.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<()> {
        ensure!(
            buffer.len() >= Self::BYTES,
            "expected at least {} writable bytes, not {}",
            Self::BYTES,
            buffer.len()
        );
        buffer[0] = self.version.value();
        buffer[1..5].copy_from_slice(&self.schema_id.value().to_le_bytes());
        Ok(())
    }
}
