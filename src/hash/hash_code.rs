//! # HashCode128 - 128-Bit Hash Value
//!
//! An immutable pair of 64-bit words produced by Murmur3 x64-128. Used both
//! as a running accumulator while folding schema structure and as the final
//! schema identity value.
//!
//! ## Wire Encoding
//!
//! ```text
//! +----------------+----------------+
//! | low (u64, LE)  | high (u64, LE) |
//! +----------------+----------------+
//! ```
//!
//! Exactly 16 bytes. `decode` requires at least 16 readable bytes.

use eyre::{ensure, Result};
use serde::{Deserialize, Serialize};

/// A 128-bit hash represented as two 64-bit words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashCode128 {
    low: u64,
    high: u64,
}

impl HashCode128 {
    /// Size of the serialized form in bytes.
    pub const BYTES: usize = 16;

    /// The all-zeros hash.
    pub const ZERO: HashCode128 = HashCode128 { low: 0, high: 0 };

    pub const fn of(low: u64, high: u64) -> Self {
        Self { low, high }
    }

    pub const fn low(&self) -> u64 {
        self.low
    }

    pub const fn high(&self) -> u64 {
        self.high
    }

    /// Decodes a hash from the first 16 bytes of `buffer`.
    pub fn decode(buffer: &[u8]) -> Result<Self> {
        ensure!(
            buffer.len() >= Self::BYTES,
            "expected at least {} readable bytes, not {}",
            Self::BYTES,
            buffer.len()
        );
        let low = u64::from_le_bytes(buffer[0..8].try_into().unwrap());
        let high = u64::from_le_bytes(buffer[8..16].try_into().unwrap());
        Ok(Self { low, high })
    }

    /// Encodes the hash into the first 16 bytes of `buffer`.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<()> {
        ensure!(
            buffer.len() >= Self::BYTES,
            "expected at least {} writable bytes, not {}",
            Self::BYTES,
            buffer.len()
        );
        buffer[0..8].copy_from_slice(&self.low.to_le_bytes());
        buffer[8..16].copy_from_slice(&self.high.to_le_bytes());
        Ok(())
    }

    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        let mut bytes = [0u8; Self::BYTES];
        bytes[0..8].copy_from_slice(&self.low.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.high.to_le_bytes());
        bytes
    }

    /// High word followed by the zero-padded low word.
    pub fn to_hex_string(&self) -> String {
        format!("{:x}{:016x}", self.high, self.low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let hash = HashCode128::of(0x15bf63bf39efc115, 0xb42fb74c54504e9c);
        let bytes = hash.to_bytes();
        assert_eq!(bytes[0], 0x15);
        assert_eq!(bytes[8], 0x9c);
        assert_eq!(HashCode128::decode(&bytes).unwrap(), hash);
    }

    #[test]
    fn decode_rejects_short_buffer() {
        let result = HashCode128::decode(&[0u8; 15]);
        assert!(result.is_err());
    }

    #[test]
    fn encode_rejects_short_buffer() {
        let mut buffer = [0u8; 8];
        assert!(HashCode128::ZERO.encode(&mut buffer).is_err());
    }

    #[test]
    fn hex_string_pads_low_word() {
        let hash = HashCode128::of(0x1, 0xab);
        assert_eq!(hash.to_hex_string(), "ab0000000000000001");
    }
}
