//! # Variable-Length Integer Encoding
//!
//! 7-bit variable-length integer encoding for the sparse region of a row:
//! path lengths, UTF-8 and binary value lengths, and `VAR_INT` / `VAR_UINT`
//! values. This is NOT used for type codes, which are fixed single bytes.
//!
//! ## Encoding Format
//!
//! Each byte carries 7 payload bits; the high bit marks continuation. Values
//! are emitted least-significant group first:
//!
//! | Value Range              | Bytes |
//! |--------------------------|-------|
//! | 0 - 127                  | 1     |
//! | 128 - 16383              | 2     |
//! | 16384 - 2097151          | 3     |
//! | ...                      | ...   |
//! | up to u64::MAX           | 10    |
//!
//! Signed values are zigzag-transformed first (`0 -> 0, -1 -> 1, 1 -> 2`),
//! so small magnitudes of either sign stay short.
//!
//! ## Boundary Values
//!
//! Key boundary values for testing: 0, 127, 128, 16383, 16384, 2097151,
//! 2097152, u32::MAX, u64::MAX.
//!
//! ## Zero-Copy Design
//!
//! All functions operate on byte slices directly:
//! - `encode_varuint` writes to a mutable slice, returns bytes written
//! - `decode_varuint` reads from a slice, returns (value, bytes read)
//! - `varuint_len` computes length without any I/O
//!
//! No heap allocations are performed by any function in this module.
//!
//! ## Error Handling
//!
//! `decode_varuint` returns `eyre::Result` with descriptive error messages:
//! - Empty buffer: "empty buffer for varuint decode"
//! - Truncated encoding: "truncated varuint"
//! - More than 10 bytes: "varuint too long"

use eyre::{bail, Result};

/// Maximum encoded size of a u64 varuint.
pub const MAX_VARUINT_BYTES: usize = 10;

/// Encodes `value` into `buf`, returning the number of bytes written.
///
/// `buf` must have room for the encoded form; use [`varuint_len`] to size it.
pub fn encode_varuint(mut value: u64, buf: &mut [u8]) -> usize {
    let mut written = 0;
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf[written] = byte;
            return written + 1;
        }
        buf[written] = byte | 0x80;
        written += 1;
    }
}

/// Decodes a varuint from the front of `buf`, returning (value, bytes read).
pub fn decode_varuint(buf: &[u8]) -> Result<(u64, usize)> {
    if buf.is_empty() {
        bail!("empty buffer for varuint decode");
    }
    let mut value: u64 = 0;
    let mut shift = 0;
    for (i, &byte) in buf.iter().enumerate() {
        if i >= MAX_VARUINT_BYTES {
            bail!("varuint too long");
        }
        value |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        shift += 7;
    }
    bail!("truncated varuint");
}

/// Number of bytes [`encode_varuint`] produces for `value`.
pub fn varuint_len(value: u64) -> usize {
    if value == 0 {
        return 1;
    }
    (64 - value.leading_zeros() as usize).div_ceil(7)
}

/// Encodes a signed value with the zigzag transform.
pub fn encode_varint(value: i64, buf: &mut [u8]) -> usize {
    encode_varuint(zigzag(value), buf)
}

/// Decodes a zigzag-encoded signed value from the front of `buf`.
pub fn decode_varint(buf: &[u8]) -> Result<(i64, usize)> {
    let (raw, read) = decode_varuint(buf)?;
    Ok((unzigzag(raw), read))
}

/// Number of bytes [`encode_varint`] produces for `value`.
pub fn varint_len(value: i64) -> usize {
    varuint_len(zigzag(value))
}

fn zigzag(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

fn unzigzag(raw: u64) -> i64 {
    ((raw >> 1) as i64) ^ -((raw & 1) as i64)
}
