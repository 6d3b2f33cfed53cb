//! # Encoding Module
//!
//! Variable-length integer primitives used throughout the sparse region of a
//! row: path lengths, string and binary lengths, and the `VAR_INT` /
//! `VAR_UINT` value encodings.

pub mod varint;

pub use varint::{
    decode_varint, decode_varuint, encode_varint, encode_varuint, varint_len, varuint_len,
    MAX_VARUINT_BYTES,
};
