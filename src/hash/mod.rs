//! # Hashing Primitives
//!
//! Deterministic 128-bit hashing of primitive values and byte ranges. The
//! `HashCode128` value type is the foundation for schema identity: two
//! schemas with identical structure hash identically, and that hash selects
//! the layout used to decode rows written under it.
//!
//! - `hash_code`: the `HashCode128` two-word value and its 16-byte codec
//! - `murmur3`: Murmur3 x64-128 over byte ranges and typed primitives

pub mod hash_code;
pub mod murmur3;

pub use hash_code::HashCode128;
