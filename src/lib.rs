//! # HybridRow - Schema-Driven Binary Row Serialization
//!
//! HybridRow is a compact, self-describing binary row format supporting
//! in-place sparse and structured field access, cursor-based navigation, and
//! layout compilation from logical schemas. This crate implements the
//! serialization core:
//!
//! - **Zero-copy reads**: getters return references into the row buffer
//! - **In-place mutation**: the buffer is the serialized form at all times,
//!   there is no separate flush step
//! - **Deterministic layouts**: identical schema, identical physical layout,
//!   independent of process or run
//!
//! ## Quick Start
//!
//! ```ignore
//! use hybridrow::layouts::LayoutResolver;
//! use hybridrow::rows::{cursor, HybridRowVersion, RowBuffer, RowOptions};
//! use hybridrow::schemas::Namespace;
//!
//! let ns = Namespace::parse(json).expect("well-formed namespace");
//! let resolver = LayoutResolver::new(ns);
//!
//! let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, schema_id)?;
//! let mut root = row.root_cursor();
//! cursor::find(&mut root, &row, "name");
//! row.write_sparse_utf8(&mut root, "value", RowOptions::Upsert)?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │   JSON Projection (rows::json)          │
//! ├─────────────────────────────────────────┤
//! │   RowReader (rows::reader)              │
//! ├─────────────────────────────────────────┤
//! │   RowCursor ops │ RowBuffer engine      │
//! ├─────────────────┴───────────────────────┤
//! │   Layout / LayoutCompiler / Resolver    │
//! ├─────────────────────────────────────────┤
//! │   Schema model │ SchemaHash │ Murmur3   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Row Wire Format
//!
//! ```text
//! +---------------------+--------------------------------+---------------+
//! | HybridRowHeader     | Fixed region                   | Sparse region |
//! | version u8          | presence bitmask [(B+7)/8]     | (code, path,  |
//! | schema id i32 LE    | fixed slots, declaration order |  value)*      |
//! +---------------------+--------------------------------+---------------+
//! ```
//!
//! ## Module Overview
//!
//! - [`hash`]: Murmur3 x64-128 and the `HashCode128` value type
//! - [`encoding`]: varint/varuint primitives for the sparse region
//! - [`schemas`]: logical schema model, JSON parsing, structural hashing
//! - [`layouts`]: layout codes, compiled layouts, the layout compiler
//! - [`rows`]: row buffer, cursors, forward-only reader, JSON projection

pub mod encoding;
pub mod hash;
pub mod layouts;
pub mod rows;
pub mod schemas;

pub use hash::HashCode128;
pub use layouts::{Layout, LayoutCode, LayoutCompiler, LayoutResolver};
pub use rows::{
    HybridRowHeader, HybridRowVersion, RowBuffer, RowCursor, RowOptions, RowReader, RowResult,
};
pub use schemas::{Namespace, Schema, SchemaId};
