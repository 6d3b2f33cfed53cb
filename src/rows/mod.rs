//! # Rows Module
//!
//! The row engine: serialized row storage, cursor-based navigation and
//! mutation, and forward-only reading.
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------+
//! | RowReader / JSON projection |   forward-only projection
//! +-----------------------------+
//! | RowCursor + helpers         |   find / move / skip over scopes
//! +-----------------------------+
//! | RowBuffer                   |   bytes, splicing, typed cells
//! +-----------------------------+
//! | HybridRowHeader / RowResult |   framing and outcome taxonomy
//! +-----------------------------+
//! ```
//!
//! A session opens a `RowBuffer` (fresh via `init` or over existing bytes
//! via `wrap`), takes a root `RowCursor`, and navigates with the stateless
//! helpers in `cursor`. All mutation flows through the buffer; cursors are
//! plain position records.

pub mod buffer;
pub mod cursor;
pub mod header;
pub mod json;
pub mod reader;
pub mod result;

#[cfg(test)]
mod tests;

pub use buffer::{Decimal, RowBuffer, MAX_NESTING_DEPTH};
pub use cursor::RowCursor;
pub use header::{HybridRowHeader, HybridRowVersion};
pub use json::{to_json, to_json_with, JsonSettings};
pub use reader::RowReader;
pub use result::{RowOptions, RowResult};
