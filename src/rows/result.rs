//! # Row Operation Outcomes
//!
//! Expected outcomes of row operations are values, not panics: every
//! fallible read or mutation returns `Result<T, RowResult>` where the error
//! side names the condition. The taxonomy is closed; the numeric values are
//! part of the serialized diagnostics surface and never change.

/// The outcome of a row operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum RowResult {
    Success = 0,
    Failure = 1,
    NotFound = 2,
    Exists = 3,
    TooBig = 4,
    TypeMismatch = 5,
    InsufficientPermissions = 6,
    TypeConstraint = 7,
    InvalidRow = 8,
    InsufficientBuffer = 9,
    /// Caller-supplied outcome for layers above; never produced here.
    Canceled = 10,
}

impl RowResult {
    pub const fn value(&self) -> i32 {
        *self as i32
    }

    pub const fn from_value(value: i32) -> Option<RowResult> {
        use RowResult::*;
        Some(match value {
            0 => Success,
            1 => Failure,
            2 => NotFound,
            3 => Exists,
            4 => TooBig,
            5 => TypeMismatch,
            6 => InsufficientPermissions,
            7 => TypeConstraint,
            8 => InvalidRow,
            9 => InsufficientBuffer,
            10 => Canceled,
            _ => return None,
        })
    }
}

/// Requested semantics of a sparse mutation.
///
/// | Option | Present path | Absent path |
/// |--------|--------------|-------------|
/// | `None` / `Upsert` | overwrite | insert |
/// | `Update` | overwrite | `NotFound` |
/// | `Insert` | `Exists` | insert |
/// | `InsertAt` | shift right, insert (indexed scopes) | insert |
/// | `Delete` | remove | success no-op |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum RowOptions {
    #[default]
    None = 0,
    Update = 1,
    Insert = 2,
    Upsert = 3,
    InsertAt = 4,
    Delete = 5,
}

impl RowOptions {
    pub const fn value(&self) -> i32 {
        *self as i32
    }

    pub const fn from_value(value: i32) -> Option<RowOptions> {
        use RowOptions::*;
        Some(match value {
            0 => None,
            1 => Update,
            2 => Insert,
            3 => Upsert,
            4 => InsertAt,
            5 => Delete,
            _ => return Option::None,
        })
    }
}
