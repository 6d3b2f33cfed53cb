//! # Row Reader
//!
//! A forward-only, single-pass projection over one row. At the root it
//! visits the present schematized fixed columns first, then every sparse
//! field in physical order; nested scopes are visited through `read_scope`,
//! which hands a child reader to a closure. Readers never mutate the row.

use crate::layouts::{ColumnStorage, LayoutCode, LayoutColumn};
use crate::rows::cursor::RowCursor;
use crate::rows::{Decimal, RowBuffer, RowResult};

enum ReaderState {
    Fixed,
    Sparse,
    Done,
}

/// Forward-only reader over one scope of a row.
pub struct RowReader<'a, 'r> {
    row: &'a RowBuffer<'r>,
    cursor: RowCursor,
    state: ReaderState,
    column: usize,
    fixed: Option<&'a LayoutColumn>,
}

impl<'a, 'r> RowReader<'a, 'r> {
    /// A reader over the row's root scope.
    pub fn new(row: &'a RowBuffer<'r>) -> RowReader<'a, 'r> {
        RowReader {
            cursor: row.root_cursor(),
            row,
            state: ReaderState::Fixed,
            column: 0,
            fixed: None,
        }
    }

    fn over_scope(row: &'a RowBuffer<'r>, cursor: RowCursor) -> RowReader<'a, 'r> {
        RowReader {
            row,
            cursor,
            state: ReaderState::Sparse,
            column: 0,
            fixed: None,
        }
    }

    /// Advances to the next field. Returns `false` when the scope is
    /// exhausted.
    pub fn read(&mut self) -> bool {
        loop {
            match self.state {
                ReaderState::Fixed => {
                    while let Some(column) = self.row.layout().column_at(self.column) {
                        self.column += 1;
                        if matches!(column.storage, ColumnStorage::Fixed { .. })
                            && self.row.column_present(column)
                        {
                            self.fixed = Some(column);
                            return true;
                        }
                    }
                    self.fixed = None;
                    self.state = ReaderState::Sparse;
                }
                ReaderState::Sparse => {
                    if self.row.sparse_iterator_move_next(&mut self.cursor) {
                        return true;
                    }
                    self.state = ReaderState::Done;
                }
                ReaderState::Done => return false,
            }
        }
    }

    /// Path of the current field, when the enclosing scope is named.
    pub fn path(&self) -> Option<&str> {
        match self.fixed {
            Some(column) => Some(&column.path),
            None => self.cursor.path.as_deref(),
        }
    }

    /// Type code of the current field.
    pub fn cell_code(&self) -> LayoutCode {
        match self.fixed {
            Some(column) => column.type_code,
            None => self.cursor.cell_type,
        }
    }

    /// For a nullable scope under the reader: whether it holds a value.
    /// Every other kind of field trivially has one.
    pub fn has_value(&self) -> bool {
        if self.fixed.is_none() && self.cursor.cell_type.is_nullable_scope() {
            self.row.scope_count(&self.cursor) > 0
        } else {
            true
        }
    }

    /// Recurses into the scope under the reader, handing a child reader to
    /// `visit`. The parent reader resumes after the scope on the next
    /// `read`.
    pub fn read_scope<F>(&mut self, visit: F) -> Result<(), RowResult>
    where
        F: FnOnce(&mut RowReader<'a, 'r>) -> Result<(), RowResult>,
    {
        if self.fixed.is_some() {
            return Err(RowResult::TypeMismatch);
        }
        let child = self.row.read_scope(&self.cursor)?;
        let mut reader = RowReader::over_scope(self.row, child);
        visit(&mut reader)
    }

    pub fn read_bool(&self) -> Result<bool, RowResult> {
        match self.fixed {
            Some(column) => self.row.read_fixed_bool(column),
            None => self.row.read_sparse_bool(&self.cursor),
        }
    }

    pub fn read_null(&self) -> Result<(), RowResult> {
        match self.fixed {
            Some(_) => Err(RowResult::TypeMismatch),
            None => self.row.read_sparse_null(&self.cursor),
        }
    }

    pub fn read_var_int(&self) -> Result<i64, RowResult> {
        match self.fixed {
            Some(_) => Err(RowResult::TypeMismatch),
            None => self.row.read_sparse_var_int(&self.cursor),
        }
    }

    pub fn read_var_uint(&self) -> Result<u64, RowResult> {
        match self.fixed {
            Some(_) => Err(RowResult::TypeMismatch),
            None => self.row.read_sparse_var_uint(&self.cursor),
        }
    }

    pub fn read_utf8(&self) -> Result<&str, RowResult> {
        match self.fixed {
            Some(_) => Err(RowResult::TypeMismatch),
            None => self.row.read_sparse_utf8(&self.cursor),
        }
    }

    pub fn read_binary(&self) -> Result<&[u8], RowResult> {
        match self.fixed {
            Some(_) => Err(RowResult::TypeMismatch),
            None => self.row.read_sparse_binary(&self.cursor),
        }
    }

    pub fn read_decimal(&self) -> Result<Decimal, RowResult> {
        match self.fixed {
            Some(column) => self.row.read_fixed_decimal(column),
            None => self.row.read_sparse_decimal(&self.cursor),
        }
    }

    pub fn read_date_time(&self) -> Result<i64, RowResult> {
        match self.fixed {
            Some(column) => self.row.read_fixed_date_time(column),
            None => self.row.read_sparse_date_time(&self.cursor),
        }
    }

    pub fn read_unix_date_time(&self) -> Result<i64, RowResult> {
        match self.fixed {
            Some(column) => self.row.read_fixed_unix_date_time(column),
            None => self.row.read_sparse_unix_date_time(&self.cursor),
        }
    }

    pub fn read_guid(&self) -> Result<[u8; 16], RowResult> {
        match self.fixed {
            Some(column) => self.row.read_fixed_guid(column),
            None => self.row.read_sparse_guid(&self.cursor),
        }
    }

    pub fn read_float128(&self) -> Result<[u8; 16], RowResult> {
        match self.fixed {
            Some(column) => self.row.read_fixed_float128(column),
            None => self.row.read_sparse_float128(&self.cursor),
        }
    }

    pub fn read_mongodb_object_id(&self) -> Result<[u8; 12], RowResult> {
        match self.fixed {
            Some(_) => Err(RowResult::TypeMismatch),
            None => self.row.read_sparse_mongodb_object_id(&self.cursor),
        }
    }
}

macro_rules! reader_numeric {
    ($(($name:ident, $fixed:ident, $sparse:ident, $ty:ty)),* $(,)?) => {
        impl<'a, 'r> RowReader<'a, 'r> {
            $(
                pub fn $name(&self) -> Result<$ty, RowResult> {
                    match self.fixed {
                        Some(column) => self.row.$fixed(column),
                        None => self.row.$sparse(&self.cursor),
                    }
                }
            )*
        }
    };
}

reader_numeric!(
    (read_i8, read_fixed_i8, read_sparse_i8, i8),
    (read_i16, read_fixed_i16, read_sparse_i16, i16),
    (read_i32, read_fixed_i32, read_sparse_i32, i32),
    (read_i64, read_fixed_i64, read_sparse_i64, i64),
    (read_u8, read_fixed_u8, read_sparse_u8, u8),
    (read_u16, read_fixed_u16, read_sparse_u16, u16),
    (read_u32, read_fixed_u32, read_sparse_u32, u32),
    (read_u64, read_fixed_u64, read_sparse_u64, u64),
    (read_f32, read_fixed_f32, read_sparse_f32, f32),
    (read_f64, read_fixed_f64, read_sparse_f64, f64),
);
