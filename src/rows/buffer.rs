//! # Row Buffer
//!
//! `RowBuffer` owns the bytes of one row and is its serialized form at all
//! times; there is no separate flush step. The physical shape:
//!
//! ```text
//! +--------+-------------------+-------------+----------------------------+
//! | header | presence bitmask  | fixed slots | sparse region              |
//! | 5 B    | layout-computed   | decl order  | (code, [path], value)*     |
//! +--------+-------------------+-------------+----------------------------+
//! ```
//!
//! Fixed columns live at layout-computed offsets and never move. Sparse
//! fields are self-describing cells: a type code, a varuint-length-prefixed
//! UTF-8 path in named scopes (omitted in indexed scopes), and the value.
//! Sized scopes open with a little-endian `u32` item count; unsized scopes
//! (object, nested schema) end with an `END_SCOPE` marker; the root scope
//! ends at the buffer end.
//!
//! Mutations splice bytes in place, shifting the remainder of the row. No
//! enclosing scope stores a byte length, so a splice only ever updates the
//! immediate scope's item count. Every structural mutation bumps the row
//! generation; the cursor the mutation was made through is refreshed, all
//! other live cursors become stale and fail fast on next use.

use std::sync::Arc;

use eyre::{ensure, Result};
use smallvec::SmallVec;

use crate::encoding::{decode_varint, decode_varuint, encode_varint, encode_varuint, MAX_VARUINT_BYTES};
use crate::layouts::{ColumnStorage, Layout, LayoutCode, LayoutColumn, LayoutResolver};
use crate::rows::cursor::RowCursor;
use crate::rows::{HybridRowHeader, HybridRowVersion, RowOptions, RowResult};
use crate::schemas::SchemaId;

/// Maximum scope nesting depth; exceeding it on scope creation yields
/// `RowResult::TooBig`.
pub const MAX_NESTING_DEPTH: usize = 64;

/// A fixed-point decimal: `mantissa * 10^-scale`. Serialized as 16 bytes
/// (little-endian mantissa, scale byte, 7 bytes of padding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decimal {
    pub mantissa: i64,
    pub scale: u8,
}

/// One row: owned bytes plus the compiled layout they were written under.
pub struct RowBuffer<'r> {
    data: Vec<u8>,
    header: HybridRowHeader,
    layout: Arc<Layout>,
    resolver: &'r LayoutResolver,
    generation: u64,
}

impl<'r> RowBuffer<'r> {
    /// Creates an empty row: header, zeroed presence bitmask, zeroed fixed
    /// slots, empty sparse region.
    pub fn init(
        resolver: &'r LayoutResolver,
        version: HybridRowVersion,
        schema_id: SchemaId,
    ) -> Result<RowBuffer<'r>> {
        ensure!(
            version != HybridRowVersion::Invalid,
            "cannot initialize a row with the invalid version marker"
        );
        let layout = resolver.resolve(schema_id)?;
        let header = HybridRowHeader::new(version, schema_id);
        let mut data = vec![0u8; HybridRowHeader::BYTES + layout.fixed_size()];
        header.encode(&mut data)?;
        Ok(RowBuffer {
            data,
            header,
            layout,
            resolver,
            generation: 0,
        })
    }

    /// Opens an existing serialized row, validating its header and resolving
    /// its layout by schema id.
    pub fn wrap(data: Vec<u8>, resolver: &'r LayoutResolver) -> Result<RowBuffer<'r>> {
        let header = HybridRowHeader::decode(&data)?;
        let layout = resolver.resolve(header.schema_id)?;
        ensure!(
            data.len() >= HybridRowHeader::BYTES + layout.fixed_size(),
            "row of {} bytes is shorter than its {} byte fixed region",
            data.len(),
            HybridRowHeader::BYTES + layout.fixed_size()
        );
        Ok(RowBuffer {
            data,
            header,
            layout,
            resolver,
            generation: 0,
        })
    }

    pub fn header(&self) -> HybridRowHeader {
        self.header
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn resolver(&self) -> &LayoutResolver {
        self.resolver
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The serialized row.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn sparse_start(&self) -> usize {
        HybridRowHeader::BYTES + self.layout.fixed_size()
    }

    /// A fresh cursor over the row's root scope.
    pub fn root_cursor(&self) -> RowCursor {
        let start = self.sparse_start();
        RowCursor {
            scope_type: LayoutCode::Schema,
            cell_type: LayoutCode::Invalid,
            index: -1,
            start,
            meta_offset: start,
            value_offset: start,
            end_offset: start,
            count: 0,
            exists: false,
            immutable: false,
            path: None,
            path_token: None,
            generation: self.generation,
            depth: 0,
            is_root: true,
        }
    }

    fn check_generation(&self, cursor: &RowCursor) {
        assert!(
            cursor.generation == self.generation,
            "stale cursor: row is at generation {}, cursor was derived at {}",
            self.generation,
            cursor.generation
        );
    }

    // ---- fixed region ----------------------------------------------------

    fn presence(&self, bit: usize) -> bool {
        let byte = HybridRowHeader::BYTES + bit / 8;
        self.data[byte] & (1 << (bit % 8)) != 0
    }

    fn set_presence(&mut self, bit: usize) {
        let byte = HybridRowHeader::BYTES + bit / 8;
        self.data[byte] |= 1 << (bit % 8);
    }

    fn clear_presence(&mut self, bit: usize) {
        let byte = HybridRowHeader::BYTES + bit / 8;
        self.data[byte] &= !(1 << (bit % 8));
    }

    /// Whether a fixed column currently holds a value. Non-nullable fixed
    /// columns are always present; sparse columns are never "present" in the
    /// fixed region.
    pub fn column_present(&self, column: &LayoutColumn) -> bool {
        match column.storage {
            ColumnStorage::Fixed { bit: None, .. } => true,
            ColumnStorage::Fixed { bit: Some(bit), .. } => self.presence(bit),
            ColumnStorage::Sparse => false,
        }
    }

    /// Validates a fixed read and returns the absolute slot offset.
    fn fixed_readable(&self, column: &LayoutColumn, code: LayoutCode) -> Result<usize, RowResult> {
        let ColumnStorage::Fixed { offset, bit, .. } = column.storage else {
            panic!("column '{}' is not a fixed column", column.path);
        };
        if column.type_code != code {
            return Err(RowResult::TypeMismatch);
        }
        if let Some(bit) = bit {
            if !self.presence(bit) {
                return Err(RowResult::NotFound);
            }
        }
        Ok(HybridRowHeader::BYTES + offset)
    }

    /// Validates a fixed write, marks the column present, and returns the
    /// absolute slot offset. Fixed writes never shift bytes, so they do not
    /// invalidate cursors.
    fn fixed_writable(&mut self, column: &LayoutColumn, code: LayoutCode) -> Result<usize, RowResult> {
        let ColumnStorage::Fixed { offset, bit, .. } = column.storage else {
            panic!("column '{}' is not a fixed column", column.path);
        };
        if column.type_code != code {
            return Err(RowResult::TypeMismatch);
        }
        if let Some(bit) = bit {
            self.set_presence(bit);
        }
        Ok(HybridRowHeader::BYTES + offset)
    }

    pub fn read_fixed_bool(&self, column: &LayoutColumn) -> Result<bool, RowResult> {
        let offset = self.fixed_readable(column, LayoutCode::Boolean)?;
        Ok(self.data[offset] != 0)
    }

    pub fn write_fixed_bool(&mut self, column: &LayoutColumn, value: bool) -> Result<(), RowResult> {
        let offset = self.fixed_writable(column, LayoutCode::Boolean)?;
        self.data[offset] = value as u8;
        Ok(())
    }

    pub fn read_fixed_decimal(&self, column: &LayoutColumn) -> Result<Decimal, RowResult> {
        let offset = self.fixed_readable(column, LayoutCode::Decimal)?;
        Ok(self.decimal_at(offset))
    }

    pub fn write_fixed_decimal(&mut self, column: &LayoutColumn, value: Decimal) -> Result<(), RowResult> {
        let offset = self.fixed_writable(column, LayoutCode::Decimal)?;
        let bytes = decimal_bytes(value);
        self.data[offset..offset + 16].copy_from_slice(&bytes);
        Ok(())
    }

    pub fn read_fixed_guid(&self, column: &LayoutColumn) -> Result<[u8; 16], RowResult> {
        let offset = self.fixed_readable(column, LayoutCode::Guid)?;
        Ok(self.data[offset..offset + 16].try_into().unwrap())
    }

    pub fn write_fixed_guid(&mut self, column: &LayoutColumn, value: [u8; 16]) -> Result<(), RowResult> {
        let offset = self.fixed_writable(column, LayoutCode::Guid)?;
        self.data[offset..offset + 16].copy_from_slice(&value);
        Ok(())
    }

    pub fn read_fixed_float128(&self, column: &LayoutColumn) -> Result<[u8; 16], RowResult> {
        let offset = self.fixed_readable(column, LayoutCode::Float128)?;
        Ok(self.data[offset..offset + 16].try_into().unwrap())
    }

    pub fn write_fixed_float128(&mut self, column: &LayoutColumn, value: [u8; 16]) -> Result<(), RowResult> {
        let offset = self.fixed_writable(column, LayoutCode::Float128)?;
        self.data[offset..offset + 16].copy_from_slice(&value);
        Ok(())
    }

    /// Deletes a nullable fixed column's value. Deleting a non-nullable
    /// fixed column violates the schema and yields `TypeConstraint`.
    pub fn delete_fixed(&mut self, column: &LayoutColumn) -> Result<(), RowResult> {
        let ColumnStorage::Fixed { offset, size, bit } = column.storage else {
            panic!("column '{}' is not a fixed column", column.path);
        };
        let Some(bit) = bit else {
            return Err(RowResult::TypeConstraint);
        };
        self.clear_presence(bit);
        let offset = HybridRowHeader::BYTES + offset;
        self.data[offset..offset + size].fill(0);
        Ok(())
    }

    // ---- sparse iteration ------------------------------------------------

    /// Advances `cursor` to the next item of its scope. Returns `false` on
    /// exhaustion, leaving the cursor at the scope's insertion point.
    pub fn sparse_iterator_move_next(&self, cursor: &mut RowCursor) -> bool {
        self.check_generation(cursor);
        let next = if cursor.index < 0 {
            cursor.content_start()
        } else {
            cursor.end_offset
        };
        cursor.path = None;
        cursor.path_token = None;

        let exhausted = if !cursor.is_root && cursor.scope_type.is_sized_scope() {
            (cursor.index + 1) as u32 >= cursor.count
        } else if cursor.is_root {
            next >= self.data.len()
        } else {
            self.code_at(next) == LayoutCode::EndScope
        };
        if exhausted {
            cursor.index += 1;
            cursor.exists = false;
            cursor.cell_type = LayoutCode::Invalid;
            cursor.meta_offset = next;
            cursor.value_offset = next;
            cursor.end_offset = next;
            return false;
        }

        self.position(cursor, next);
        true
    }

    /// Positions the cursor on the cell whose code byte is at `meta`.
    fn position(&self, cursor: &mut RowCursor, meta: usize) {
        let code = self.code_at(meta);
        let mut offset = meta + LayoutCode::BYTES;
        if !cursor.scope_type.is_indexed_scope() {
            let (len, read) = match decode_varuint(&self.data[offset..]) {
                Ok(decoded) => decoded,
                Err(_) => panic!("invalid row: truncated path length at offset {offset}"),
            };
            let path_start = offset + read;
            let path_end = path_start + len as usize;
            let path = match std::str::from_utf8(&self.data[path_start..path_end]) {
                Ok(path) => path,
                Err(_) => panic!("invalid row: path at offset {path_start} is not UTF-8"),
            };
            cursor.path_token = if cursor.is_root {
                self.layout.token(path)
            } else {
                None
            };
            cursor.path = Some(path.to_string());
            offset = path_end;
        }
        cursor.cell_type = code;
        cursor.meta_offset = meta;
        cursor.value_offset = offset;
        cursor.end_offset = offset + self.value_len(code, offset);
        cursor.index += 1;
        cursor.exists = true;
    }

    fn code_at(&self, offset: usize) -> LayoutCode {
        let Some(&byte) = self.data.get(offset) else {
            panic!("invalid row: truncated at offset {offset}");
        };
        match LayoutCode::from_value(byte) {
            Some(code) => code,
            None => panic!("invalid row: unrecognized type code {byte:#04x} at offset {offset}"),
        }
    }

    /// Length in bytes of a value of `code` starting at `offset`. Scope
    /// values are walked recursively; the walk is what lets iteration step
    /// over a scope without entering it.
    fn value_len(&self, code: LayoutCode, offset: usize) -> usize {
        if let Some(size) = code.fixed_size() {
            return size;
        }
        match code {
            LayoutCode::VarInt => match decode_varint(&self.data[offset..]) {
                Ok((_, read)) => read,
                Err(_) => panic!("invalid row: truncated varint at offset {offset}"),
            },
            LayoutCode::VarUInt => match decode_varuint(&self.data[offset..]) {
                Ok((_, read)) => read,
                Err(_) => panic!("invalid row: truncated varuint at offset {offset}"),
            },
            LayoutCode::Utf8 | LayoutCode::Binary => match decode_varuint(&self.data[offset..]) {
                Ok((len, read)) => read + len as usize,
                Err(_) => panic!("invalid row: truncated length prefix at offset {offset}"),
            },
            code if code.is_sized_scope() => {
                let count =
                    u32::from_le_bytes(self.data[offset..offset + 4].try_into().unwrap());
                let mut pos = offset + 4;
                for _ in 0..count {
                    let item_code = self.code_at(pos);
                    pos += LayoutCode::BYTES;
                    pos += self.value_len(item_code, pos);
                }
                pos - offset
            }
            code if code.is_scope() => {
                // Unsized scope: named fields up to the end marker.
                let mut pos = offset;
                loop {
                    let item_code = self.code_at(pos);
                    pos += LayoutCode::BYTES;
                    if item_code == LayoutCode::EndScope {
                        break;
                    }
                    let (len, read) = match decode_varuint(&self.data[pos..]) {
                        Ok(decoded) => decoded,
                        Err(_) => panic!("invalid row: truncated path length at offset {pos}"),
                    };
                    pos += read + len as usize;
                    pos += self.value_len(item_code, pos);
                }
                pos - offset
            }
            code => panic!("invalid row: value of type {code:?} at offset {offset}"),
        }
    }

    /// Item count of the sized scope under the cursor.
    pub(crate) fn scope_count(&self, edit: &RowCursor) -> u32 {
        u32::from_le_bytes(
            self.data[edit.value_offset..edit.value_offset + 4]
                .try_into()
                .unwrap(),
        )
    }

    // ---- sparse reads ----------------------------------------------------

    fn sparse_readable(&self, cursor: &RowCursor, code: LayoutCode) -> Result<usize, RowResult> {
        self.check_generation(cursor);
        if !cursor.exists {
            return Err(RowResult::NotFound);
        }
        if cursor.cell_type != code {
            return Err(RowResult::TypeMismatch);
        }
        Ok(cursor.value_offset)
    }

    pub fn read_sparse_null(&self, cursor: &RowCursor) -> Result<(), RowResult> {
        self.sparse_readable(cursor, LayoutCode::Null)?;
        Ok(())
    }

    pub fn read_sparse_bool(&self, cursor: &RowCursor) -> Result<bool, RowResult> {
        self.check_generation(cursor);
        if !cursor.exists {
            return Err(RowResult::NotFound);
        }
        match cursor.cell_type {
            LayoutCode::Boolean => Ok(true),
            LayoutCode::BooleanFalse => Ok(false),
            _ => Err(RowResult::TypeMismatch),
        }
    }

    pub fn read_sparse_var_int(&self, cursor: &RowCursor) -> Result<i64, RowResult> {
        let offset = self.sparse_readable(cursor, LayoutCode::VarInt)?;
        let (value, _) = decode_varint(&self.data[offset..]).map_err(|_| RowResult::InvalidRow)?;
        Ok(value)
    }

    pub fn read_sparse_var_uint(&self, cursor: &RowCursor) -> Result<u64, RowResult> {
        let offset = self.sparse_readable(cursor, LayoutCode::VarUInt)?;
        let (value, _) = decode_varuint(&self.data[offset..]).map_err(|_| RowResult::InvalidRow)?;
        Ok(value)
    }

    pub fn read_sparse_utf8(&self, cursor: &RowCursor) -> Result<&str, RowResult> {
        let offset = self.sparse_readable(cursor, LayoutCode::Utf8)?;
        let (len, read) =
            decode_varuint(&self.data[offset..]).map_err(|_| RowResult::InvalidRow)?;
        let start = offset + read;
        std::str::from_utf8(&self.data[start..start + len as usize])
            .map_err(|_| RowResult::InvalidRow)
    }

    pub fn read_sparse_binary(&self, cursor: &RowCursor) -> Result<&[u8], RowResult> {
        let offset = self.sparse_readable(cursor, LayoutCode::Binary)?;
        let (len, read) =
            decode_varuint(&self.data[offset..]).map_err(|_| RowResult::InvalidRow)?;
        let start = offset + read;
        Ok(&self.data[start..start + len as usize])
    }

    pub fn read_sparse_decimal(&self, cursor: &RowCursor) -> Result<Decimal, RowResult> {
        let offset = self.sparse_readable(cursor, LayoutCode::Decimal)?;
        Ok(self.decimal_at(offset))
    }

    pub fn read_sparse_date_time(&self, cursor: &RowCursor) -> Result<i64, RowResult> {
        let offset = self.sparse_readable(cursor, LayoutCode::DateTime)?;
        Ok(i64::from_le_bytes(self.data[offset..offset + 8].try_into().unwrap()))
    }

    pub fn read_sparse_unix_date_time(&self, cursor: &RowCursor) -> Result<i64, RowResult> {
        let offset = self.sparse_readable(cursor, LayoutCode::UnixDateTime)?;
        Ok(i64::from_le_bytes(self.data[offset..offset + 8].try_into().unwrap()))
    }

    pub fn read_sparse_guid(&self, cursor: &RowCursor) -> Result<[u8; 16], RowResult> {
        let offset = self.sparse_readable(cursor, LayoutCode::Guid)?;
        Ok(self.data[offset..offset + 16].try_into().unwrap())
    }

    pub fn read_sparse_float128(&self, cursor: &RowCursor) -> Result<[u8; 16], RowResult> {
        let offset = self.sparse_readable(cursor, LayoutCode::Float128)?;
        Ok(self.data[offset..offset + 16].try_into().unwrap())
    }

    pub fn read_sparse_mongodb_object_id(&self, cursor: &RowCursor) -> Result<[u8; 12], RowResult> {
        let offset = self.sparse_readable(cursor, LayoutCode::MongoDbObjectId)?;
        Ok(self.data[offset..offset + 12].try_into().unwrap())
    }

    /// Path of the sparse field under the cursor, in named scopes.
    pub fn read_sparse_path<'a>(&self, cursor: &'a RowCursor) -> Option<&'a str> {
        cursor.path.as_deref()
    }

    fn decimal_at(&self, offset: usize) -> Decimal {
        Decimal {
            mantissa: i64::from_le_bytes(self.data[offset..offset + 8].try_into().unwrap()),
            scale: self.data[offset + 8],
        }
    }

    // ---- sparse writes ---------------------------------------------------

    /// Writes one sparse cell at the cursor, applying the requested mutation
    /// semantics. The cursor is refreshed to the written cell; every other
    /// live cursor over this row becomes stale.
    fn write_sparse_cell(
        &mut self,
        edit: &mut RowCursor,
        code: LayoutCode,
        value: &[u8],
        options: RowOptions,
    ) -> Result<(), RowResult> {
        self.check_generation(edit);
        if edit.immutable {
            return Err(RowResult::InsufficientPermissions);
        }
        match options {
            RowOptions::Insert if edit.exists => return Err(RowResult::Exists),
            RowOptions::Update if !edit.exists => return Err(RowResult::NotFound),
            RowOptions::Delete => return self.delete_sparse(edit),
            _ => {}
        }

        let indexed = !edit.is_root && edit.scope_type.is_indexed_scope();
        let mut cell: SmallVec<[u8; 32]> = SmallVec::new();
        cell.push(code.value());
        if !indexed {
            let path = edit
                .path
                .as_deref()
                .unwrap_or_else(|| panic!("cursor carries no path to write under"));
            let mut prefix = [0u8; MAX_VARUINT_BYTES];
            let written = encode_varuint(path.len() as u64, &mut prefix);
            cell.extend_from_slice(&prefix[..written]);
            cell.extend_from_slice(path.as_bytes());
        }
        let value_offset_in_cell = cell.len();
        cell.extend_from_slice(value);

        let shift_right = options == RowOptions::InsertAt && indexed;
        let inserting = !edit.exists || shift_right;
        let removed = if inserting {
            0
        } else {
            edit.end_offset - edit.meta_offset
        };
        self.data
            .splice(edit.meta_offset..edit.meta_offset + removed, cell.iter().copied());

        if inserting && !edit.is_root && edit.scope_type.is_sized_scope() {
            let count = edit.count + 1;
            self.data[edit.start..edit.start + 4].copy_from_slice(&count.to_le_bytes());
            edit.count = count;
        }

        self.generation += 1;
        edit.generation = self.generation;
        edit.cell_type = code;
        edit.exists = true;
        edit.value_offset = edit.meta_offset + value_offset_in_cell;
        edit.end_offset = edit.meta_offset + cell.len();
        if edit.index < 0 {
            edit.index = 0;
        }
        Ok(())
    }

    /// Removes the cell under the cursor. Removing an absent cell is a
    /// success no-op.
    pub fn delete_sparse(&mut self, edit: &mut RowCursor) -> Result<(), RowResult> {
        self.check_generation(edit);
        if edit.immutable {
            return Err(RowResult::InsufficientPermissions);
        }
        if !edit.exists {
            return Ok(());
        }
        self.data.splice(edit.meta_offset..edit.end_offset, std::iter::empty());
        if !edit.is_root && edit.scope_type.is_sized_scope() {
            let count = edit.count - 1;
            self.data[edit.start..edit.start + 4].copy_from_slice(&count.to_le_bytes());
            edit.count = count;
        }
        self.generation += 1;
        edit.generation = self.generation;
        edit.exists = false;
        edit.cell_type = LayoutCode::Invalid;
        edit.value_offset = edit.meta_offset;
        edit.end_offset = edit.meta_offset;
        // The next item (if any) shifted into this slot; step back so the
        // next advance lands on it with the right ordinal.
        edit.index -= 1;
        Ok(())
    }

    pub fn write_sparse_null(
        &mut self,
        edit: &mut RowCursor,
        options: RowOptions,
    ) -> Result<(), RowResult> {
        self.write_sparse_cell(edit, LayoutCode::Null, &[], options)
    }

    pub fn write_sparse_bool(
        &mut self,
        edit: &mut RowCursor,
        value: bool,
        options: RowOptions,
    ) -> Result<(), RowResult> {
        let code = if value {
            LayoutCode::Boolean
        } else {
            LayoutCode::BooleanFalse
        };
        self.write_sparse_cell(edit, code, &[], options)
    }

    pub fn write_sparse_var_int(
        &mut self,
        edit: &mut RowCursor,
        value: i64,
        options: RowOptions,
    ) -> Result<(), RowResult> {
        let mut buf = [0u8; MAX_VARUINT_BYTES];
        let written = encode_varint(value, &mut buf);
        self.write_sparse_cell(edit, LayoutCode::VarInt, &buf[..written], options)
    }

    pub fn write_sparse_var_uint(
        &mut self,
        edit: &mut RowCursor,
        value: u64,
        options: RowOptions,
    ) -> Result<(), RowResult> {
        let mut buf = [0u8; MAX_VARUINT_BYTES];
        let written = encode_varuint(value, &mut buf);
        self.write_sparse_cell(edit, LayoutCode::VarUInt, &buf[..written], options)
    }

    pub fn write_sparse_utf8(
        &mut self,
        edit: &mut RowCursor,
        value: &str,
        options: RowOptions,
    ) -> Result<(), RowResult> {
        let mut buf: SmallVec<[u8; 32]> = SmallVec::new();
        let mut prefix = [0u8; MAX_VARUINT_BYTES];
        let written = encode_varuint(value.len() as u64, &mut prefix);
        buf.extend_from_slice(&prefix[..written]);
        buf.extend_from_slice(value.as_bytes());
        self.write_sparse_cell(edit, LayoutCode::Utf8, &buf, options)
    }

    pub fn write_sparse_binary(
        &mut self,
        edit: &mut RowCursor,
        value: &[u8],
        options: RowOptions,
    ) -> Result<(), RowResult> {
        let mut buf: SmallVec<[u8; 32]> = SmallVec::new();
        let mut prefix = [0u8; MAX_VARUINT_BYTES];
        let written = encode_varuint(value.len() as u64, &mut prefix);
        buf.extend_from_slice(&prefix[..written]);
        buf.extend_from_slice(value);
        self.write_sparse_cell(edit, LayoutCode::Binary, &buf, options)
    }

    pub fn write_sparse_decimal(
        &mut self,
        edit: &mut RowCursor,
        value: Decimal,
        options: RowOptions,
    ) -> Result<(), RowResult> {
        self.write_sparse_cell(edit, LayoutCode::Decimal, &decimal_bytes(value), options)
    }

    pub fn write_sparse_date_time(
        &mut self,
        edit: &mut RowCursor,
        value: i64,
        options: RowOptions,
    ) -> Result<(), RowResult> {
        self.write_sparse_cell(edit, LayoutCode::DateTime, &value.to_le_bytes(), options)
    }

    pub fn write_sparse_unix_date_time(
        &mut self,
        edit: &mut RowCursor,
        value: i64,
        options: RowOptions,
    ) -> Result<(), RowResult> {
        self.write_sparse_cell(edit, LayoutCode::UnixDateTime, &value.to_le_bytes(), options)
    }

    pub fn write_sparse_guid(
        &mut self,
        edit: &mut RowCursor,
        value: [u8; 16],
        options: RowOptions,
    ) -> Result<(), RowResult> {
        self.write_sparse_cell(edit, LayoutCode::Guid, &value, options)
    }

    pub fn write_sparse_float128(
        &mut self,
        edit: &mut RowCursor,
        value: [u8; 16],
        options: RowOptions,
    ) -> Result<(), RowResult> {
        self.write_sparse_cell(edit, LayoutCode::Float128, &value, options)
    }

    pub fn write_sparse_mongodb_object_id(
        &mut self,
        edit: &mut RowCursor,
        value: [u8; 12],
        options: RowOptions,
    ) -> Result<(), RowResult> {
        self.write_sparse_cell(edit, LayoutCode::MongoDbObjectId, &value, options)
    }

    // ---- scopes ----------------------------------------------------------

    /// Writes an empty scope of `scope_code` at the cursor and returns a
    /// child cursor positioned to fill it.
    pub fn write_scope(
        &mut self,
        edit: &mut RowCursor,
        scope_code: LayoutCode,
        options: RowOptions,
    ) -> Result<RowCursor, RowResult> {
        assert!(scope_code.is_scope(), "{scope_code:?} is not a scope code");
        assert!(
            options != RowOptions::Delete,
            "scopes are removed through delete_sparse"
        );
        if edit.depth + 1 > MAX_NESTING_DEPTH {
            return Err(RowResult::TooBig);
        }
        if scope_code.is_sized_scope() {
            self.write_sparse_cell(edit, scope_code, &0u32.to_le_bytes(), options)?;
        } else {
            self.write_sparse_cell(edit, scope_code, &[LayoutCode::EndScope.value()], options)?;
        }
        Ok(self.child_cursor(edit))
    }

    /// Opens the scope under the cursor for reading.
    pub fn read_scope(&self, edit: &RowCursor) -> Result<RowCursor, RowResult> {
        self.check_generation(edit);
        if !edit.exists {
            return Err(RowResult::NotFound);
        }
        if !edit.cell_type.is_scope() {
            return Err(RowResult::TypeMismatch);
        }
        if edit.depth + 1 > MAX_NESTING_DEPTH {
            return Err(RowResult::TooBig);
        }
        Ok(self.child_cursor(edit))
    }

    fn child_cursor(&self, edit: &RowCursor) -> RowCursor {
        let scope = edit.cell_type;
        let count = if scope.is_sized_scope() {
            self.scope_count(edit)
        } else {
            0
        };
        // Content begins past the count header of sized scopes, so a write
        // through a never-advanced child cursor splices in the right place.
        let content = if scope.is_sized_scope() {
            edit.value_offset + 4
        } else {
            edit.value_offset
        };
        RowCursor {
            scope_type: scope,
            cell_type: LayoutCode::Invalid,
            index: -1,
            start: edit.value_offset,
            meta_offset: content,
            value_offset: content,
            end_offset: content,
            count,
            exists: false,
            immutable: edit.immutable || scope.is_immutable_variant(),
            path: None,
            path_token: None,
            generation: self.generation,
            depth: edit.depth + 1,
            is_root: false,
        }
    }
}

macro_rules! numeric_accessors {
    ($(($read_fixed:ident, $write_fixed:ident, $read_sparse:ident, $write_sparse:ident, $ty:ty, $code:expr)),* $(,)?) => {
        impl<'r> RowBuffer<'r> {
            $(
                pub fn $read_fixed(&self, column: &LayoutColumn) -> Result<$ty, RowResult> {
                    let offset = self.fixed_readable(column, $code)?;
                    let size = std::mem::size_of::<$ty>();
                    Ok(<$ty>::from_le_bytes(self.data[offset..offset + size].try_into().unwrap()))
                }

                pub fn $write_fixed(&mut self, column: &LayoutColumn, value: $ty) -> Result<(), RowResult> {
                    let offset = self.fixed_writable(column, $code)?;
                    let size = std::mem::size_of::<$ty>();
                    self.data[offset..offset + size].copy_from_slice(&value.to_le_bytes());
                    Ok(())
                }

                pub fn $read_sparse(&self, cursor: &RowCursor) -> Result<$ty, RowResult> {
                    let offset = self.sparse_readable(cursor, $code)?;
                    let size = std::mem::size_of::<$ty>();
                    Ok(<$ty>::from_le_bytes(self.data[offset..offset + size].try_into().unwrap()))
                }

                pub fn $write_sparse(
                    &mut self,
                    cursor: &mut RowCursor,
                    value: $ty,
                    options: RowOptions,
                ) -> Result<(), RowResult> {
                    self.write_sparse_cell(cursor, $code, &value.to_le_bytes(), options)
                }
            )*
        }
    };
}

numeric_accessors!(
    (read_fixed_i8, write_fixed_i8, read_sparse_i8, write_sparse_i8, i8, LayoutCode::Int8),
    (read_fixed_i16, write_fixed_i16, read_sparse_i16, write_sparse_i16, i16, LayoutCode::Int16),
    (read_fixed_i32, write_fixed_i32, read_sparse_i32, write_sparse_i32, i32, LayoutCode::Int32),
    (read_fixed_i64, write_fixed_i64, read_sparse_i64, write_sparse_i64, i64, LayoutCode::Int64),
    (read_fixed_u8, write_fixed_u8, read_sparse_u8, write_sparse_u8, u8, LayoutCode::UInt8),
    (read_fixed_u16, write_fixed_u16, read_sparse_u16, write_sparse_u16, u16, LayoutCode::UInt16),
    (read_fixed_u32, write_fixed_u32, read_sparse_u32, write_sparse_u32, u32, LayoutCode::UInt32),
    (read_fixed_u64, write_fixed_u64, read_sparse_u64, write_sparse_u64, u64, LayoutCode::UInt64),
    (read_fixed_f32, write_fixed_f32, read_sparse_f32, write_sparse_f32, f32, LayoutCode::Float32),
    (read_fixed_f64, write_fixed_f64, read_sparse_f64, write_sparse_f64, f64, LayoutCode::Float64),
);

impl<'r> RowBuffer<'r> {
    /// Fixed date-time column in ticks.
    pub fn read_fixed_date_time(&self, column: &LayoutColumn) -> Result<i64, RowResult> {
        let offset = self.fixed_readable(column, LayoutCode::DateTime)?;
        Ok(i64::from_le_bytes(self.data[offset..offset + 8].try_into().unwrap()))
    }

    pub fn write_fixed_date_time(&mut self, column: &LayoutColumn, value: i64) -> Result<(), RowResult> {
        let offset = self.fixed_writable(column, LayoutCode::DateTime)?;
        self.data[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Fixed date-time column in unix epoch milliseconds.
    pub fn read_fixed_unix_date_time(&self, column: &LayoutColumn) -> Result<i64, RowResult> {
        let offset = self.fixed_readable(column, LayoutCode::UnixDateTime)?;
        Ok(i64::from_le_bytes(self.data[offset..offset + 8].try_into().unwrap()))
    }

    pub fn write_fixed_unix_date_time(
        &mut self,
        column: &LayoutColumn,
        value: i64,
    ) -> Result<(), RowResult> {
        let offset = self.fixed_writable(column, LayoutCode::UnixDateTime)?;
        self.data[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }
}

fn decimal_bytes(value: Decimal) -> [u8; 16] {
    let mut bytes = [0u8; 16];
    bytes[0..8].copy_from_slice(&value.mantissa.to_le_bytes());
    bytes[8] = value.scale;
    bytes
}
