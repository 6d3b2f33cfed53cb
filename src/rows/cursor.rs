//! # Row Cursors
//!
//! A `RowCursor` is a cloneable position handle into one scope of a row:
//! byte offsets for the item under the cursor, the scope's own type and
//! bounds, and the path of the current sparse field when the scope is named.
//!
//! Cursors cache absolute byte offsets, so any structural mutation of the
//! row invalidates every live cursor except the one the mutation was made
//! through (which is refreshed in place). Each cursor carries the row
//! generation it was derived from, and every buffer operation asserts the
//! generations still match, so stale use fails fast instead of reading
//! shifted bytes.
//!
//! The free functions in this module are the stateless navigation helpers:
//! they take the cursor and the row explicitly and never hold state of
//! their own.

use crate::layouts::LayoutCode;
use crate::rows::RowBuffer;

/// A navigation handle positioned within one scope of a row.
///
/// `index` is the ordinal of the current item within the scope, `-1` before
/// the first advance. `meta_offset` addresses the item's type code,
/// `value_offset` its value bytes, and `end_offset` the first byte past the
/// value. When the cursor is exhausted (`exists == false` after iteration),
/// `meta_offset` is the scope's insertion point.
#[derive(Debug, Clone)]
pub struct RowCursor {
    /// Type of the scope this cursor iterates.
    pub scope_type: LayoutCode,
    /// Type of the item under the cursor; `Invalid` when not positioned.
    pub cell_type: LayoutCode,
    pub index: i32,
    /// Offset of the scope's value (the count header for sized scopes).
    pub start: usize,
    pub meta_offset: usize,
    pub value_offset: usize,
    pub end_offset: usize,
    /// Declared item count, for sized scopes.
    pub count: u32,
    pub exists: bool,
    pub immutable: bool,
    /// Path of the current or sought sparse field, in named scopes.
    pub path: Option<String>,
    /// Schematized path token, when the path is a column of the layout.
    pub path_token: Option<u32>,
    pub(crate) generation: u64,
    pub(crate) depth: usize,
    pub(crate) is_root: bool,
}

impl RowCursor {
    /// Offset of the scope's first item (past the count header for sized
    /// scopes).
    pub(crate) fn content_start(&self) -> usize {
        if !self.is_root && self.scope_type.is_sized_scope() {
            self.start + 4
        } else {
            self.start
        }
    }
}

/// Scans the cursor's scope for a sparse field named `path`.
///
/// Requires a named (non-indexed) scope. The cursor is reset and advanced
/// item by item; on a match it is left on the field with `exists == true`.
/// On a miss it is left exhausted at the scope's insertion point, and the
/// sought path is written onto it so a subsequent insert through the same
/// cursor lands under the right key.
pub fn find(edit: &mut RowCursor, row: &RowBuffer, path: &str) -> bool {
    assert!(
        !edit.scope_type.is_indexed_scope(),
        "find requires a named scope, not {:?}",
        edit.scope_type
    );
    edit.index = -1;
    edit.exists = false;
    edit.cell_type = LayoutCode::Invalid;
    while row.sparse_iterator_move_next(edit) {
        if edit.path.as_deref() == Some(path) {
            return true;
        }
    }
    edit.path = Some(path.to_string());
    edit.path_token = row.layout().token(path);
    false
}

/// `find` by pre-resolved path token. The token must name a column of the
/// row's layout.
pub fn find_token(edit: &mut RowCursor, row: &RowBuffer, token: u32) -> bool {
    let path = row
        .layout()
        .path_of_token(token)
        .unwrap_or_else(|| {
            panic!(
                "token {} does not name a column of layout '{}'",
                token,
                row.layout().name()
            )
        })
        .to_string();
    let found = find(edit, row, &path);
    edit.path_token = Some(token);
    found
}

/// An independent clone of `source` that refuses writes.
pub fn as_read_only(source: &RowCursor) -> RowCursor {
    let mut cursor = source.clone();
    cursor.immutable = true;
    cursor
}

/// An independent clone of `source`. Both copies cache the same byte
/// offsets, so a mutation through either (or through the buffer at large)
/// still invalidates the other.
pub fn copy(source: &RowCursor) -> RowCursor {
    source.clone()
}

/// Advances the cursor to the next item of its scope, clearing any search
/// key left by `find`. Returns `false` on exhaustion.
pub fn move_next(edit: &mut RowCursor, row: &RowBuffer) -> bool {
    edit.path = None;
    edit.path_token = None;
    row.sparse_iterator_move_next(edit)
}

/// Advances the cursor past an opened child scope: drains whatever the
/// child has not yet consumed, then moves to the next sibling.
pub fn move_next_with_child(
    edit: &mut RowCursor,
    row: &RowBuffer,
    child: &mut RowCursor,
) -> bool {
    if child.scope_type.is_scope() {
        skip(edit, row, child);
    }
    move_next(edit, row)
}

/// Advances the cursor to ordinal `index` within its scope. Forward only:
/// `index` must not precede the cursor's current position. Returns `false`
/// when the scope is exhausted before reaching `index`.
pub fn move_to(edit: &mut RowCursor, row: &RowBuffer, index: i32) -> bool {
    assert!(
        edit.index <= index,
        "cursors only move forward: at index {}, asked for {}",
        edit.index,
        index
    );
    while edit.index < index {
        if !move_next(edit, row) {
            return false;
        }
    }
    true
}

/// Fully consumes `child` (which must be the scope nested at the cursor's
/// own value) and accounts for its extent on the parent. Sized child scopes
/// end where their last item does; unsized child scopes carry an explicit
/// end marker that is consumed as well.
pub fn skip(edit: &mut RowCursor, row: &RowBuffer, child: &mut RowCursor) {
    assert!(
        child.start == edit.value_offset,
        "child scope at {} is not nested at the cursor's value {}",
        child.start,
        edit.value_offset
    );
    while row.sparse_iterator_move_next(child) {}
    if child.scope_type.is_sized_scope() {
        edit.end_offset = child.meta_offset;
    } else {
        edit.end_offset = child.meta_offset + LayoutCode::BYTES;
    }
}
