use crate::layouts::{LayoutCode, LayoutResolver};
use crate::rows::cursor;
use crate::rows::{
    Decimal, HybridRowHeader, HybridRowVersion, RowBuffer, RowOptions, RowResult,
};
use crate::schemas::{Namespace, SchemaId};

fn resolver() -> LayoutResolver {
    LayoutResolver::new(
        Namespace::parse(
            r#"{
                "name": "Tests",
                "schemas": [
                    {
                        "name": "Vitals",
                        "id": 1,
                        "type": "schema",
                        "properties": [
                            { "path": "age", "type": { "type": "int32", "storage": "fixed" } },
                            { "path": "alive", "type": { "type": "bool", "storage": "fixed", "nullable": false } },
                            { "path": "name", "type": { "type": "utf8" } }
                        ]
                    }
                ]
            }"#,
        )
        .expect("namespace fixture must parse"),
    )
}

// ---- header ---------------------------------------------------------------

#[test]
fn header_roundtrips() {
    let header = HybridRowHeader::new(HybridRowVersion::V1, SchemaId(42));
    let mut buf = [0u8; HybridRowHeader::BYTES];
    header.encode(&mut buf).unwrap();
    assert_eq!(buf, [0x81, 42, 0, 0, 0]);
    assert_eq!(HybridRowHeader::decode(&buf).unwrap(), header);
}

#[test]
fn header_rejects_short_buffers() {
    assert!(HybridRowHeader::decode(&[0x81, 1, 0, 0]).is_err());
    let mut short = [0u8; 4];
    let header = HybridRowHeader::new(HybridRowVersion::V1, SchemaId(1));
    assert!(header.encode(&mut short).is_err());
}

#[test]
fn header_rejects_unknown_and_invalid_versions() {
    assert!(HybridRowHeader::decode(&[0x7f, 1, 0, 0, 0]).is_err());
    assert!(HybridRowHeader::decode(&[0x00, 1, 0, 0, 0]).is_err());
}

// ---- fixed columns --------------------------------------------------------

#[test]
fn nullable_fixed_columns_track_presence() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();
    let layout = resolver.resolve(SchemaId(1)).unwrap();
    let age = layout.column("age").unwrap();

    assert_eq!(row.read_fixed_i32(age), Err(RowResult::NotFound));
    row.write_fixed_i32(age, 30).unwrap();
    assert_eq!(row.read_fixed_i32(age), Ok(30));
    row.delete_fixed(age).unwrap();
    assert_eq!(row.read_fixed_i32(age), Err(RowResult::NotFound));
}

#[test]
fn non_nullable_fixed_columns_are_always_present() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();
    let layout = resolver.resolve(SchemaId(1)).unwrap();
    let alive = layout.column("alive").unwrap();

    assert_eq!(row.read_fixed_bool(alive), Ok(false));
    row.write_fixed_bool(alive, true).unwrap();
    assert_eq!(row.read_fixed_bool(alive), Ok(true));
    assert_eq!(row.delete_fixed(alive), Err(RowResult::TypeConstraint));
}

#[test]
fn fixed_reads_check_the_column_type() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();
    let layout = resolver.resolve(SchemaId(1)).unwrap();
    let age = layout.column("age").unwrap();

    row.write_fixed_i32(age, 30).unwrap();
    assert_eq!(row.read_fixed_i64(age), Err(RowResult::TypeMismatch));
    assert_eq!(row.write_fixed_f64(age, 1.0), Err(RowResult::TypeMismatch));
}

#[test]
fn fixed_writes_do_not_invalidate_cursors() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();
    let layout = resolver.resolve(SchemaId(1)).unwrap();
    let age = layout.column("age").unwrap();

    let mut edit = row.root_cursor();
    row.write_fixed_i32(age, 30).unwrap();
    // Still usable: no bytes moved.
    assert!(!cursor::find(&mut edit, &row, "name"));
}

// ---- find / insert --------------------------------------------------------

#[test]
fn find_miss_positions_for_insert() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    assert!(!cursor::find(&mut edit, &row, "name"));
    assert!(!edit.exists);
    assert_eq!(edit.path.as_deref(), Some("name"));
    assert_eq!(edit.path_token, Some(2));

    row.write_sparse_utf8(&mut edit, "hello", RowOptions::Insert).unwrap();

    let mut again = row.root_cursor();
    assert!(cursor::find(&mut again, &row, "name"));
    assert!(again.exists);
    assert_eq!(row.read_sparse_utf8(&again), Ok("hello"));
}

#[test]
fn find_token_resolves_through_the_layout() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find_token(&mut edit, &row, 2);
    row.write_sparse_utf8(&mut edit, "by-token", RowOptions::Upsert).unwrap();

    let mut again = row.root_cursor();
    assert!(cursor::find(&mut again, &row, "name"));
    assert_eq!(row.read_sparse_utf8(&again), Ok("by-token"));
    assert_eq!(again.path_token, Some(2));
}

#[test]
#[should_panic(expected = "find requires a named scope")]
fn find_rejects_indexed_scopes() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "nums");
    let mut child = row.write_scope(&mut edit, LayoutCode::ArrayScope, RowOptions::Upsert).unwrap();
    cursor::find(&mut child, &row, "anything");
}

// ---- row options ----------------------------------------------------------

#[test]
fn insert_fails_on_a_present_path() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "x");
    row.write_sparse_i32(&mut edit, 1, RowOptions::Insert).unwrap();
    assert_eq!(
        row.write_sparse_i32(&mut edit, 2, RowOptions::Insert),
        Err(RowResult::Exists)
    );
}

#[test]
fn update_fails_on_an_absent_path() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "x");
    assert_eq!(
        row.write_sparse_i32(&mut edit, 1, RowOptions::Update),
        Err(RowResult::NotFound)
    );
}

#[test]
fn upsert_accepts_both_cases() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "x");
    row.write_sparse_i32(&mut edit, 1, RowOptions::Upsert).unwrap();
    row.write_sparse_i32(&mut edit, 2, RowOptions::Upsert).unwrap();
    assert_eq!(row.read_sparse_i32(&edit), Ok(2));

    let mut again = row.root_cursor();
    assert!(cursor::find(&mut again, &row, "x"));
    assert_eq!(row.read_sparse_i32(&again), Ok(2));
}

#[test]
fn delete_of_an_absent_path_is_a_no_op() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "ghost");
    let before = row.len();
    assert_eq!(row.delete_sparse(&mut edit), Ok(()));
    assert_eq!(row.len(), before);
}

#[test]
fn delete_removes_the_cell_and_its_bytes() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();
    let empty = row.len();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "x");
    row.write_sparse_utf8(&mut edit, "payload", RowOptions::Upsert).unwrap();
    assert!(row.len() > empty);

    let mut edit = row.root_cursor();
    assert!(cursor::find(&mut edit, &row, "x"));
    row.delete_sparse(&mut edit).unwrap();
    assert_eq!(row.len(), empty);

    let mut again = row.root_cursor();
    assert!(!cursor::find(&mut again, &row, "x"));
}

#[test]
fn insert_at_shifts_array_elements_right() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "nums");
    let mut child = row.write_scope(&mut edit, LayoutCode::ArrayScope, RowOptions::Upsert).unwrap();
    for value in [1, 2, 3] {
        row.write_sparse_i32(&mut child, value, RowOptions::Upsert).unwrap();
        cursor::move_next(&mut child, &row);
    }

    let mut edit = row.root_cursor();
    assert!(cursor::find(&mut edit, &row, "nums"));
    let mut child = row.read_scope(&edit).unwrap();
    assert!(cursor::move_to(&mut child, &row, 1));
    row.write_sparse_i32(&mut child, 99, RowOptions::InsertAt).unwrap();
    assert_eq!(child.count, 4);

    let mut edit = row.root_cursor();
    assert!(cursor::find(&mut edit, &row, "nums"));
    let mut child = row.read_scope(&edit).unwrap();
    let mut values = Vec::new();
    while cursor::move_next(&mut child, &row) {
        values.push(row.read_sparse_i32(&child).unwrap());
    }
    assert_eq!(values, [1, 99, 2, 3]);
}

#[test]
fn delete_from_an_array_renumbers_the_remainder() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "nums");
    let mut child = row.write_scope(&mut edit, LayoutCode::ArrayScope, RowOptions::Upsert).unwrap();
    for value in [10, 20, 30] {
        row.write_sparse_i32(&mut child, value, RowOptions::Upsert).unwrap();
        cursor::move_next(&mut child, &row);
    }

    let mut edit = row.root_cursor();
    assert!(cursor::find(&mut edit, &row, "nums"));
    let mut child = row.read_scope(&edit).unwrap();
    assert!(cursor::move_to(&mut child, &row, 1));
    row.delete_sparse(&mut child).unwrap();
    assert_eq!(child.count, 2);
    assert!(cursor::move_next(&mut child, &row));
    assert_eq!(child.index, 1);
    assert_eq!(row.read_sparse_i32(&child), Ok(30));
}

// ---- scopes ---------------------------------------------------------------

#[test]
fn skip_over_a_sized_scope_lands_on_its_content_end() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "nums");
    let mut child = row.write_scope(&mut edit, LayoutCode::ArrayScope, RowOptions::Upsert).unwrap();
    for value in [1, 2] {
        row.write_sparse_i32(&mut child, value, RowOptions::Upsert).unwrap();
        cursor::move_next(&mut child, &row);
    }

    let mut edit = row.root_cursor();
    assert!(cursor::find(&mut edit, &row, "nums"));
    let expected_end = edit.end_offset;
    let mut child = row.read_scope(&edit).unwrap();
    cursor::skip(&mut edit, &row, &mut child);
    assert_eq!(edit.end_offset, child.meta_offset);
    assert_eq!(edit.end_offset, expected_end);
}

#[test]
fn skip_over_an_unsized_scope_consumes_the_end_marker() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "obj");
    let mut child = row.write_scope(&mut edit, LayoutCode::ObjectScope, RowOptions::Upsert).unwrap();
    cursor::find(&mut child, &row, "x");
    row.write_sparse_i32(&mut child, 7, RowOptions::Upsert).unwrap();

    let mut edit = row.root_cursor();
    assert!(cursor::find(&mut edit, &row, "obj"));
    let expected_end = edit.end_offset;
    let mut child = row.read_scope(&edit).unwrap();
    cursor::skip(&mut edit, &row, &mut child);
    assert_eq!(edit.end_offset, child.meta_offset + LayoutCode::BYTES);
    assert_eq!(edit.end_offset, expected_end);
}

#[test]
#[should_panic(expected = "is not nested at the cursor's value")]
fn skip_rejects_a_foreign_child() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "nums");
    row.write_scope(&mut edit, LayoutCode::ArrayScope, RowOptions::Upsert).unwrap();

    let mut edit = row.root_cursor();
    assert!(cursor::find(&mut edit, &row, "nums"));
    let mut stranger = row.root_cursor();
    cursor::skip(&mut edit, &row, &mut stranger);
}

#[test]
fn move_next_with_child_drains_an_open_scope() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "nums");
    let mut child = row.write_scope(&mut edit, LayoutCode::ArrayScope, RowOptions::Upsert).unwrap();
    row.write_sparse_i32(&mut child, 5, RowOptions::Upsert).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "tail");
    row.write_sparse_bool(&mut edit, true, RowOptions::Upsert).unwrap();

    let mut edit = row.root_cursor();
    assert!(cursor::move_next(&mut edit, &row));
    assert_eq!(edit.path.as_deref(), Some("nums"));
    let mut child = row.read_scope(&edit).unwrap();
    assert!(cursor::move_next(&mut child, &row));
    // Child is only partway through; the parent still advances cleanly.
    assert!(cursor::move_next_with_child(&mut edit, &row, &mut child));
    assert_eq!(edit.path.as_deref(), Some("tail"));
    assert_eq!(row.read_sparse_bool(&edit), Ok(true));
}

#[test]
#[should_panic(expected = "cursors only move forward")]
fn move_to_refuses_to_move_backwards() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "nums");
    let mut child = row.write_scope(&mut edit, LayoutCode::ArrayScope, RowOptions::Upsert).unwrap();
    for value in [1, 2, 3] {
        row.write_sparse_i32(&mut child, value, RowOptions::Upsert).unwrap();
        cursor::move_next(&mut child, &row);
    }

    let mut edit = row.root_cursor();
    assert!(cursor::find(&mut edit, &row, "nums"));
    let mut child = row.read_scope(&edit).unwrap();
    assert!(cursor::move_to(&mut child, &row, 2));
    cursor::move_to(&mut child, &row, 1);
}

#[test]
fn move_to_reports_exhaustion() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "nums");
    let mut child = row.write_scope(&mut edit, LayoutCode::ArrayScope, RowOptions::Upsert).unwrap();
    row.write_sparse_i32(&mut child, 1, RowOptions::Upsert).unwrap();

    let mut edit = row.root_cursor();
    assert!(cursor::find(&mut edit, &row, "nums"));
    let mut child = row.read_scope(&edit).unwrap();
    assert!(!cursor::move_to(&mut child, &row, 5));
}

#[test]
fn read_scope_rejects_scalars() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "x");
    row.write_sparse_i32(&mut edit, 1, RowOptions::Upsert).unwrap();
    assert!(matches!(row.read_scope(&edit), Err(RowResult::TypeMismatch)));
}

#[test]
fn immutable_scopes_refuse_writes() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "frozen");
    let mut child = row
        .write_scope(&mut edit, LayoutCode::ImmutableArrayScope, RowOptions::Upsert)
        .unwrap();
    assert_eq!(
        row.write_sparse_i32(&mut child, 1, RowOptions::Upsert),
        Err(RowResult::InsufficientPermissions)
    );
}

#[test]
fn read_only_cursors_refuse_writes() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "x");
    let mut frozen = cursor::as_read_only(&edit);
    assert_eq!(
        row.write_sparse_i32(&mut frozen, 1, RowOptions::Upsert),
        Err(RowResult::InsufficientPermissions)
    );
    // The original is untouched.
    row.write_sparse_i32(&mut edit, 1, RowOptions::Upsert).unwrap();
}

#[test]
fn deep_nesting_is_capped() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "deep");
    let mut current = row.write_scope(&mut edit, LayoutCode::ArrayScope, RowOptions::Upsert).unwrap();
    loop {
        match row.write_scope(&mut current, LayoutCode::ArrayScope, RowOptions::Upsert) {
            Ok(child) => current = child,
            Err(result) => {
                assert_eq!(result, RowResult::TooBig);
                break;
            }
        }
    }
}

// ---- generations ----------------------------------------------------------

#[test]
#[should_panic(expected = "stale cursor")]
fn structural_mutations_invalidate_other_cursors() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut writer = row.root_cursor();
    let mut bystander = row.root_cursor();
    cursor::find(&mut writer, &row, "x");
    row.write_sparse_i32(&mut writer, 1, RowOptions::Upsert).unwrap();
    cursor::move_next(&mut bystander, &row);
}

#[test]
fn the_mutating_cursor_stays_live() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "x");
    row.write_sparse_i32(&mut edit, 1, RowOptions::Upsert).unwrap();
    assert_eq!(row.read_sparse_i32(&edit), Ok(1));
    row.write_sparse_i32(&mut edit, 2, RowOptions::Update).unwrap();
    assert_eq!(row.read_sparse_i32(&edit), Ok(2));
}

// ---- typed cells ----------------------------------------------------------

#[test]
fn sparse_cells_roundtrip_values() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "null");
    row.write_sparse_null(&mut edit, RowOptions::Upsert).unwrap();
    assert_eq!(row.read_sparse_null(&edit), Ok(()));

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "flag");
    row.write_sparse_bool(&mut edit, false, RowOptions::Upsert).unwrap();
    assert_eq!(row.read_sparse_bool(&edit), Ok(false));

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "var");
    row.write_sparse_var_int(&mut edit, -300, RowOptions::Upsert).unwrap();
    assert_eq!(row.read_sparse_var_int(&edit), Ok(-300));

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "price");
    let price = Decimal { mantissa: 12345, scale: 2 };
    row.write_sparse_decimal(&mut edit, price, RowOptions::Upsert).unwrap();
    assert_eq!(row.read_sparse_decimal(&edit), Ok(price));

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "blob");
    row.write_sparse_binary(&mut edit, &[0xde, 0xad], RowOptions::Upsert).unwrap();
    assert_eq!(row.read_sparse_binary(&edit), Ok(&[0xde, 0xad][..]));
}

#[test]
fn sparse_reads_check_the_cell_type() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();

    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "x");
    row.write_sparse_i32(&mut edit, 1, RowOptions::Upsert).unwrap();
    assert_eq!(row.read_sparse_i64(&edit), Err(RowResult::TypeMismatch));
    assert_eq!(row.read_sparse_utf8(&edit), Err(RowResult::TypeMismatch));
}

// ---- wrap -----------------------------------------------------------------

#[test]
fn serialized_rows_reopen_byte_identical() {
    let resolver = resolver();
    let mut row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();
    let layout = resolver.resolve(SchemaId(1)).unwrap();

    row.write_fixed_i32(layout.column("age").unwrap(), 41).unwrap();
    let mut edit = row.root_cursor();
    cursor::find(&mut edit, &row, "name");
    row.write_sparse_utf8(&mut edit, "zoe", RowOptions::Upsert).unwrap();

    let bytes = row.into_bytes();
    let reopened = RowBuffer::wrap(bytes.clone(), &resolver).unwrap();
    assert_eq!(reopened.as_bytes(), &bytes[..]);
    assert_eq!(reopened.header().schema_id, SchemaId(1));
    assert_eq!(
        reopened.read_fixed_i32(layout.column("age").unwrap()),
        Ok(41)
    );

    let mut found = reopened.root_cursor();
    assert!(cursor::find(&mut found, &reopened, "name"));
    assert_eq!(reopened.read_sparse_utf8(&found), Ok("zoe"));
}

#[test]
fn wrap_rejects_truncated_rows() {
    let resolver = resolver();
    let row = RowBuffer::init(&resolver, HybridRowVersion::V1, SchemaId(1)).unwrap();
    let mut bytes = row.into_bytes();
    bytes.truncate(HybridRowHeader::BYTES);
    assert!(RowBuffer::wrap(bytes, &resolver).is_err());
}

#[test]
fn wrap_rejects_unknown_schema_ids() {
    let resolver = resolver();
    let mut bytes = vec![0u8; 16];
    bytes[0] = 0x81;
    bytes[1..5].copy_from_slice(&7i32.to_le_bytes());
    assert!(RowBuffer::wrap(bytes, &resolver).is_err());
}
