use crate::layouts::{ColumnStorage, LayoutCode, LayoutCompiler, LayoutResolver};
use crate::schemas::{Namespace, Schema, SchemaId};

fn hotel_namespace() -> Namespace {
    Namespace::parse(
        r#"{
            "name": "Hotels",
            "schemas": [
                {
                    "name": "Guest",
                    "id": 2,
                    "type": "schema",
                    "properties": [
                        { "path": "first_name", "type": { "type": "utf8" } },
                        { "path": "last_name", "type": { "type": "utf8" } }
                    ]
                },
                {
                    "name": "Room",
                    "id": 1,
                    "type": "schema",
                    "properties": [
                        { "path": "floor", "type": { "type": "int32", "storage": "fixed", "nullable": false } },
                        { "path": "number", "type": { "type": "int32", "storage": "fixed", "nullable": false } },
                        { "path": "rate", "type": { "type": "float64", "storage": "fixed" } },
                        { "path": "smoking", "type": { "type": "bool", "storage": "fixed" } },
                        { "path": "description", "type": { "type": "utf8" } },
                        { "path": "amenities", "type": { "type": "array", "items": { "type": "utf8" } } },
                        { "path": "guest", "type": { "type": "schema", "name": "Guest" } }
                    ],
                    "partitionKeys": [ { "path": "floor" } ],
                    "primarySortKeys": [ { "path": "number", "direction": "asc" } ]
                }
            ]
        }"#,
    )
    .expect("namespace fixture must parse")
}

#[test]
fn fixed_columns_get_sequential_offsets_after_the_bitmask() {
    let namespace = hotel_namespace();
    let schema = namespace.schema_by_id(SchemaId(1)).unwrap();
    let layout = LayoutCompiler::compile(&namespace, schema).unwrap();

    // Two nullable fixed columns (rate, smoking) need one bitmask byte.
    assert_eq!(layout.bitmask_bytes(), 1);

    let floor = layout.column("floor").unwrap();
    let number = layout.column("number").unwrap();
    let rate = layout.column("rate").unwrap();
    let smoking = layout.column("smoking").unwrap();

    assert_eq!(
        floor.storage,
        ColumnStorage::Fixed { offset: 1, size: 4, bit: None }
    );
    assert_eq!(
        number.storage,
        ColumnStorage::Fixed { offset: 5, size: 4, bit: None }
    );
    assert_eq!(
        rate.storage,
        ColumnStorage::Fixed { offset: 9, size: 8, bit: Some(0) }
    );
    assert_eq!(
        smoking.storage,
        ColumnStorage::Fixed { offset: 17, size: 1, bit: Some(1) }
    );
    assert_eq!(layout.fixed_size(), 18);
}

#[test]
fn variable_and_scope_columns_are_sparse() {
    let namespace = hotel_namespace();
    let schema = namespace.schema_by_id(SchemaId(1)).unwrap();
    let layout = LayoutCompiler::compile(&namespace, schema).unwrap();

    let description = layout.column("description").unwrap();
    assert_eq!(description.storage, ColumnStorage::Sparse);
    assert_eq!(description.type_code, LayoutCode::Utf8);

    let amenities = layout.column("amenities").unwrap();
    assert_eq!(amenities.storage, ColumnStorage::Sparse);
    assert_eq!(amenities.type_code, LayoutCode::ArrayScope);
    assert_eq!(
        amenities.type_args.get(0).unwrap().code,
        LayoutCode::Utf8
    );

    let guest = layout.column("guest").unwrap();
    assert_eq!(guest.type_code, LayoutCode::Schema);
}

#[test]
fn compilation_is_deterministic() {
    let namespace = hotel_namespace();
    let schema = namespace.schema_by_id(SchemaId(1)).unwrap();
    let first = LayoutCompiler::compile(&namespace, schema).unwrap();
    let second = LayoutCompiler::compile(&namespace, schema).unwrap();

    assert_eq!(first.fixed_size(), second.fixed_size());
    assert_eq!(first.bitmask_bytes(), second.bitmask_bytes());
    for (a, b) in first.columns().iter().zip(second.columns()) {
        assert_eq!(a.path, b.path);
        assert_eq!(a.type_code, b.type_code);
        assert_eq!(a.storage, b.storage);
        assert_eq!(a.index, b.index);
    }
}

#[test]
fn tokens_are_column_ordinals() {
    let namespace = hotel_namespace();
    let schema = namespace.schema_by_id(SchemaId(1)).unwrap();
    let layout = LayoutCompiler::compile(&namespace, schema).unwrap();

    assert_eq!(layout.token("floor"), Some(0));
    assert_eq!(layout.token("guest"), Some(6));
    assert_eq!(layout.token("no_such_path"), None);
    assert_eq!(layout.path_of_token(2), Some("rate"));
    assert_eq!(layout.path_of_token(99), None);
}

#[test]
fn fixed_storage_on_variable_length_kinds_is_rejected() {
    let namespace = Namespace::of(
        Schema::parse(
            r#"{
                "name": "Bad",
                "id": 1,
                "type": "schema",
                "properties": [
                    { "path": "name", "type": { "type": "utf8", "storage": "fixed", "length": 32 } }
                ]
            }"#,
        )
        .unwrap(),
    );
    let schema = namespace.schema_by_id(SchemaId(1)).unwrap();
    let error = LayoutCompiler::compile(&namespace, schema).unwrap_err();
    assert!(error.to_string().contains("fixed storage"));
}

#[test]
fn duplicate_property_paths_are_rejected() {
    let namespace = Namespace::of(
        Schema::parse(
            r#"{
                "name": "Bad",
                "id": 1,
                "type": "schema",
                "properties": [
                    { "path": "x", "type": { "type": "int32" } },
                    { "path": "x", "type": { "type": "int64" } }
                ]
            }"#,
        )
        .unwrap(),
    );
    let schema = namespace.schema_by_id(SchemaId(1)).unwrap();
    let error = LayoutCompiler::compile(&namespace, schema).unwrap_err();
    assert!(error.to_string().contains("duplicate property path"));
}

#[test]
fn key_paths_must_reference_declared_properties() {
    let namespace = Namespace::of(
        Schema::parse(
            r#"{
                "name": "Bad",
                "id": 1,
                "type": "schema",
                "properties": [
                    { "path": "x", "type": { "type": "int32" } }
                ],
                "partitionKeys": [ { "path": "missing" } ]
            }"#,
        )
        .unwrap(),
    );
    let schema = namespace.schema_by_id(SchemaId(1)).unwrap();
    let error = LayoutCompiler::compile(&namespace, schema).unwrap_err();
    assert!(error.to_string().contains("partition key path"));
}

#[test]
fn out_of_namespace_schemas_are_rejected() {
    let namespace = hotel_namespace();
    let stranger = Schema::parse(
        r#"{ "name": "Stranger", "id": 99, "type": "schema", "properties": [] }"#,
    )
    .unwrap();
    let error = LayoutCompiler::compile(&namespace, &stranger).unwrap_err();
    assert!(error.to_string().contains("not defined within"));
}

#[test]
fn unresolved_udt_references_fail_compilation() {
    let namespace = Namespace::of(
        Schema::parse(
            r#"{
                "name": "Bad",
                "id": 1,
                "type": "schema",
                "properties": [
                    { "path": "other", "type": { "type": "schema", "name": "Missing" } }
                ]
            }"#,
        )
        .unwrap(),
    );
    let schema = namespace.schema_by_id(SchemaId(1)).unwrap();
    assert!(LayoutCompiler::compile(&namespace, schema).is_err());
}

#[test]
fn resolver_memoizes_compiled_layouts() {
    let resolver = LayoutResolver::new(hotel_namespace());

    let first = resolver.resolve(SchemaId(1)).unwrap();
    let second = resolver.resolve(SchemaId(1)).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(first.name(), "Room");

    let guest = resolver.resolve(SchemaId(2)).unwrap();
    assert_eq!(guest.name(), "Guest");
    assert!(resolver.resolve(SchemaId(42)).is_err());
}

#[test]
fn immutable_scopes_compile_to_immutable_codes() {
    let namespace = Namespace::of(
        Schema::parse(
            r#"{
                "name": "Frozen",
                "id": 1,
                "type": "schema",
                "properties": [
                    { "path": "tags", "type": { "type": "array", "immutable": true, "items": { "type": "utf8" } } }
                ]
            }"#,
        )
        .unwrap(),
    );
    let schema = namespace.schema_by_id(SchemaId(1)).unwrap();
    let layout = LayoutCompiler::compile(&namespace, schema).unwrap();
    let tags = layout.column("tags").unwrap();
    assert_eq!(tags.type_code, LayoutCode::ImmutableArrayScope);
}
