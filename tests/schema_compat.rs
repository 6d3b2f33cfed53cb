//! Schema identity end to end: hashing is structural (comments never
//! matter), layouts compile deterministically from parsed JSON, and schema
//! JSON survives a serialize/reparse cycle.

use hybridrow::schemas::hash::SchemaHash;
use hybridrow::schemas::Namespace;
use hybridrow::{HashCode128, LayoutCompiler, LayoutResolver, Schema, SchemaId};

const SEED: HashCode128 = HashCode128::of(0x2d2d_2d2d, 0x2d2d_2d2d);

fn hotel(comment: &str) -> Namespace {
    Namespace::parse(&format!(
        r#"{{
            "name": "Hotels",
            "schemas": [
                {{
                    "name": "Guest",
                    "id": 2,
                    "type": "schema",
                    "comment": "{comment}",
                    "properties": [
                        {{ "path": "first_name", "type": {{ "type": "utf8" }} }},
                        {{ "path": "stays", "type": {{ "type": "int32", "storage": "fixed" }} }}
                    ]
                }},
                {{
                    "name": "Room",
                    "id": 1,
                    "type": "schema",
                    "properties": [
                        {{ "path": "number", "type": {{ "type": "int32", "storage": "fixed", "nullable": false }} }},
                        {{ "path": "guest", "type": {{ "type": "schema", "name": "Guest" }} }}
                    ]
                }}
            ]
        }}"#
    ))
    .expect("namespace must parse")
}

#[test]
fn schema_hash_ignores_comments() {
    let a = hotel("first draft");
    let b = hotel("revised in review");
    let schema_a = a.schema_by_id(SchemaId(1)).unwrap();
    let schema_b = b.schema_by_id(SchemaId(1)).unwrap();

    assert_eq!(
        SchemaHash::compute_hash(&a, schema_a, SEED).unwrap(),
        SchemaHash::compute_hash(&b, schema_b, SEED).unwrap()
    );
}

#[test]
fn schema_hash_sees_structural_changes() {
    let a = hotel("same");
    let mut b = hotel("same");
    b.schemas[0].properties.remove(1);

    let hash_a = SchemaHash::compute_hash(&a, a.schema_by_id(SchemaId(2)).unwrap(), SEED).unwrap();
    let hash_b = SchemaHash::compute_hash(&b, b.schema_by_id(SchemaId(2)).unwrap(), SEED).unwrap();
    assert_ne!(hash_a, hash_b);
}

#[test]
fn hash_equality_follows_layout_equality() {
    // Same JSON parsed twice: identical hash and byte-identical layout
    // metadata.
    let a = hotel("x");
    let b = hotel("y");
    let layout_a = LayoutCompiler::compile(&a, a.schema_by_id(SchemaId(1)).unwrap()).unwrap();
    let layout_b = LayoutCompiler::compile(&b, b.schema_by_id(SchemaId(1)).unwrap()).unwrap();

    assert_eq!(layout_a.fixed_size(), layout_b.fixed_size());
    assert_eq!(layout_a.bitmask_bytes(), layout_b.bitmask_bytes());
    assert_eq!(layout_a.columns().len(), layout_b.columns().len());
    for (col_a, col_b) in layout_a.columns().iter().zip(layout_b.columns()) {
        assert_eq!(col_a.path, col_b.path);
        assert_eq!(col_a.type_code, col_b.type_code);
        assert_eq!(col_a.storage, col_b.storage);
    }
}

#[test]
fn schema_json_survives_reserialization() {
    let namespace = hotel("kept");
    let schema = namespace.schema_by_id(SchemaId(2)).unwrap();

    let reparsed = Schema::parse(&schema.to_json()).expect("serialized schema must reparse");
    assert_eq!(reparsed.id, schema.id);
    assert_eq!(reparsed.name, schema.name);
    assert_eq!(reparsed.properties.len(), schema.properties.len());

    let roundtrip = Namespace {
        schemas: vec![reparsed],
        ..Namespace::default()
    };
    // UDT reference lives in Room, absent here, so hash Guest alone.
    assert_eq!(
        SchemaHash::compute_hash(&namespace, schema, SEED).unwrap(),
        SchemaHash::compute_hash(
            &roundtrip,
            roundtrip.schema_by_id(SchemaId(2)).unwrap(),
            SEED
        )
        .unwrap()
    );
}

#[test]
fn resolver_shares_layouts_across_sessions() {
    let resolver = LayoutResolver::new(hotel("shared"));
    let first = resolver.resolve(SchemaId(1)).unwrap();
    let second = resolver.resolve(SchemaId(1)).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(first.name(), "Room");
}
