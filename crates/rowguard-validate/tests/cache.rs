use std::sync::Arc;

use rowguard_model::{ColumnDefinition, ColumnType, Rule, Schema};
use rowguard_validate::{CompiledSchemaCache, ValidationEngine, schema_fingerprint};

fn orders() -> Schema {
    Schema::new()
        .column(
            ColumnDefinition::new("order_id", ColumnType::String)
                .rule(Rule::Required)
                .rule(Rule::Unique),
        )
        .column(ColumnDefinition::new("total", ColumnType::Currency).with_locale("en-US"))
}

#[test]
fn identical_schemas_share_one_compilation() {
    let mut cache = CompiledSchemaCache::new();
    let first = cache.get_or_compile(&orders()).expect("compiles");
    let second = cache.get_or_compile(&orders()).expect("cached");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
    assert!(cache.contains(&orders()));

    let engine = ValidationEngine::new(first);
    assert!(engine.validate_all_bitmap(&[["A-1", "$1,250.00"]]).is_valid());
}

#[test]
fn structural_changes_get_new_entries() {
    let mut cache = CompiledSchemaCache::new();
    let base = orders();
    let reordered = Schema::new()
        .column(ColumnDefinition::new("total", ColumnType::Currency).with_locale("en-US"))
        .column(
            ColumnDefinition::new("order_id", ColumnType::String)
                .rule(Rule::Required)
                .rule(Rule::Unique),
        );
    let relocated = orders().column(ColumnDefinition::new("total", ColumnType::Currency).with_locale("de-DE"));

    assert_ne!(schema_fingerprint(&base), schema_fingerprint(&reordered));
    assert_ne!(schema_fingerprint(&base), schema_fingerprint(&relocated));

    for schema in [&base, &reordered, &relocated] {
        cache.get_or_compile(schema).expect("compiles");
    }
    assert_eq!(cache.len(), 3);
}

#[test]
fn fingerprint_is_hex_sha256() {
    let fingerprint = schema_fingerprint(&orders());
    assert_eq!(fingerprint.len(), 64);
    assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert_eq!(fingerprint, schema_fingerprint(&orders()));
}

#[test]
fn failed_compilations_are_not_cached() {
    let mut cache = CompiledSchemaCache::new();
    let broken = Schema::new()
        .column(ColumnDefinition::new("code", ColumnType::String).rule(Rule::pattern("(")));

    assert!(cache.get_or_compile(&broken).is_err());
    assert!(cache.is_empty());
    assert!(!cache.contains(&broken));
}

#[test]
fn invalidate_and_clear() {
    let mut cache = CompiledSchemaCache::new();
    let kept = cache.get_or_compile(&orders()).expect("compiles");

    assert!(cache.invalidate(&orders()));
    assert!(!cache.invalidate(&orders()));
    assert!(cache.is_empty());

    // Holders of an evicted schema keep a working copy.
    assert_eq!(kept.column_count(), 2);

    let recompiled = cache.get_or_compile(&orders()).expect("compiles");
    assert!(!Arc::ptr_eq(&kept, &recompiled));

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn distinct_custom_predicates_do_not_collide() {
    let with_rule = |predicate: fn(&str) -> bool| {
        Schema::new().column(
            ColumnDefinition::new("sku", ColumnType::String).rule(Rule::custom(predicate, "bad sku")),
        )
    };
    let starts: fn(&str) -> bool = |v| v.starts_with('S');
    let ends: fn(&str) -> bool = |v| v.ends_with('S');

    let mut cache = CompiledSchemaCache::new();
    let a = cache.get_or_compile(&with_rule(starts)).expect("compiles");
    let b = cache.get_or_compile(&with_rule(ends)).expect("compiles");
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 2);
}
