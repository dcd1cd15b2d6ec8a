use rowguard_model::{ColumnDefinition, ColumnType, ErrorKind, ModelError, Rule, Schema};

const CONTACTS: &str = r#"{
    "locale": "de-DE",
    "columns": [
        {"name": "email", "type": "string", "rules": [{"rule": "required"}, {"rule": "email"}, {"rule": "unique"}]},
        {"name": "age", "type": "integer", "rules": [{"rule": "min", "value": 0}, {"rule": "max", "value": 120}]},
        {"name": "status", "type": "enum", "rules": [{"rule": "enum", "values": ["active", "inactive"]}]},
        {"name": "code", "type": "string", "rules": [{"rule": "pattern", "value": "^[A-Z]{3}$"}, {"rule": "maxLength", "value": 3}], "aliases": ["Code", "CODE"]},
        {"name": "joined", "type": "date", "locale": "en-US"}
    ]
}"#;

#[test]
fn parses_ordered_columns_from_json() {
    let schema = Schema::from_json_str(CONTACTS).expect("schema");

    let names: Vec<&str> = schema.column_names().collect();
    assert_eq!(names, ["email", "age", "status", "code", "joined"]);
    assert_eq!(schema.locale.as_deref(), Some("de-DE"));

    let age = schema.get("age").expect("age column");
    assert_eq!(age.column_type, ColumnType::Integer);
    assert!(matches!(age.rules[1], Rule::Max { value } if value == 120.0));

    let code = schema.get("code").expect("code column");
    assert!(matches!(&code.rules[0], Rule::Pattern { value } if value == "^[A-Z]{3}$"));
    assert_eq!(code.aliases, ["Code", "CODE"]);

    let joined = schema.get("joined").expect("joined column");
    assert!(joined.rules.is_empty());
    assert_eq!(joined.locale.as_deref(), Some("en-US"));
}

#[test]
fn duplicate_column_names_are_rejected() {
    let json = r#"{"columns": [
        {"name": "id", "type": "string"},
        {"name": "id", "type": "number"}
    ]}"#;
    let err = Schema::from_json_str(json).expect_err("duplicate");
    assert!(matches!(err, ModelError::DuplicateColumn { name } if name == "id"));
}

#[test]
fn unknown_rule_is_a_parse_error() {
    let json = r#"{"columns": [{"name": "id", "type": "string", "rules": [{"rule": "custom"}]}]}"#;
    assert!(matches!(
        Schema::from_json_str(json),
        Err(ModelError::Json(_))
    ));
}

#[test]
fn json_round_trip_preserves_rules() {
    let schema = Schema::new()
        .column(
            ColumnDefinition::new("id", ColumnType::String)
                .rule(Rule::Required)
                .rule(Rule::min_length(2)),
        )
        .with_locale("fr-FR");
    let json = schema.to_json_string().expect("serialize");
    assert!(json.contains(r#""rule": "minLength""#));

    let parsed = Schema::from_json_str(&json).expect("parse");
    assert_eq!(parsed.columns[0].rules.len(), 2);
    assert_eq!(parsed.locale.as_deref(), Some("fr-FR"));
}

#[test]
fn rule_fingerprints_distinguish_custom_predicates() {
    let a = Rule::custom(|value: &str| !value.is_empty(), "msg");
    let b = Rule::custom(|value: &str| !value.is_empty(), "msg");
    assert_ne!(a.fingerprint(), b.fingerprint());
    assert_eq!(a.fingerprint(), a.clone().fingerprint());
    assert_eq!(Rule::min(1.0).fingerprint(), Rule::min(1.0).fingerprint());
    assert_ne!(Rule::min(1.0).fingerprint(), Rule::max(1.0).fingerprint());
}

#[test]
fn error_kind_serializes_to_code() {
    let json = serde_json::to_string(&ErrorKind::RequiredMissing).expect("serialize");
    assert_eq!(json, r#""REQUIRED""#);
    assert_eq!(ErrorKind::UniqueViolation.code(), "UNIQUE");
}
