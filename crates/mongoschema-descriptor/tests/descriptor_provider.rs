use std::path::{Path, PathBuf};

use mongoschema_compile::{DeferralReason, compile_from};
use mongoschema_core::DeclarationProvider;
use mongoschema_descriptor::{DescriptorError, DescriptorProvider};
use serde_json::json;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn json_descriptor_compiles_with_deferrals() {
    let provider = DescriptorProvider::open(fixture("shop.json")).expect("open descriptor");
    let outcome = compile_from(&provider).expect("compile descriptor");

    assert_eq!(outcome.forest.len(), 1);
    let users = outcome.forest.get("users").unwrap();
    assert_eq!(users.simple_name, "User");

    let value = serde_json::to_value(&users.node).unwrap();
    assert_eq!(value["required"], json!(["name", "email", "role", "zip", "address", "tags"]));
    assert_eq!(value["properties"]["zip"]["pattern"], json!(r"^\d{5}$"));
    assert_eq!(value["properties"]["notes"], json!({"bsonType": ["string", "null"]}));
    assert_eq!(
        value["properties"]["address"]["properties"]["number"],
        json!({"bsonType": "number", "minimum": 1, "maximum": 99999})
    );
    assert_eq!(
        value["properties"]["tags"],
        json!({"bsonType": "array", "items": {"bsonType": "string"}})
    );

    let deferred: Vec<_> = outcome
        .deferred
        .iter()
        .map(|record| (record.record.as_str(), record.reason.clone()))
        .collect();
    assert_eq!(
        deferred,
        vec![
            ("com.shop.model.Order", DeferralReason::Pending),
            (
                "com.shop.model.Invoice",
                DeferralReason::UnresolvedReference {
                    field: "currency".to_string(),
                    type_name: "com.external.Currency".to_string(),
                }
            ),
        ]
    );
}

#[test]
fn toml_descriptor_compiles() {
    let provider = DescriptorProvider::open(fixture("shop.toml")).expect("open descriptor");
    let outcome = compile_from(&provider).expect("compile descriptor");

    let products = serde_json::to_value(&outcome.forest.get("products").unwrap().node).unwrap();
    assert_eq!(
        products,
        json!({
            "bsonType": "object",
            "required": ["title", "price"],
            "properties": {
                "title": {"bsonType": "string", "minLength": 3, "maxLength": 80},
                "price": {"bsonType": "number", "minimum": 0.5},
                "status": {"bsonType": ["string", "null"], "enum": ["ACTIVE", "RETIRED", null]}
            }
        })
    );
}

#[test]
fn structural_violations_surface_as_invalid_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"{"records": [{"name": 42}]}"#).unwrap();

    let provider = DescriptorProvider::open(&path).unwrap();
    assert_eq!(provider.source(), path.display().to_string());

    match provider.declarations() {
        Err(DescriptorError::Invalid(report)) => {
            assert_eq!(report.errors[0].path, "/records/0/name");
        }
        other => panic!("expected invalid descriptor, got {other:?}"),
    }
}

#[test]
fn provider_failures_name_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let provider = DescriptorProvider::open(&path).unwrap();

    let err = compile_from(&provider).unwrap_err();
    assert!(err.to_string().contains("missing.json"));
}
