use mongoschema_compile::{
    BsonType, CompileError, DeferralReason, EMAIL_PATTERN, MIN_TWO_LETTERS_PATTERN, SchemaNode,
    compile,
};
use mongoschema_core::{
    DeclarationGraph, EnumDeclaration, Primitive, PropertyDeclaration, RawAnnotation,
    RecordDeclaration, SchemaRoot, TypeReference, TypeTag,
};
use serde_json::json;

fn primitive(name: &str, primitive: Primitive) -> PropertyDeclaration {
    PropertyDeclaration::new(name, TypeReference::primitive(primitive))
}

fn user_graph() -> DeclarationGraph {
    DeclarationGraph::new(
        vec![
            RecordDeclaration::new("com.acme.User")
                .rooted("users")
                .property(primitive("name", Primitive::String))
                .property(primitive("age", Primitive::Int).nullable())
                .property(PropertyDeclaration::new(
                    "role",
                    TypeReference::enumeration("Role"),
                )),
        ],
        vec![EnumDeclaration::new("Role", ["ADMIN", "USER"])],
    )
}

fn schema_of(graph: &DeclarationGraph, collection: &str) -> SchemaNode {
    let outcome = compile(graph).expect("compile");
    outcome
        .forest
        .get(collection)
        .unwrap_or_else(|| panic!("missing collection {collection}"))
        .node
        .clone()
}

#[test]
fn plain_record_without_annotations() {
    let node = schema_of(&user_graph(), "users");

    assert_eq!(
        serde_json::to_value(&node).unwrap(),
        json!({
            "bsonType": "object",
            "required": ["name", "role"],
            "properties": {
                "name": {"bsonType": "string", "pattern": MIN_TWO_LETTERS_PATTERN},
                "age": {"bsonType": ["number", "null"], "minimum": 1},
                "role": {"bsonType": "string", "enum": ["ADMIN", "USER"]}
            }
        })
    );
}

#[test]
fn unannotated_email_field_gets_email_pattern() {
    let graph = DeclarationGraph::new(
        vec![
            RecordDeclaration::new("Account")
                .rooted("accounts")
                .property(primitive("email", Primitive::String)),
        ],
        Vec::new(),
    );

    let node = schema_of(&graph, "accounts");
    let email = node.property("email").unwrap();
    assert_eq!(email.bson_type, BsonType::required(TypeTag::String));
    assert_eq!(email.pattern.as_deref(), Some(EMAIL_PATTERN));
}

#[test]
fn length_bounds_without_max_omit_max_length() {
    let graph = DeclarationGraph::new(
        vec![
            RecordDeclaration::new("Account").rooted("accounts").property(
                primitive("handle", Primitive::String)
                    .annotated(RawAnnotation::new("LengthBounds").with_arg("min", 3)),
            ),
        ],
        Vec::new(),
    );

    let node = schema_of(&graph, "accounts");
    let value = serde_json::to_value(node.property("handle").unwrap()).unwrap();
    assert_eq!(value, json!({"bsonType": "string", "minLength": 3}));
}

#[test]
fn nested_record_is_inlined_without_wrapper() {
    let graph = DeclarationGraph::new(
        vec![
            RecordDeclaration::new("User")
                .rooted("users")
                .property(PropertyDeclaration::new("address", TypeReference::record("Address")).nullable()),
            RecordDeclaration::new("Address")
                .property(primitive("city", Primitive::String))
                .property(primitive("zip", Primitive::String).nullable()),
        ],
        Vec::new(),
    );

    let outcome = compile(&graph).unwrap();
    let user = &outcome.forest.get("users").unwrap().node;
    let address = user.property("address").unwrap();

    assert!(user.required.is_empty());
    assert_eq!(
        serde_json::to_value(address).unwrap(),
        json!({
            "bsonType": "object",
            "required": ["city"],
            "properties": {
                "city": {"bsonType": "string", "pattern": MIN_TWO_LETTERS_PATTERN},
                "zip": {"bsonType": ["string", "null"], "pattern": MIN_TWO_LETTERS_PATTERN}
            }
        })
    );
}

#[test]
fn list_of_strings_captures_element_type() {
    let graph = DeclarationGraph::new(
        vec![RecordDeclaration::new("Post").rooted("posts").property(PropertyDeclaration::new(
            "tags",
            TypeReference::array(TypeReference::primitive(Primitive::String)),
        ))],
        Vec::new(),
    );

    let node = schema_of(&graph, "posts");
    assert_eq!(
        serde_json::to_value(node.property("tags").unwrap()).unwrap(),
        json!({"bsonType": "array", "items": {"bsonType": "string"}})
    );
}

#[test]
fn explicit_constraints_exclude_defaults() {
    let graph = DeclarationGraph::new(
        vec![
            RecordDeclaration::new("Account")
                .rooted("accounts")
                .property(
                    primitive("email", Primitive::String)
                        .annotated(RawAnnotation::new("Len").with_arg("min", 5).with_arg("max", 64)),
                )
                .property(
                    primitive("pin", Primitive::String)
                        .annotated(RawAnnotation::new("FixLenNum").with_arg("len", 4)),
                )
                .property(
                    primitive("score", Primitive::Double)
                        .annotated(RawAnnotation::new("NumLimit").with_arg("max", 10.5)),
                ),
        ],
        Vec::new(),
    );

    let node = schema_of(&graph, "accounts");

    let email = node.property("email").unwrap();
    assert!(email.pattern.is_none());
    assert_eq!((email.min_length, email.max_length), (Some(5), Some(64)));

    let pin = node.property("pin").unwrap();
    assert_eq!(pin.pattern.as_deref(), Some(r"^\d{4}$"));

    let score = serde_json::to_value(node.property("score").unwrap()).unwrap();
    assert_eq!(score, json!({"bsonType": "number", "maximum": 10.5}));
}

#[test]
fn required_lists_each_non_nullable_field_once() {
    let node = schema_of(&user_graph(), "users");
    for name in ["name", "role"] {
        assert_eq!(node.required.iter().filter(|field| *field == name).count(), 1);
    }
    assert!(!node.required.iter().any(|field| field == "age"));
}

#[test]
fn serialized_schema_parses_back_identically() {
    let node = schema_of(&user_graph(), "users");
    let text = serde_json::to_string_pretty(&node).unwrap();
    let parsed: SchemaNode = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, node);
}

#[test]
fn compiling_twice_is_byte_identical() {
    let graph = user_graph();
    let first = serde_json::to_string_pretty(&schema_of(&graph, "users")).unwrap();
    let second = serde_json::to_string_pretty(&schema_of(&graph, "users")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn record_with_unknown_reference_is_deferred() {
    let graph = DeclarationGraph::new(
        vec![
            RecordDeclaration::new("Invoice").rooted("invoices").property(
                PropertyDeclaration::new("currency", TypeReference::record("external.Currency")),
            ),
            RecordDeclaration::new("Draft")
                .rooted("drafts")
                .property(primitive("title", Primitive::String)),
        ],
        Vec::new(),
    )
    .with_pending(["Draft"]);

    let outcome = compile(&graph).unwrap();
    assert!(outcome.forest.is_empty());
    assert_eq!(outcome.deferred.len(), 2);
    assert_eq!(
        outcome.deferred[0].reason,
        DeferralReason::UnresolvedReference {
            field: "currency".to_string(),
            type_name: "external.Currency".to_string(),
        }
    );
    assert_eq!(outcome.deferred[1].reason, DeferralReason::Pending);
}

#[test]
fn schema_root_without_collection_name_aborts() {
    let mut record = RecordDeclaration::new("Orphan").property(primitive("name", Primitive::String));
    record.schema_root = Some(SchemaRoot {
        collection_name: None,
    });
    let graph = DeclarationGraph::new(vec![record], Vec::new());

    let err = compile(&graph).unwrap_err();
    assert!(matches!(err, CompileError::MissingRequiredMetadata { ref record } if record == "Orphan"));
}

#[test]
fn invalid_declarations_abort_before_building() {
    let graph = DeclarationGraph::new(
        vec![
            RecordDeclaration::new("User").rooted("users"),
            RecordDeclaration::new("User").rooted("people"),
        ],
        Vec::new(),
    );

    assert!(matches!(compile(&graph), Err(CompileError::Declarations(_))));
}
