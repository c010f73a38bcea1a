use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level descriptor document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Descriptor {
    /// Record declarations, in declaration order.
    #[serde(default)]
    pub records: Vec<RecordEntry>,
    /// Enum declarations.
    #[serde(default)]
    pub enums: Vec<EnumEntry>,
    /// Records known to be incomplete; schema roots listed here are deferred.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending: Vec<String>,
}

/// A named record type.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RecordEntry {
    /// Fully-qualified record name.
    pub name: String,
    /// Present when the record is the root of a stored collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_root: Option<SchemaRootEntry>,
    #[serde(default)]
    pub properties: Vec<PropertyEntry>,
}

/// Schema root marker.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SchemaRootEntry {
    /// Logical collection the schema validates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PropertyEntry {
    pub name: String,
    /// Declared type: a primitive name, `List<T>`, an enum name or a record name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Nullable properties are optional in the generated schema.
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationEntry>,
}

/// Annotation name plus raw arguments.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AnnotationEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EnumEntry {
    pub name: String,
    /// Enum constants, in declaration order.
    pub values: Vec<String>,
}
