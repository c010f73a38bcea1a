use mongoschema_compile::SchemaNode;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Rendered standalone document of one schema-rooted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDocument {
    pub record: String,
    pub collection: String,
    pub file_name: String,
    pub text: String,
}

#[derive(Serialize)]
struct Wrapper<'a> {
    #[serde(rename = "$jsonSchema")]
    json_schema: &'a SchemaNode,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct OwnedWrapper {
    #[serde(rename = "$jsonSchema")]
    json_schema: SchemaNode,
}

/// `<SimpleName><suffix>.json`
pub fn document_file_name(simple_name: &str, suffix: &str) -> String {
    format!("{simple_name}{suffix}.json")
}

/// Wrap `node` as `{"$jsonSchema": node}` and pretty-print it with a
/// trailing newline.
pub fn render_document(node: &SchemaNode) -> Result<String> {
    let mut text = serde_json::to_string_pretty(&Wrapper { json_schema: node })?;
    text.push('\n');
    Ok(text)
}

/// Parse document text back into the wrapped node.
pub fn parse_document(text: &str) -> Result<SchemaNode> {
    let wrapper: OwnedWrapper = serde_json::from_str(text)?;
    Ok(wrapper.json_schema)
}
