use crate::document::SchemaDocument;

const MODULE_HEADER: &str = "// @generated by mongoschema. Do not edit.\n";

const LOOKUP_FN: &str = "\
/// Validator document of `collection`, if one was generated.
pub fn get(collection: &str) -> Option<&'static str> {
    SCHEMAS
        .iter()
        .find(|(name, _)| *name == collection)
        .map(|(_, document)| *document)
}
";

/// Lookup table from collection name to document text, in build order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateArtifact {
    entries: Vec<(String, String)>,
}

impl AggregateArtifact {
    pub fn from_documents<'a>(documents: impl IntoIterator<Item = &'a SchemaDocument>) -> Self {
        Self {
            entries: documents
                .into_iter()
                .map(|doc| (doc.collection.clone(), doc.text.clone()))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn get(&self, collection: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == collection)
            .map(|(_, text)| text.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the table as a Rust module exposing `SCHEMAS` and `get`.
    ///
    /// Document text goes into raw string literals, so `$` and quotes are
    /// kept verbatim.
    pub fn render_module(&self) -> String {
        let mut out = String::from(MODULE_HEADER);
        out.push('\n');
        out.push_str("pub static SCHEMAS: &[(&str, &str)] = &[\n");
        for (collection, text) in &self.entries {
            // Debug formatting of a str is a valid Rust string literal.
            out.push_str(&format!(
                "    (\n        {collection:?},\n        {},\n    ),\n",
                raw_literal(text)
            ));
        }
        out.push_str("];\n\n");
        out.push_str(LOOKUP_FN);
        out
    }
}

/// Wrap `text` in a raw string literal with enough `#`s to never close early.
fn raw_literal(text: &str) -> String {
    let mut longest = 0;
    let mut run: Option<usize> = None;
    for ch in text.chars() {
        run = match (ch, run) {
            ('"', _) => Some(0),
            ('#', Some(count)) => Some(count + 1),
            _ => None,
        };
        if let Some(count) = run {
            longest = longest.max(count);
        }
    }

    let hashes = "#".repeat(longest + 1);
    format!("r{hashes}\"{text}\"{hashes}")
}
