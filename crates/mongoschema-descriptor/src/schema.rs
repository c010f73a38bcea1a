use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::Descriptor;

/// Emit the JSON Schema for descriptor files.
pub fn descriptor_json_schema() -> RootSchema {
    schema_for!(Descriptor)
}
