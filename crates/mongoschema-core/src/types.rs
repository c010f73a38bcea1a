use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage type tag written to a schema node's `bsonType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeTag {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "array")]
    Array,
    #[serde(rename = "object")]
    Object,
    #[serde(rename = "objectId")]
    ObjectId,
}

impl TypeTag {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Bool => "bool",
            TypeTag::Date => "date",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
            TypeTag::ObjectId => "objectId",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive value kinds a property can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Date,
    Int,
    Long,
    Double,
    Float,
    Boolean,
    ObjectId,
}

/// Dispatch table from declared type names to primitives.
const PRIMITIVE_TYPE_NAMES: &[(&str, Primitive)] = &[
    ("String", Primitive::String),
    ("Date", Primitive::Date),
    ("Int", Primitive::Int),
    ("Long", Primitive::Long),
    ("Double", Primitive::Double),
    ("Float", Primitive::Float),
    ("Boolean", Primitive::Boolean),
    ("ObjectId", Primitive::ObjectId),
];

impl Primitive {
    /// Resolve a declared type name against the primitive dispatch table.
    pub fn from_type_name(name: &str) -> Option<Self> {
        PRIMITIVE_TYPE_NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, primitive)| *primitive)
    }

    pub fn type_name(self) -> &'static str {
        PRIMITIVE_TYPE_NAMES
            .iter()
            .find(|(_, primitive)| *primitive == self)
            .map(|(name, _)| *name)
            .unwrap_or("?")
    }

    /// Storage tag for this primitive.
    pub fn tag(self) -> TypeTag {
        match self {
            Primitive::String => TypeTag::String,
            Primitive::Date => TypeTag::Date,
            Primitive::Int | Primitive::Long | Primitive::Double | Primitive::Float => {
                TypeTag::Number
            }
            Primitive::Boolean => TypeTag::Bool,
            Primitive::ObjectId => TypeTag::ObjectId,
        }
    }
}

/// Declared type of a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeReference {
    Primitive(Primitive),
    /// Reference to an enum declaration by name.
    Enum(String),
    /// Homogeneous list of the element type.
    Array(Box<TypeReference>),
    /// Reference to a nested record declaration by name.
    Record(String),
}

impl TypeReference {
    pub fn primitive(primitive: Primitive) -> Self {
        TypeReference::Primitive(primitive)
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        TypeReference::Enum(name.into())
    }

    pub fn array(element: TypeReference) -> Self {
        TypeReference::Array(Box::new(element))
    }

    pub fn record(name: impl Into<String>) -> Self {
        TypeReference::Record(name.into())
    }

    /// Name of the declaration this type depends on, looking through arrays.
    pub fn referenced_declaration(&self) -> Option<&str> {
        match self {
            TypeReference::Primitive(_) => None,
            TypeReference::Enum(name) | TypeReference::Record(name) => Some(name),
            TypeReference::Array(element) => element.referenced_declaration(),
        }
    }

    /// Name of the nested record this type embeds, looking through arrays.
    pub fn referenced_record(&self) -> Option<&str> {
        match self {
            TypeReference::Record(name) => Some(name),
            TypeReference::Array(element) => element.referenced_record(),
            TypeReference::Primitive(_) | TypeReference::Enum(_) => None,
        }
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeReference::Primitive(primitive) => f.write_str(primitive.type_name()),
            TypeReference::Enum(name) | TypeReference::Record(name) => f.write_str(name),
            TypeReference::Array(element) => write!(f, "List<{element}>"),
        }
    }
}
