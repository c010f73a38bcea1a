use std::fmt;

use mongoschema_core::TypeTag;
use serde::de::{MapAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

/// `bsonType` of a node: a bare tag, or `[tag, "null"]` when nullable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BsonType {
    pub tag: TypeTag,
    pub nullable: bool,
}

impl BsonType {
    pub fn required(tag: TypeTag) -> Self {
        Self {
            tag,
            nullable: false,
        }
    }

    pub fn nullable(tag: TypeTag) -> Self {
        Self {
            tag,
            nullable: true,
        }
    }
}

impl Serialize for BsonType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.nullable {
            let mut seq = serializer.serialize_seq(Some(2))?;
            seq.serialize_element(&self.tag)?;
            seq.serialize_element("null")?;
            seq.end()
        } else {
            self.tag.serialize(serializer)
        }
    }
}

#[derive(Deserialize)]
enum NullTag {
    #[serde(rename = "null")]
    Null,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BsonTypeRepr {
    Tag(TypeTag),
    Nullable(TypeTag, NullTag),
}

impl<'de> Deserialize<'de> for BsonType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match BsonTypeRepr::deserialize(deserializer)? {
            BsonTypeRepr::Tag(tag) => BsonType::required(tag),
            BsonTypeRepr::Nullable(tag, NullTag::Null) => BsonType::nullable(tag),
        })
    }
}

/// Field schemas keyed by property name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(Vec<(String, SchemaNode)>);

impl Properties {
    /// Insert a field schema, replacing an existing entry in place.
    pub fn insert(&mut self, name: impl Into<String>, node: SchemaNode) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = node,
            None => self.0.push((name, node)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, node)| node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.0.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, node) in &self.0 {
            map.serialize_entry(name, node)?;
        }
        map.end()
    }
}

struct PropertiesVisitor;

impl<'de> Visitor<'de> for PropertiesVisitor {
    type Value = Properties;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of property schemas")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut properties = Properties::default();
        while let Some((name, node)) = access.next_entry::<String, SchemaNode>()? {
            properties.insert(name, node);
        }
        Ok(properties)
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PropertiesVisitor)
    }
}

/// A node of the derived `$jsonSchema` tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    pub bson_type: BsonType,
    /// Never serialized when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    /// Enum literals; `None` entries serialize as `null`.
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
}

impl SchemaNode {
    /// Leaf node carrying only a type.
    pub fn typed(bson_type: BsonType) -> Self {
        Self {
            bson_type,
            required: Vec::new(),
            properties: None,
            enum_values: None,
            pattern: None,
            min_length: None,
            max_length: None,
            minimum: None,
            maximum: None,
            items: None,
        }
    }

    /// Record node with the given required list and properties.
    pub fn object(required: Vec<String>, properties: Properties) -> Self {
        Self {
            required,
            properties: Some(properties),
            ..Self::typed(BsonType::required(TypeTag::Object))
        }
    }

    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties.as_ref().and_then(|properties| properties.get(name))
    }
}
