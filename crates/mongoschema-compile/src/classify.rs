use mongoschema_core::{TypeReference, TypeTag};

/// Map a declared type to its storage tag.
///
/// Enums are stored as strings. Anything that is not a primitive, enum or
/// list is a nested record and classifies as `object`.
pub fn classify(type_ref: &TypeReference) -> TypeTag {
    match type_ref {
        TypeReference::Primitive(primitive) => primitive.tag(),
        TypeReference::Enum(_) => TypeTag::String,
        TypeReference::Array(_) => TypeTag::Array,
        TypeReference::Record(_) => TypeTag::Object,
    }
}
