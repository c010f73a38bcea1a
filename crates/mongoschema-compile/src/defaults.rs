use mongoschema_core::TypeTag;

use crate::registry::ConstraintFragment;

/// Default pattern for string fields whose name mentions `email`.
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// Default pattern for other string fields: at least two letters present.
pub const MIN_TWO_LETTERS_PATTERN: &str = r"^(.*[a-zA-Z]){2,}.*$";

/// Default constraint for a field with no explicit constraint and no
/// exemption. Only strings and numbers get one.
///
/// The `email` match is case-sensitive.
pub fn default_fragment(field_name: &str, tag: TypeTag) -> Option<ConstraintFragment> {
    match tag {
        TypeTag::String if field_name.contains("email") => {
            Some(ConstraintFragment::pattern(EMAIL_PATTERN))
        }
        TypeTag::String => Some(ConstraintFragment::pattern(MIN_TWO_LETTERS_PATTERN)),
        TypeTag::Number => Some(ConstraintFragment::minimum(1)),
        TypeTag::Bool | TypeTag::Date | TypeTag::Array | TypeTag::Object | TypeTag::ObjectId => {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use serde_json::Number;

    #[test]
    fn email_default_wins_over_generic_string_default() {
        let fragment = default_fragment("contact_email", TypeTag::String).unwrap();
        assert_eq!(fragment.pattern.as_deref(), Some(EMAIL_PATTERN));
        assert!(fragment.min_length.is_none());

        let fragment = default_fragment("name", TypeTag::String).unwrap();
        assert_eq!(fragment.pattern.as_deref(), Some(MIN_TWO_LETTERS_PATTERN));
    }

    #[test]
    fn email_match_requires_lowercase_substring() {
        let fragment = default_fragment("workEmail", TypeTag::String).unwrap();
        assert_eq!(fragment.pattern.as_deref(), Some(MIN_TWO_LETTERS_PATTERN));
    }

    #[test]
    fn numbers_default_to_minimum_one() {
        let fragment = default_fragment("age", TypeTag::Number).unwrap();
        assert_eq!(fragment.minimum, Some(Number::from(1)));
        assert!(default_fragment("email_count", TypeTag::Number).unwrap().pattern.is_none());
    }

    #[test]
    fn structured_types_get_no_default() {
        for tag in [
            TypeTag::Bool,
            TypeTag::Date,
            TypeTag::Array,
            TypeTag::Object,
            TypeTag::ObjectId,
        ] {
            assert!(default_fragment("email", tag).is_none(), "{tag} got a default");
        }
    }

    #[test]
    fn email_pattern_accepts_addresses_only() {
        let re = Regex::new(EMAIL_PATTERN).unwrap();
        assert!(re.is_match("jane.doe+news@example.co"));
        assert!(!re.is_match("jane.doe@example"));
        assert!(!re.is_match("not an email"));
    }

    #[test]
    fn min_two_letters_pattern_rejects_placeholders() {
        let re = Regex::new(MIN_TWO_LETTERS_PATTERN).unwrap();
        assert!(re.is_match("Al"));
        assert!(re.is_match("1 a b"));
        assert!(!re.is_match(""));
        assert!(!re.is_match("x"));
        assert!(!re.is_match("42"));
    }
}
