use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use mongoschema_core::{AnnotationKind, ConstraintAnnotation, DeclarationGraph};
use serde::{Serialize, Serializer};
use serde_json::Number;

use crate::errors::{CompileError, Result};
use crate::node::SchemaNode;

/// Join key between a field declaration and its registered constraints.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstraintKey {
    pub record: String,
    pub field: String,
}

impl ConstraintKey {
    pub fn new(record: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            record: record.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for ConstraintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.record, self.field)
    }
}

impl Serialize for ConstraintKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Partial set of schema keywords attached to a field node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintFragment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
}

impl ConstraintFragment {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Self::default()
        }
    }

    pub fn minimum(minimum: impl Into<Number>) -> Self {
        Self {
            minimum: Some(minimum.into()),
            ..Self::default()
        }
    }

    /// Translate an annotation into schema keywords.
    pub fn from_annotation(annotation: &ConstraintAnnotation) -> Self {
        match annotation {
            ConstraintAnnotation::FixedLengthNumeric { len } => {
                Self::pattern(format!("^\\d{{{len}}}$"))
            }
            ConstraintAnnotation::Pattern { pattern } => Self::pattern(pattern.clone()),
            ConstraintAnnotation::LengthBounds { min, max } => Self {
                min_length: Some(*min),
                max_length: *max,
                ..Self::default()
            },
            ConstraintAnnotation::NumericBounds { min, max } => Self {
                minimum: min.clone(),
                maximum: max.clone(),
                ..Self::default()
            },
        }
    }

    /// Merge the present keywords into `node`, leaving the others untouched.
    pub fn apply_to(&self, node: &mut SchemaNode) {
        if let Some(pattern) = &self.pattern {
            node.pattern = Some(pattern.clone());
        }
        if let Some(min_length) = self.min_length {
            node.min_length = Some(min_length);
        }
        if let Some(max_length) = self.max_length {
            node.max_length = Some(max_length);
        }
        if let Some(minimum) = &self.minimum {
            node.minimum = Some(minimum.clone());
        }
        if let Some(maximum) = &self.maximum {
            node.maximum = Some(maximum.clone());
        }
    }
}

/// Explicit field constraints and default-constraint exemptions, collected
/// once over the whole declaration graph before any schema is built.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConstraintRegistry {
    constraints: BTreeMap<ConstraintKey, ConstraintFragment>,
    exemptions: BTreeSet<ConstraintKey>,
}

impl ConstraintRegistry {
    /// Scan every annotated field of `graph`.
    pub fn collect(graph: &DeclarationGraph) -> Result<Self> {
        let mut registry = Self::default();

        for record in graph.records() {
            for property in &record.properties {
                let key = ConstraintKey::new(&record.name, &property.name);
                let mut explicit: Option<(AnnotationKind, ConstraintFragment)> = None;

                for raw in &property.annotations {
                    let Some(kind) = raw.kind() else {
                        tracing::debug!(
                            event = "annotation_ignored",
                            key = %key,
                            annotation = %raw.name
                        );
                        continue;
                    };

                    if !kind.is_constraint() {
                        registry.exemptions.insert(key.clone());
                        continue;
                    }

                    if let Some((previous, _)) = &explicit {
                        return Err(CompileError::AnnotationInconsistency {
                            key,
                            annotation: kind.name().to_string(),
                            reason: format!("conflicts with {}", previous.name()),
                        });
                    }

                    let annotation = ConstraintAnnotation::from_raw(raw).map_err(|err| {
                        CompileError::AnnotationInconsistency {
                            key: key.clone(),
                            annotation: kind.name().to_string(),
                            reason: err.to_string(),
                        }
                    })?;
                    explicit = Some((kind, ConstraintFragment::from_annotation(&annotation)));
                }

                if let Some((_, fragment)) = explicit {
                    registry.constraints.insert(key, fragment);
                }
            }
        }

        tracing::debug!(
            event = "registry_collected",
            constraints = registry.constraints.len(),
            exemptions = registry.exemptions.len()
        );

        Ok(registry)
    }

    pub fn fragment(&self, key: &ConstraintKey) -> Option<&ConstraintFragment> {
        self.constraints.get(key)
    }

    pub fn is_exempt(&self, key: &ConstraintKey) -> bool {
        self.exemptions.contains(key)
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn exemption_count(&self) -> usize {
        self.exemptions.len()
    }
}
