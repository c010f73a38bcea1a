use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Number, Value};
use thiserror::Error;

/// Annotation as reported by a discovery provider: a name plus raw arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAnnotation {
    pub name: String,
    pub args: BTreeMap<String, Value>,
}

impl RawAnnotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: BTreeMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Recognized kind of this annotation, if any.
    pub fn kind(&self) -> Option<AnnotationKind> {
        AnnotationKind::from_name(&self.name)
    }

    fn arg(&self, key: &str) -> Option<&Value> {
        self.args.get(key).filter(|value| !value.is_null())
    }
}

/// Fixed annotation vocabulary understood by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    FixedLengthNumeric,
    Pattern,
    LengthBounds,
    NumericBounds,
    NoDefaultConstraint,
}

impl AnnotationKind {
    /// Resolve an annotation name, accepting the short aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "FixedLengthNumeric" | "FixLenNum" => Some(AnnotationKind::FixedLengthNumeric),
            "Pattern" | "Regex" => Some(AnnotationKind::Pattern),
            "LengthBounds" | "Len" => Some(AnnotationKind::LengthBounds),
            "NumericBounds" | "NumLimit" => Some(AnnotationKind::NumericBounds),
            "NoDefaultConstraint" | "NoDef" => Some(AnnotationKind::NoDefaultConstraint),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AnnotationKind::FixedLengthNumeric => "FixedLengthNumeric",
            AnnotationKind::Pattern => "Pattern",
            AnnotationKind::LengthBounds => "LengthBounds",
            AnnotationKind::NumericBounds => "NumericBounds",
            AnnotationKind::NoDefaultConstraint => "NoDefaultConstraint",
        }
    }

    /// The exemption marker carries no constraint of its own.
    pub fn is_constraint(self) -> bool {
        !matches!(self, AnnotationKind::NoDefaultConstraint)
    }
}

/// Why a constraint annotation's arguments could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("missing argument `{0}`")]
    Missing(&'static str),
    #[error("argument `{arg}` {reason}")]
    Invalid { arg: &'static str, reason: String },
    #[error("`{0}` is not a constraint annotation")]
    NotAConstraint(String),
}

/// Typed constraint annotation. `None` bounds are unbounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintAnnotation {
    FixedLengthNumeric { len: u32 },
    Pattern { pattern: String },
    LengthBounds { min: u64, max: Option<u64> },
    NumericBounds { min: Option<Number>, max: Option<Number> },
}

impl ConstraintAnnotation {
    /// Extract a typed constraint from a raw annotation.
    pub fn from_raw(raw: &RawAnnotation) -> Result<Self, ExtractError> {
        let kind = raw
            .kind()
            .filter(|kind| kind.is_constraint())
            .ok_or_else(|| ExtractError::NotAConstraint(raw.name.clone()))?;

        match kind {
            AnnotationKind::FixedLengthNumeric => {
                let len = raw.arg("len").ok_or(ExtractError::Missing("len"))?;
                let len = len
                    .as_u64()
                    .filter(|len| *len > 0)
                    .and_then(|len| u32::try_from(len).ok())
                    .ok_or_else(|| invalid("len", "must be a positive integer"))?;
                Ok(ConstraintAnnotation::FixedLengthNumeric { len })
            }
            AnnotationKind::Pattern => {
                let pattern = raw.arg("pattern").ok_or(ExtractError::Missing("pattern"))?;
                let pattern = pattern
                    .as_str()
                    .filter(|pattern| !pattern.is_empty())
                    .ok_or_else(|| invalid("pattern", "must be a non-empty string"))?;
                Ok(ConstraintAnnotation::Pattern {
                    pattern: pattern.to_string(),
                })
            }
            AnnotationKind::LengthBounds => {
                let min = match raw.arg("min") {
                    Some(value) => value
                        .as_u64()
                        .ok_or_else(|| invalid("min", "must be a non-negative integer"))?,
                    None => 0,
                };
                let max = match raw.arg("max") {
                    Some(value) => Some(
                        value
                            .as_u64()
                            .ok_or_else(|| invalid("max", "must be a non-negative integer"))?,
                    ),
                    None => None,
                };
                if let Some(max) = max {
                    if max < min {
                        return Err(invalid("max", format!("{max} is lower than min {min}")));
                    }
                }
                Ok(ConstraintAnnotation::LengthBounds { min, max })
            }
            AnnotationKind::NumericBounds => {
                let min = numeric_arg(raw, "min")?;
                let max = numeric_arg(raw, "max")?;
                if let (Some(min), Some(max)) = (&min, &max) {
                    let (low, high) = (as_f64(min), as_f64(max));
                    if high < low {
                        return Err(invalid("max", format!("{max} is lower than min {min}")));
                    }
                }
                Ok(ConstraintAnnotation::NumericBounds { min, max })
            }
            AnnotationKind::NoDefaultConstraint => {
                Err(ExtractError::NotAConstraint(raw.name.clone()))
            }
        }
    }
}

fn numeric_arg(raw: &RawAnnotation, key: &'static str) -> Result<Option<Number>, ExtractError> {
    match raw.arg(key) {
        Some(Value::Number(number)) => Ok(Some(number.clone())),
        Some(_) => Err(invalid(key, "must be a number")),
        None => Ok(None),
    }
}

fn as_f64(number: &Number) -> f64 {
    number.as_f64().unwrap_or(f64::NAN)
}

fn invalid(arg: &'static str, reason: impl Into<String>) -> ExtractError {
    ExtractError::Invalid {
        arg,
        reason: reason.into(),
    }
}
