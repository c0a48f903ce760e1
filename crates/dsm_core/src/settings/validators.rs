//! Value validation rules for settings keys.
//!
//! Rejection is a first-class return value, not a panic: `validate`
//! yields `Err(reason)` with a short explanation naming the violated
//! constraint. The registry converts rejections to errors at its
//! public boundary.

use regex::Regex;
use serde_json::Value;

/// Runtime kind of a JSON value.
///
/// Booleans and integers are distinct kinds, so a `true` can never
/// slip through where an integer was required (or vice versa).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Classify a JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Float,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Name used in rejection reasons and schema descriptions.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A validation rule attached to a settings key.
///
/// The rule set is closed; matching is exhaustive, so adding a rule
/// kind makes the compiler point at every place that must handle it.
#[derive(Debug, Clone)]
pub enum Validator {
    /// Numeric bounds check; either bound may be open.
    Range { min: Option<f64>, max: Option<f64> },
    /// Membership in a fixed set of allowed values.
    Enum { allowed: Vec<Value> },
    /// Runtime kind check against one or more accepted kinds.
    Type { expected: Vec<ValueKind> },
    /// Pattern match over a string candidate.
    Regex { pattern: Regex },
    /// Every child must accept; the first failure wins.
    Composite { children: Vec<Validator> },
}

impl Validator {
    /// Range with both bounds.
    pub fn range(min: f64, max: f64) -> Self {
        Self::Range {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Range with only a lower bound.
    pub fn at_least(min: f64) -> Self {
        Self::Range {
            min: Some(min),
            max: None,
        }
    }

    /// Range with only an upper bound.
    pub fn at_most(max: f64) -> Self {
        Self::Range {
            min: None,
            max: Some(max),
        }
    }

    /// Enum over string choices.
    pub fn one_of(choices: &[&str]) -> Self {
        Self::Enum {
            allowed: choices.iter().map(|c| Value::from(*c)).collect(),
        }
    }

    /// Type check for a single kind.
    pub fn of_kind(kind: ValueKind) -> Self {
        Self::Type {
            expected: vec![kind],
        }
    }

    /// Type check accepting any of the given kinds.
    pub fn of_kinds(kinds: &[ValueKind]) -> Self {
        Self::Type {
            expected: kinds.to_vec(),
        }
    }

    /// Pattern match with a pre-compiled regex.
    pub fn pattern(pattern: Regex) -> Self {
        Self::Regex { pattern }
    }

    /// Conjunction of several rules.
    pub fn all_of(children: Vec<Validator>) -> Self {
        Self::Composite { children }
    }

    /// Check a candidate value, returning the reason on rejection.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        match self {
            Self::Range { min, max } => {
                let Some(number) = as_number(value) else {
                    return Err(format!("expected a number, got {}", ValueKind::of(value)));
                };
                if let Some(min) = min {
                    if number < *min {
                        return Err(format!("{} is below minimum {}", number, min));
                    }
                }
                if let Some(max) = max {
                    if number > *max {
                        return Err(format!("{} is above maximum {}", number, max));
                    }
                }
                Ok(())
            }
            Self::Enum { allowed } => {
                if allowed.contains(value) {
                    Ok(())
                } else {
                    Err(format!(
                        "{} is not one of {}",
                        value,
                        Value::Array(allowed.clone())
                    ))
                }
            }
            Self::Type { expected } => {
                let kind = ValueKind::of(value);
                if expected.contains(&kind) {
                    Ok(())
                } else {
                    Err(format!("expected {}, got {}", kind_list(expected), kind))
                }
            }
            Self::Regex { pattern } => {
                let Some(text) = value.as_str() else {
                    return Err(format!("expected a string, got {}", ValueKind::of(value)));
                };
                if pattern.is_match(text) {
                    Ok(())
                } else {
                    Err(format!("'{}' does not match {}", text, pattern.as_str()))
                }
            }
            Self::Composite { children } => {
                for child in children {
                    child.validate(value)?;
                }
                Ok(())
            }
        }
    }

    /// One-line description of the rule, for schema export.
    pub fn describe(&self) -> String {
        match self {
            Self::Range { min, max } => match (min, max) {
                (Some(min), Some(max)) => format!("number in [{}, {}]", min, max),
                (Some(min), None) => format!("number >= {}", min),
                (None, Some(max)) => format!("number <= {}", max),
                (None, None) => "any number".to_string(),
            },
            Self::Enum { allowed } => format!("one of {}", Value::Array(allowed.clone())),
            Self::Type { expected } => format!("type {}", kind_list(expected)),
            Self::Regex { pattern } => format!("matches {}", pattern.as_str()),
            Self::Composite { children } => children
                .iter()
                .map(|c| c.describe())
                .collect::<Vec<_>>()
                .join(" and "),
        }
    }
}

/// Numeric view of a candidate; booleans are not numbers.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn kind_list(kinds: &[ValueKind]) -> String {
    kinds
        .iter()
        .map(|k| k.name())
        .collect::<Vec<_>>()
        .join(" or ")
}
