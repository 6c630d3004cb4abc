//! Field descriptors and per-resource field bindings

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;
use crate::filter::FilterCriterion;

/// A value bound to a resource field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Number(_) => FieldType::Number,
            FieldValue::Text(_) => FieldType::Text,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // whole numbers are rendered without a trailing ".0" so they match catalog attributes
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Number(value as f64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Number,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text => f.write_str("text"),
            FieldType::Number => f.write_str("number"),
        }
    }
}

/// Declared default of a field. Kept separate from [`FieldValue`] so the
/// per-kind tables can live in `static`s.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldDefault {
    None,
    Text(&'static str),
    Number(f64),
}

impl FieldDefault {
    pub fn to_value(self) -> Option<FieldValue> {
        match self {
            FieldDefault::None => None,
            FieldDefault::Text(s) => Some(FieldValue::Text(s.to_string())),
            FieldDefault::Number(n) => Some(FieldValue::Number(n)),
        }
    }
}

/// One configurable parameter of a resource kind.
///
/// `attribute` is the price list product attribute the field filters on. A
/// field without one is a computation-only parameter and never reaches the
/// catalog.
#[derive(Debug, PartialEq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub attribute: Option<&'static str>,
    pub default: FieldDefault,
    pub required: bool,
    pub field_type: FieldType,
}

impl FieldDescriptor {
    /// Text field sent to the catalog as an exact-match filter
    pub const fn filter(
        name: &'static str,
        attribute: &'static str,
        default: FieldDefault,
        required: bool,
    ) -> Self {
        Self {
            name,
            attribute: Some(attribute),
            default,
            required,
            field_type: FieldType::Text,
        }
    }

    /// Computation-only field
    pub const fn parameter(
        name: &'static str,
        field_type: FieldType,
        default: FieldDefault,
        required: bool,
    ) -> Self {
        Self {
            name,
            attribute: None,
            default,
            required,
            field_type,
        }
    }
}

/// A field of one resource: its descriptor plus the value bound by the caller
#[derive(Clone, Debug)]
pub struct Field {
    descriptor: &'static FieldDescriptor,
    bound: Option<FieldValue>,
}

impl Field {
    pub fn new(descriptor: &'static FieldDescriptor) -> Self {
        Self {
            descriptor,
            bound: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn descriptor(&self) -> &'static FieldDescriptor {
        self.descriptor
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    pub fn bind(&mut self, value: FieldValue) -> Result<(), ConfigError> {
        if value.field_type() != self.descriptor.field_type {
            return Err(ConfigError::InvalidValue {
                field: self.descriptor.name.to_string(),
                reason: format!(
                    "expected a {} value, got {:?}",
                    self.descriptor.field_type, value
                ),
            });
        }

        if let FieldValue::Number(n) = value {
            if !n.is_finite() || n < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: self.descriptor.name.to_string(),
                    reason: format!("expected a finite, non-negative number, got {}", n),
                });
            }
        }

        self.bound = Some(value);
        Ok(())
    }

    /// The bound value when one was provided, otherwise the declared default.
    /// A bound zero or empty string counts as provided.
    pub fn effective_value(&self) -> Option<FieldValue> {
        self.bound
            .clone()
            .or_else(|| self.descriptor.default.to_value())
    }

    /// `None` for computation-only fields and for fields with no value yet
    pub fn to_filter_criterion(&self) -> Option<FilterCriterion> {
        let attribute = self.descriptor.attribute?;
        let value = self.effective_value()?;
        Some(FilterCriterion::term_match(attribute, value.to_string()))
    }
}
