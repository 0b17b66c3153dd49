//! Dynamic values and the closed set of property types.
//!
//! Every property stores its value as an `Option<Value>` where `None` is null.
//! [`ValueType`] bridges that representation to plain Rust types: `i64` is a
//! non-nullable `Int` property, `Option<i64>` is a nullable one.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Scalar type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    Bool,
    Int,
    Float,
    Text,
    Date,
    DateTime,
}

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Bool => "Bool",
            TypeTag::Int => "Int",
            TypeTag::Float => "Float",
            TypeTag::Text => "Text",
            TypeTag::Date => "Date",
            TypeTag::DateTime => "DateTime",
        }
    }

    /// Default value of the non-nullable scalar (`0`, `""`, `false`, ...).
    pub fn default_value(&self) -> Value {
        match self {
            TypeTag::Bool => Value::Bool(false),
            TypeTag::Int => Value::Int(0),
            TypeTag::Float => Value::Float(0.0),
            TypeTag::Text => Value::Text(String::new()),
            TypeTag::Date => Value::Date(NaiveDate::default()),
            TypeTag::DateTime => Value::DateTime(NaiveDateTime::default()),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a property: a scalar tag plus nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyType {
    pub tag: TypeTag,
    pub nullable: bool,
}

impl PropertyType {
    pub const fn new(tag: TypeTag, nullable: bool) -> Self {
        Self { tag, nullable }
    }

    /// The value `default(T)` for this type: null for nullable types.
    pub fn default_value(&self) -> Option<Value> {
        if self.nullable {
            None
        } else {
            Some(self.tag.default_value())
        }
    }

    /// Returns true if `value` can be stored under this type.
    pub fn accepts(&self, value: Option<&Value>) -> bool {
        match value {
            None => self.nullable,
            Some(value) => value.tag() == self.tag,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}?", self.tag)
        } else {
            write!(f, "{}", self.tag)
        }
    }
}

/// A non-null property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Text(_) => TypeTag::Text,
            Value::Date(_) => TypeTag::Date,
            Value::DateTime(_) => TypeTag::DateTime,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Text(value) => f.write_str(value),
            Value::Date(value) => write!(f, "{}", value.format(DATE_FORMAT)),
            Value::DateTime(value) => write!(f, "{}", value.format(DATE_TIME_FORMAT)),
        }
    }
}

/// Formats an optional value, rendering null as `null`.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "null".to_string(),
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

/// Rust types that can be stored in a property.
///
/// Implemented for `bool`, `i64`, `f64`, `String`, [`NaiveDate`],
/// [`NaiveDateTime`] and `Option` of each.
pub trait ValueType: Clone + Send + Sync + 'static {
    const TYPE: PropertyType;

    fn into_value(self) -> Option<Value>;

    /// Converts back from the stored form. Returns `None` when the stored
    /// value does not fit this type.
    fn from_value(value: Option<&Value>) -> Option<Self>;

    fn type_default() -> Self;
}

macro_rules! impl_value_type {
    ($ty:ty, $tag:ident, $default:expr) => {
        impl ValueType for $ty {
            const TYPE: PropertyType = PropertyType::new(TypeTag::$tag, false);

            fn into_value(self) -> Option<Value> {
                Some(Value::$tag(self))
            }

            fn from_value(value: Option<&Value>) -> Option<Self> {
                match value {
                    Some(Value::$tag(value)) => Some(value.to_owned()),
                    _ => None,
                }
            }

            fn type_default() -> Self {
                $default
            }
        }

        impl ValueType for Option<$ty> {
            const TYPE: PropertyType = PropertyType::new(TypeTag::$tag, true);

            fn into_value(self) -> Option<Value> {
                self.map(Value::$tag)
            }

            fn from_value(value: Option<&Value>) -> Option<Self> {
                match value {
                    None => Some(None),
                    Some(Value::$tag(value)) => Some(Some(value.to_owned())),
                    Some(_) => None,
                }
            }

            fn type_default() -> Self {
                None
            }
        }
    };
}

impl_value_type!(bool, Bool, false);
impl_value_type!(i64, Int, 0);
impl_value_type!(f64, Float, 0.0);
impl_value_type!(String, Text, String::new());
impl_value_type!(NaiveDate, Date, NaiveDate::default());
impl_value_type!(NaiveDateTime, DateTime, NaiveDateTime::default());
