use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::property::{AnyProperty, Property};
use crate::value::{Value, ValueType, display_value};

/// Provenance of a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueSource {
    /// Stored explicitly in a container.
    Defined,
    /// Produced by the property's calculate function.
    Calculated,
    /// Produced by the property's default-value supplier.
    DefaultValue,
    /// Sentinel for a failed search. Never stored.
    NotDefined,
}

impl ValueSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Defined => "Defined",
            Self::Calculated => "Calculated",
            Self::DefaultValue => "DefaultValue",
            Self::NotDefined => "NotDefined",
        }
    }
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved `(property, value, source)` triple.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    property: AnyProperty,
    value: Option<Value>,
    source: ValueSource,
}

impl PropertyValue {
    /// Creates a property value, checking the value against the property type.
    ///
    /// `NotDefined` is refused; [`PropertyValue::not_defined`] is the only way
    /// to build the sentinel.
    pub fn new(property: AnyProperty, value: Option<Value>, source: ValueSource) -> Result<Self> {
        check_storable(&property, source)?;
        check_value(&property, value.as_ref())?;
        Ok(Self {
            property,
            value,
            source,
        })
    }

    /// Creates a typed property value. `NotDefined` is refused.
    pub fn typed<T: ValueType>(property: &Property<T>, value: T, source: ValueSource) -> Result<Self> {
        check_storable(property.as_any(), source)?;
        Ok(Self {
            property: property.as_any().clone(),
            value: value.into_value(),
            source,
        })
    }

    /// The `NotDefined` sentinel: carries the type default as its value.
    pub fn not_defined(property: AnyProperty) -> Self {
        let value = property.property_type().default_value();
        Self {
            property,
            value,
            source: ValueSource::NotDefined,
        }
    }

    /// Values produced by typed suppliers are well-typed by construction.
    pub(crate) fn from_trusted(property: AnyProperty, value: Option<Value>, source: ValueSource) -> Self {
        Self {
            property,
            value,
            source,
        }
    }

    pub fn property(&self) -> &AnyProperty {
        &self.property
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<Value> {
        self.value
    }

    pub fn source(&self) -> ValueSource {
        self.source
    }

    pub fn is_not_defined(&self) -> bool {
        self.source == ValueSource::NotDefined
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    pub fn display_value(&self) -> String {
        display_value(self.value.as_ref())
    }

    /// Converts the value to `T`, failing on a type or nullability mismatch.
    pub fn value_as<T: ValueType>(&self) -> Result<T> {
        let requested = T::TYPE;
        let declared = self.property.property_type();
        if requested.tag != declared.tag {
            return Err(ModelError::TypeMismatch {
                property: self.property.name().to_string(),
                expected: declared.to_string(),
                actual: requested.to_string(),
            });
        }
        T::from_value(self.value.as_ref()).ok_or_else(|| ModelError::NullNotAllowed {
            property: self.property.name().to_string(),
            expected: requested.to_string(),
        })
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.property.name(),
            self.display_value(),
            self.source
        )
    }
}

/// Fails for the `NotDefined` source, which only a failed search may carry.
pub(crate) fn check_storable(property: &AnyProperty, source: ValueSource) -> Result<()> {
    if source == ValueSource::NotDefined {
        return Err(ModelError::SentinelNotStorable {
            property: property.name().to_string(),
        });
    }
    Ok(())
}

fn check_value(property: &AnyProperty, value: Option<&Value>) -> Result<()> {
    let expected = property.property_type();
    match value {
        None if !expected.nullable => Err(ModelError::NullNotAllowed {
            property: property.name().to_string(),
            expected: expected.to_string(),
        }),
        Some(value) if value.tag() != expected.tag => Err(ModelError::TypeMismatch {
            property: property.name().to_string(),
            expected: expected.to_string(),
            actual: value.tag().to_string(),
        }),
        _ => Ok(()),
    }
}
