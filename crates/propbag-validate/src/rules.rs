//! Atomic rules.
//!
//! Every rule reads its property through the resolution engine with the
//! container's own search options, except [`Exists`], which only looks at
//! values stored on the container itself.

use std::fmt;
use std::sync::Arc;

use propbag_model::{
    AnyProperty, Property, PropertySource, PropertySourceExt, PropertyValue, SearchOptions,
    Value, ValueSource, ValueType, display_value,
};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::combinators::And;
use crate::error::Result;
use crate::message::{Message, NAME_KEY, PROPERTY_NAME_KEY, VALUE_KEY};
use crate::rule::{ValidationRule, ValidationRuleExt};

pub const NOT_NULL_MESSAGE: &str = "{Name} should not be null.";
pub const EXISTS_MESSAGE: &str = "{Name} is not exists.";
pub const NOT_DEFAULT_MESSAGE: &str = "{Name} should not have default value '{value}'.";
pub const SHOULD_BE_MESSAGE: &str = "{Name} does not satisfy condition.";
pub const ONLY_ALLOWED_VALUES_MESSAGE: &str =
    "{Name} can not be '{value}' because it is not in allowed values list.";
pub const NULLABILITY_MESSAGE: &str =
    "{Name} can not be null because it is declared as not nullable ({type}).";
pub const MIN_LENGTH_MESSAGE: &str =
    "value '{value}' is too short (length: {length}, minLength: {minLength})";
pub const MAX_LENGTH_MESSAGE: &str =
    "value '{value}' is too long (length: {length}, maxLength: {maxLength})";

/// Builds a message with the standard `Name` / `propertyName` / `value` bag.
pub fn property_message(template: &str, property: &AnyProperty, value: Option<&Value>) -> Message {
    Message::new(template)
        .with_property(NAME_KEY, property.name())
        .with_property(PROPERTY_NAME_KEY, property.name())
        .with_property(VALUE_KEY, display_value(value))
}

fn resolve_current(source: &dyn PropertySource, property: &AnyProperty) -> Result<Option<PropertyValue>> {
    Ok(source.get_property_value(property)?)
}

fn failed(rule: &'static str, property: &AnyProperty) {
    trace!(rule, property = property.name(), "rule failed");
}

/// Fails when the resolved value is null or nothing was resolved.
pub struct NotNull<T> {
    property: Property<T>,
}

impl<T: ValueType> NotNull<T> {
    pub fn new(property: &Property<T>) -> Self {
        Self {
            property: property.clone(),
        }
    }
}

impl<T: ValueType> ValidationRule for NotNull<T> {
    fn property(&self) -> &AnyProperty {
        self.property.as_any()
    }

    fn validate(&self, source: &dyn PropertySource) -> Result<Vec<Message>> {
        let resolved = resolve_current(source, self.property.as_any())?;
        if resolved.as_ref().is_some_and(|value| !value.is_null()) {
            return Ok(Vec::new());
        }
        failed("NotNull", self.property());
        Ok(vec![property_message(NOT_NULL_MESSAGE, self.property(), None)])
    }
}

/// Fails when the container itself stores no value for the property.
///
/// A stored null counts as present. Parents, calculation and defaults are
/// not consulted.
pub struct Exists<T> {
    property: Property<T>,
}

impl<T: ValueType> Exists<T> {
    pub fn new(property: &Property<T>) -> Self {
        Self {
            property: property.clone(),
        }
    }
}

impl<T: ValueType> ValidationRule for Exists<T> {
    fn property(&self) -> &AnyProperty {
        self.property.as_any()
    }

    fn validate(&self, source: &dyn PropertySource) -> Result<Vec<Message>> {
        let stored = source.get_property_value_with(self.property(), &SearchOptions::existing_only())?;
        if stored.is_some() {
            return Ok(Vec::new());
        }
        failed("Exists", self.property());
        Ok(vec![property_message(EXISTS_MESSAGE, self.property(), None)])
    }
}

/// Fails when the resolved value equals the type default (`0`, `""`, null for
/// nullable types). A miss counts as the type default.
pub struct NotDefault<T> {
    property: Property<T>,
}

impl<T: ValueType> NotDefault<T> {
    pub fn new(property: &Property<T>) -> Self {
        Self {
            property: property.clone(),
        }
    }
}

impl<T: ValueType> ValidationRule for NotDefault<T> {
    fn property(&self) -> &AnyProperty {
        self.property.as_any()
    }

    fn validate(&self, source: &dyn PropertySource) -> Result<Vec<Message>> {
        let default = T::TYPE.default_value();
        let value = match resolve_current(source, self.property())? {
            Some(resolved) => resolved.into_value(),
            None => default.clone(),
        };
        if value != default {
            return Ok(Vec::new());
        }
        failed("NotDefault", self.property());
        Ok(vec![property_message(
            NOT_DEFAULT_MESSAGE,
            self.property(),
            value.as_ref(),
        )])
    }
}

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Fails when `predicate` rejects the typed value. A miss is checked as the
/// type default.
pub struct ShouldBe<T> {
    property: Property<T>,
    predicate: Predicate<T>,
}

impl<T: ValueType> ShouldBe<T> {
    pub fn new<F>(property: &Property<T>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            property: property.clone(),
            predicate: Arc::new(predicate),
        }
    }
}

impl<T: ValueType> ValidationRule for ShouldBe<T> {
    fn property(&self) -> &AnyProperty {
        self.property.as_any()
    }

    fn validate(&self, source: &dyn PropertySource) -> Result<Vec<Message>> {
        let resolved = resolve_current(source, self.property())?;
        let typed = match &resolved {
            Some(found) => found.value_as::<T>()?,
            None => T::type_default(),
        };
        if (self.predicate)(&typed) {
            return Ok(Vec::new());
        }
        failed("ShouldBe", self.property());
        let value = typed.into_value();
        Ok(vec![property_message(
            SHOULD_BE_MESSAGE,
            self.property(),
            value.as_ref(),
        )])
    }
}

/// Fails when a non-null value is missing from the property's allowed values.
/// Properties without an allowed-values list always pass.
pub struct OnlyAllowedValues<T> {
    property: Property<T>,
}

impl<T: ValueType> OnlyAllowedValues<T> {
    pub fn new(property: &Property<T>) -> Self {
        Self {
            property: property.clone(),
        }
    }
}

impl<T: ValueType> ValidationRule for OnlyAllowedValues<T> {
    fn property(&self) -> &AnyProperty {
        self.property.as_any()
    }

    fn validate(&self, source: &dyn PropertySource) -> Result<Vec<Message>> {
        let Some(allowed) = self.property().allowed_values() else {
            return Ok(Vec::new());
        };
        let Some(value) = resolve_current(source, self.property())?.and_then(PropertyValue::into_value)
        else {
            return Ok(Vec::new());
        };
        if allowed.iter().flatten().any(|candidate| *candidate == value) {
            return Ok(Vec::new());
        }
        failed("OnlyAllowedValues", self.property());
        Ok(vec![property_message(
            ONLY_ALLOWED_VALUES_MESSAGE,
            self.property(),
            Some(&value),
        )])
    }
}

/// Which resolved values [`ShouldMatchNullability`] inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullabilityCheck {
    /// Only values stored on or calculated for the container.
    #[default]
    Lenient,
    /// Any resolved value, including defaults and the not-defined sentinel.
    Strict,
}

impl NullabilityCheck {
    fn inspects(&self, source: ValueSource) -> bool {
        match self {
            NullabilityCheck::Lenient => {
                matches!(source, ValueSource::Defined | ValueSource::Calculated)
            }
            NullabilityCheck::Strict => true,
        }
    }
}

/// Fails when a property declared [`propbag_model::Nullability::NotNull`]
/// resolves to null.
pub struct ShouldMatchNullability<T> {
    property: Property<T>,
    check: NullabilityCheck,
}

impl<T: ValueType> ShouldMatchNullability<T> {
    pub fn new(property: &Property<T>) -> Self {
        Self {
            property: property.clone(),
            check: NullabilityCheck::default(),
        }
    }

    #[must_use]
    pub fn with_check(mut self, check: NullabilityCheck) -> Self {
        self.check = check;
        self
    }
}

impl<T: ValueType> ValidationRule for ShouldMatchNullability<T> {
    fn property(&self) -> &AnyProperty {
        self.property.as_any()
    }

    fn validate(&self, source: &dyn PropertySource) -> Result<Vec<Message>> {
        if self.property().nullability().allows_null() {
            return Ok(Vec::new());
        }
        let Some(resolved) = resolve_current(source, self.property())? else {
            return Ok(Vec::new());
        };
        if !resolved.is_null() || !self.check.inspects(resolved.source()) {
            return Ok(Vec::new());
        }
        failed("ShouldMatchNullability", self.property());
        let message = property_message(NULLABILITY_MESSAGE, self.property(), None)
            .with_property("type", self.property().property_type().to_string());
        Ok(vec![message])
    }
}

/// Text properties, the only ones length rules accept.
pub trait TextValue: ValueType {}

impl TextValue for String {}
impl TextValue for Option<String> {}

fn text_length(source: &dyn PropertySource, property: &AnyProperty) -> Result<Option<(String, usize)>> {
    let value = resolve_current(source, property)?.and_then(PropertyValue::into_value);
    Ok(match value {
        Some(Value::Text(text)) => {
            let length = text.chars().count();
            Some((text, length))
        }
        _ => None,
    })
}

/// Fails when a non-null text value has fewer than `min_length` characters.
pub struct MinLength<T> {
    property: Property<T>,
    min_length: usize,
}

impl<T: TextValue> MinLength<T> {
    pub fn new(property: &Property<T>, min_length: usize) -> Self {
        Self {
            property: property.clone(),
            min_length,
        }
    }
}

impl<T: TextValue> ValidationRule for MinLength<T> {
    fn property(&self) -> &AnyProperty {
        self.property.as_any()
    }

    fn validate(&self, source: &dyn PropertySource) -> Result<Vec<Message>> {
        let Some((text, length)) = text_length(source, self.property())? else {
            return Ok(Vec::new());
        };
        if length >= self.min_length {
            return Ok(Vec::new());
        }
        failed("MinLength", self.property());
        let message = property_message(MIN_LENGTH_MESSAGE, self.property(), Some(&Value::Text(text)))
            .with_property("length", length.to_string())
            .with_property("minLength", self.min_length.to_string());
        Ok(vec![message])
    }
}

/// Fails when a non-null text value has more than `max_length` characters.
pub struct MaxLength<T> {
    property: Property<T>,
    max_length: usize,
}

impl<T: TextValue> MaxLength<T> {
    pub fn new(property: &Property<T>, max_length: usize) -> Self {
        Self {
            property: property.clone(),
            max_length,
        }
    }
}

impl<T: TextValue> ValidationRule for MaxLength<T> {
    fn property(&self) -> &AnyProperty {
        self.property.as_any()
    }

    fn validate(&self, source: &dyn PropertySource) -> Result<Vec<Message>> {
        let Some((text, length)) = text_length(source, self.property())? else {
            return Ok(Vec::new());
        };
        if length <= self.max_length {
            return Ok(Vec::new());
        }
        failed("MaxLength", self.property());
        let message = property_message(MAX_LENGTH_MESSAGE, self.property(), Some(&Value::Text(text)))
            .with_property("length", length.to_string())
            .with_property("maxLength", self.max_length.to_string());
        Ok(vec![message])
    }
}

macro_rules! debug_rule {
    ($($rule:ident),* $(,)?) => {
        $(
            impl<T> fmt::Debug for $rule<T> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($rule))
                        .field("property", &self.property)
                        .finish_non_exhaustive()
                }
            }
        )*
    };
}

debug_rule!(
    NotNull,
    Exists,
    NotDefault,
    ShouldBe,
    OnlyAllowedValues,
    ShouldMatchNullability,
    MinLength,
    MaxLength,
);

pub fn not_null<T: ValueType>(property: &Property<T>) -> NotNull<T> {
    NotNull::new(property)
}

pub fn exists<T: ValueType>(property: &Property<T>) -> Exists<T> {
    Exists::new(property)
}

pub fn not_default<T: ValueType>(property: &Property<T>) -> NotDefault<T> {
    NotDefault::new(property)
}

pub fn should_be<T, F>(property: &Property<T>, predicate: F) -> ShouldBe<T>
where
    T: ValueType,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    ShouldBe::new(property, predicate)
}

pub fn only_allowed_values<T: ValueType>(property: &Property<T>) -> OnlyAllowedValues<T> {
    OnlyAllowedValues::new(property)
}

pub fn should_match_nullability<T: ValueType>(property: &Property<T>) -> ShouldMatchNullability<T> {
    ShouldMatchNullability::new(property)
}

pub fn min_length<T: TextValue>(property: &Property<T>, min_length: usize) -> MinLength<T> {
    MinLength::new(property, min_length)
}

pub fn max_length<T: TextValue>(property: &Property<T>, max_length: usize) -> MaxLength<T> {
    MaxLength::new(property, max_length)
}

/// The property must be stored on the container and must not be null.
pub fn required<T: ValueType>(property: &Property<T>) -> And<Exists<T>, NotNull<T>> {
    exists(property).and(not_null(property))
}
