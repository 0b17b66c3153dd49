//! Property containers.
//!
//! [`PropertySource`] is the read interface the resolution engine and the
//! validation rules work against. [`PropertyContainer`] is the immutable
//! implementation, [`MutablePropertyContainer`] the single-writer builder
//! used by parsers before the container is frozen and shared.

use std::sync::Arc;

use tracing::trace;

use crate::error::{ModelError, Result};
use crate::property::{AnyProperty, Property};
use crate::property_value::{PropertyValue, ValueSource, check_storable};
use crate::schema::PropertySet;
use crate::search::SearchOptions;
use crate::value::{PropertyType, Value, ValueType};

/// Read access to an ordered bag of property values with optional parent.
pub trait PropertySource: std::fmt::Debug + Send + Sync {
    /// Stored values in insertion order.
    fn properties(&self) -> &[PropertyValue];

    /// Parent consulted when a search misses and parent search is enabled.
    fn parent(&self) -> Option<&Arc<dyn PropertySource>>;

    /// Options used when a lookup does not pass its own.
    fn search_options(&self) -> SearchOptions {
        SearchOptions::default()
    }

    fn count(&self) -> usize {
        self.properties().len()
    }
}

/// Immutable property container. Safe to share across threads for reading.
#[derive(Debug, Clone, Default)]
pub struct PropertyContainer {
    values: Vec<PropertyValue>,
    parent: Option<Arc<dyn PropertySource>>,
    search_options: SearchOptions,
}

impl PropertyContainer {
    /// Builds a container from stored values. A `NotDefined` sentinel is
    /// rejected.
    pub fn new<I>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = PropertyValue>,
    {
        let values = values
            .into_iter()
            .map(|value| check_storable(value.property(), value.source()).map(|()| value))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            values,
            parent: None,
            search_options: SearchOptions::default(),
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_parent(mut self, parent: Arc<dyn PropertySource>) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_search_options(mut self, search_options: SearchOptions) -> Self {
        self.search_options = search_options;
        self
    }

    /// Copies the container into a new mutable one.
    pub fn to_mutable(&self) -> MutablePropertyContainer {
        MutablePropertyContainer {
            values: self.values.clone(),
            parent: self.parent.clone(),
            search_options: self.search_options.clone(),
        }
    }

    /// Wraps the container for use as another container's parent.
    pub fn into_shared(self) -> Arc<dyn PropertySource> {
        Arc::new(self)
    }
}

impl PropertySource for PropertyContainer {
    fn properties(&self) -> &[PropertyValue] {
        &self.values
    }

    fn parent(&self) -> Option<&Arc<dyn PropertySource>> {
        self.parent.as_ref()
    }

    fn search_options(&self) -> SearchOptions {
        self.search_options.clone()
    }
}

/// Mutable property container. Assumes a single writer.
///
/// Setters replace an existing value for the same property in place and
/// append otherwise; [`MutablePropertyContainer::add`] always appends.
#[derive(Debug, Clone, Default)]
pub struct MutablePropertyContainer {
    values: Vec<PropertyValue>,
    parent: Option<Arc<dyn PropertySource>>,
    search_options: SearchOptions,
}

impl MutablePropertyContainer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_parent(mut self, parent: Arc<dyn PropertySource>) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_search_options(mut self, search_options: SearchOptions) -> Self {
        self.search_options = search_options;
        self
    }

    pub fn set_parent(&mut self, parent: Option<Arc<dyn PropertySource>>) {
        self.parent = parent;
    }

    pub fn set_search_options(&mut self, search_options: SearchOptions) {
        self.search_options = search_options;
    }

    /// Appends a value without looking for an existing one. A `NotDefined`
    /// sentinel, as returned by a failed search, is rejected.
    pub fn add(&mut self, value: PropertyValue) -> Result<()> {
        check_storable(value.property(), value.source())?;
        trace!(property = value.property().name(), source = %value.source(), "add property value");
        self.values.push(value);
        Ok(())
    }

    /// Appends every value, stopping at the first rejected one.
    pub fn add_range<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = PropertyValue>,
    {
        for value in values {
            self.add(value)?;
        }
        Ok(())
    }

    pub fn set_value<T: ValueType>(&mut self, property: &Property<T>, value: T) -> PropertyValue {
        self.upsert(PropertyValue::from_trusted(
            property.as_any().clone(),
            value.into_value(),
            ValueSource::Defined,
        ))
    }

    /// Sets a typed value with an explicit source. `NotDefined` is rejected
    /// and leaves any stored value untouched.
    pub fn set_value_with_source<T: ValueType>(
        &mut self,
        property: &Property<T>,
        value: T,
        source: ValueSource,
    ) -> Result<PropertyValue> {
        let value = PropertyValue::typed(property, value, source)?;
        Ok(self.upsert(value))
    }

    /// Sets a dynamically typed value, failing on a type or nullability mismatch.
    pub fn set_value_untyped(
        &mut self,
        property: &AnyProperty,
        value: Option<Value>,
        source: ValueSource,
    ) -> Result<PropertyValue> {
        let value = PropertyValue::new(property.clone(), value, source)?;
        Ok(self.upsert(value))
    }

    /// Sets a value by property name or alias.
    ///
    /// An existing property with that name keeps its type and the value is
    /// checked against it. Otherwise a nullable property is created with the
    /// value's type; a null value then has no type to take and is rejected.
    pub fn set_by_name(&mut self, name: &str, value: Option<Value>) -> Result<PropertyValue> {
        let existing = self
            .values
            .iter()
            .find(|stored| stored.property().matches_name(name, false, true))
            .map(|stored| stored.property().clone());
        let property = match (existing, &value) {
            (Some(property), _) => property,
            (None, Some(value)) => AnyProperty::untyped(name, PropertyType::new(value.tag(), true)),
            (None, None) => {
                return Err(ModelError::AmbiguousType {
                    property: name.to_string(),
                });
            }
        };
        self.set_value_untyped(&property, value, ValueSource::Defined)
    }

    /// Sets a value for the schema property named `name`, falling back to
    /// [`MutablePropertyContainer::set_by_name`] for names the schema lacks.
    pub fn set_from_schema(
        &mut self,
        schema: &PropertySet,
        name: &str,
        value: Option<Value>,
    ) -> Result<PropertyValue> {
        match schema.get(name) {
            Some(property) => self.set_value_untyped(property, value, ValueSource::Defined),
            None => self.set_by_name(name, value),
        }
    }

    /// Removes the first value stored for `property`.
    pub fn remove(&mut self, property: &AnyProperty) -> Option<PropertyValue> {
        let index = self
            .values
            .iter()
            .position(|stored| stored.property().same_as(property))?;
        Some(self.values.remove(index))
    }

    /// Removes the first value whose property name or alias is `name`.
    pub fn remove_by_name(&mut self, name: &str) -> Option<PropertyValue> {
        let index = self
            .values
            .iter()
            .position(|stored| stored.property().matches_name(name, false, true))?;
        Some(self.values.remove(index))
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Freezes into an immutable container.
    pub fn freeze(self) -> PropertyContainer {
        PropertyContainer {
            values: self.values,
            parent: self.parent,
            search_options: self.search_options,
        }
    }

    fn upsert(&mut self, value: PropertyValue) -> PropertyValue {
        trace!(property = value.property().name(), source = %value.source(), "set property value");
        match self
            .values
            .iter_mut()
            .find(|stored| stored.property().same_as(value.property()))
        {
            Some(stored) => *stored = value.clone(),
            None => self.values.push(value.clone()),
        }
        value
    }
}

impl PropertySource for MutablePropertyContainer {
    fn properties(&self) -> &[PropertyValue] {
        &self.values
    }

    fn parent(&self) -> Option<&Arc<dyn PropertySource>> {
        self.parent.as_ref()
    }

    fn search_options(&self) -> SearchOptions {
        self.search_options.clone()
    }
}
