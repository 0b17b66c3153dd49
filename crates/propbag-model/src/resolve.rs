//! Property value resolution.
//!
//! A lookup walks four steps in order and stops at the first hit:
//!
//! 1. stored values of the container, then of each parent when
//!    [`SearchOptions::search_in_parent`] is set;
//! 2. the property's calculate function, invoked with the container the
//!    lookup started from;
//! 3. the property's default-value supplier;
//! 4. the `NotDefined` sentinel, or nothing.
//!
//! A stored `null` is a hit. Stored values whose source is `NotDefined` are
//! skipped.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::container::PropertySource;
use crate::error::{ModelError, Result};
use crate::logging::redact_value;
use crate::property::{AnyProperty, Property};
use crate::property_value::{PropertyValue, ValueSource};
use crate::search::{PropertyComparer, SearchOptions};
use crate::value::{PropertyType, ValueType};

/// Maximum number of parent links followed before the chain is treated as cyclic.
pub const MAX_PARENT_DEPTH: usize = 64;

/// Resolves `property` against `source`.
///
/// Returns `Ok(None)` only when every step misses and
/// [`SearchOptions::return_not_defined`] is off.
pub fn resolve(
    source: &dyn PropertySource,
    property: &AnyProperty,
    options: &SearchOptions,
) -> Result<Option<PropertyValue>> {
    let wanted = options.search_property.as_ref().unwrap_or(property);

    if let Some(stored) = find_stored(source, wanted, options)? {
        trace!(property = wanted.name(), source = %stored.source(), "resolved stored value");
        return Ok(Some(stored));
    }

    if options.calculate_value
        && let Some(value) = wanted.calculate(source)?
    {
        debug!(
            property = wanted.name(),
            value = %redact_value(value.as_ref()),
            "calculated property value"
        );
        return Ok(Some(PropertyValue::from_trusted(
            wanted.clone(),
            value,
            ValueSource::Calculated,
        )));
    }

    if options.use_default_value
        && let Some(value) = wanted.default_value()
    {
        trace!(property = wanted.name(), "resolved default value");
        return Ok(Some(PropertyValue::from_trusted(
            wanted.clone(),
            value,
            ValueSource::DefaultValue,
        )));
    }

    trace!(
        property = wanted.name(),
        return_not_defined = options.return_not_defined,
        "property not defined"
    );
    Ok(options
        .return_not_defined
        .then(|| PropertyValue::not_defined(wanted.clone())))
}

/// Resolves a property by name or alias.
///
/// A prototype property of `property_type` is searched for. Reference
/// comparison cannot match a prototype, so it is upgraded to name-or-alias.
/// A stored property whose type tag differs from `property_type` is an error.
pub fn resolve_by_name(
    source: &dyn PropertySource,
    name: &str,
    property_type: PropertyType,
    options: &SearchOptions,
) -> Result<Option<PropertyValue>> {
    let prototype = AnyProperty::untyped(name, property_type);
    let comparer = match options.property_comparer {
        PropertyComparer::ByReference => PropertyComparer::ByNameOrAlias,
        other => other,
    };
    let options = options
        .clone()
        .with_search_property(Some(prototype.clone()))
        .with_comparer(comparer);

    let resolved = resolve(source, &prototype, &options)?;
    if let Some(found) = &resolved {
        let stored = found.property().property_type();
        if stored.tag != property_type.tag {
            return Err(ModelError::TypeMismatch {
                property: name.to_string(),
                expected: stored.to_string(),
                actual: property_type.to_string(),
            });
        }
    }
    Ok(resolved)
}

fn find_stored(
    source: &dyn PropertySource,
    wanted: &AnyProperty,
    options: &SearchOptions,
) -> Result<Option<PropertyValue>> {
    let mut visited: Vec<*const ()> = Vec::new();
    let mut current = Some(source);

    while let Some(container) = current {
        let address = std::ptr::from_ref(container).cast::<()>();
        if visited.contains(&address) || visited.len() > MAX_PARENT_DEPTH {
            warn!(
                property = wanted.name(),
                depth = visited.len(),
                "cyclic parent chain detected"
            );
            return Err(ModelError::CyclicContainerGraph {
                property: wanted.name().to_string(),
                depth: visited.len(),
            });
        }
        visited.push(address);

        let found = container.properties().iter().find(|stored| {
            !stored.is_not_defined() && options.property_comparer.matches(stored.property(), wanted)
        });
        if let Some(found) = found {
            return Ok(Some(found.clone()));
        }

        if !options.search_in_parent {
            break;
        }
        current = container.parent().map(Arc::as_ref);
    }

    Ok(None)
}

/// Typed lookups over any [`PropertySource`].
///
/// Implemented for every sized source and for `dyn PropertySource`, so the
/// same calls work on concrete containers and on the sources handed to
/// calculate functions and validation rules.
pub trait PropertySourceExt: PropertySource {
    fn as_dyn(&self) -> &dyn PropertySource;

    /// Resolves with the container's own search options.
    fn get_property_value(&self, property: &AnyProperty) -> Result<Option<PropertyValue>> {
        resolve(self.as_dyn(), property, &self.search_options())
    }

    fn get_property_value_with(
        &self,
        property: &AnyProperty,
        options: &SearchOptions,
    ) -> Result<Option<PropertyValue>> {
        resolve(self.as_dyn(), property, options)
    }

    /// Typed value with the container's search options. A miss yields the
    /// type default.
    fn get_value<T: ValueType>(&self, property: &Property<T>) -> Result<T> {
        self.get_value_with(property, &self.search_options())
    }

    fn get_value_with<T: ValueType>(
        &self,
        property: &Property<T>,
        options: &SearchOptions,
    ) -> Result<T> {
        match resolve(self.as_dyn(), property.as_any(), options)? {
            Some(found) => found.value_as::<T>(),
            None => Ok(T::type_default()),
        }
    }

    fn get_property_value_by_name(
        &self,
        name: &str,
        property_type: PropertyType,
    ) -> Result<Option<PropertyValue>> {
        resolve_by_name(self.as_dyn(), name, property_type, &self.search_options())
    }

    /// Typed value looked up by name or alias.
    fn get_value_by_name<T: ValueType>(&self, name: &str) -> Result<T> {
        match self.get_property_value_by_name(name, T::TYPE)? {
            Some(found) => found.value_as::<T>(),
            None => Ok(T::type_default()),
        }
    }

    /// True when the container itself stores a value for `property`, null included.
    fn contains(&self, property: &AnyProperty) -> Result<bool> {
        Ok(resolve(self.as_dyn(), property, &SearchOptions::existing_only())?.is_some())
    }
}

impl<S: PropertySource> PropertySourceExt for S {
    fn as_dyn(&self) -> &dyn PropertySource {
        self
    }
}

impl<'a> PropertySourceExt for dyn PropertySource + 'a {
    fn as_dyn(&self) -> &dyn PropertySource {
        self
    }
}
