//! Property descriptors.
//!
//! A [`Property<T>`] is an immutable, shareable descriptor: name, type, alias,
//! examples, allowed values and the optional default-value supplier and
//! calculate function used by the resolution engine. [`AnyProperty`] is the
//! type-erased handle stored inside property values and containers.
//!
//! Identity is by reference: every built property receives a fresh
//! [`PropertyId`], clones share it.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::container::PropertySource;
use crate::error::{BoxError, ModelError, Result};
use crate::value::{PropertyType, Value, ValueType};

/// Process-unique property identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(u64);

impl PropertyId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyId({})", self.0)
    }
}

/// Whether a property may hold null, independent of its Rust type.
///
/// Defaults from the type (`Option<T>` allows null) and can be tightened so
/// that `ShouldMatchNullability` reports nulls on an `Option<T>` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nullability {
    AllowNull,
    NotNull,
}

impl Nullability {
    pub fn for_type(property_type: PropertyType) -> Self {
        if property_type.nullable {
            Nullability::AllowNull
        } else {
            Nullability::NotNull
        }
    }

    pub fn allows_null(&self) -> bool {
        matches!(self, Nullability::AllowNull)
    }
}

type DefaultValueFn = Arc<dyn Fn() -> Option<Value> + Send + Sync>;
type CalculateFn =
    Arc<dyn Fn(&dyn PropertySource) -> std::result::Result<Option<Value>, BoxError> + Send + Sync>;

struct PropertyDef {
    id: PropertyId,
    name: String,
    alias: Option<String>,
    description: Option<String>,
    property_type: PropertyType,
    nullability: Nullability,
    default_value: Option<DefaultValueFn>,
    calculate: Option<CalculateFn>,
    examples: Vec<Option<Value>>,
    allowed_values: Option<Vec<Option<Value>>>,
}

/// Type-erased property handle.
#[derive(Clone)]
pub struct AnyProperty {
    def: Arc<PropertyDef>,
}

impl AnyProperty {
    /// Creates a bare property of the given type with no default, calculation
    /// or metadata. Used when the type is only known at runtime.
    pub fn untyped(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            def: Arc::new(PropertyDef {
                id: PropertyId::next(),
                name: name.into(),
                alias: None,
                description: None,
                property_type,
                nullability: Nullability::for_type(property_type),
                default_value: None,
                calculate: None,
                examples: Vec::new(),
                allowed_values: None,
            }),
        }
    }

    pub fn id(&self) -> PropertyId {
        self.def.id
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.def.alias.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.def.description.as_deref()
    }

    pub fn property_type(&self) -> PropertyType {
        self.def.property_type
    }

    pub fn nullability(&self) -> Nullability {
        self.def.nullability
    }

    pub fn examples(&self) -> &[Option<Value>] {
        &self.def.examples
    }

    /// Allowed values list, if one was configured.
    pub fn allowed_values(&self) -> Option<&[Option<Value>]> {
        self.def.allowed_values.as_deref()
    }

    pub fn has_default_value(&self) -> bool {
        self.def.default_value.is_some()
    }

    pub fn has_calculate(&self) -> bool {
        self.def.calculate.is_some()
    }

    /// Invokes the default-value supplier. `None` when the property has none.
    pub fn default_value(&self) -> Option<Option<Value>> {
        self.def.default_value.as_ref().map(|supplier| supplier())
    }

    /// Invokes the calculate function against `source`.
    ///
    /// Returns `Ok(None)` when the property has no calculate function.
    pub fn calculate(&self, source: &dyn PropertySource) -> Result<Option<Option<Value>>> {
        let Some(calculate) = &self.def.calculate else {
            return Ok(None);
        };
        calculate(source)
            .map(Some)
            .map_err(|error| ModelError::Calculation {
                property: self.name().to_string(),
                source: error,
            })
    }

    /// Reference identity.
    pub fn same_as(&self, other: &AnyProperty) -> bool {
        self.id() == other.id()
    }

    /// Compares `name` against the property name and, optionally, its alias.
    pub fn matches_name(&self, name: &str, ignore_case: bool, include_alias: bool) -> bool {
        let eq = |candidate: &str| {
            if ignore_case {
                candidate.eq_ignore_ascii_case(name)
            } else {
                candidate == name
            }
        };
        eq(self.name()) || (include_alias && self.alias().is_some_and(eq))
    }
}

impl PartialEq for AnyProperty {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for AnyProperty {}

impl std::hash::Hash for AnyProperty {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

// Manual Debug impl since callbacks aren't Debug
impl fmt::Debug for AnyProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyProperty")
            .field("id", &self.def.id)
            .field("name", &self.def.name)
            .field("alias", &self.def.alias)
            .field("type", &self.def.property_type)
            .field("nullability", &self.def.nullability)
            .field("has_default_value", &self.has_default_value())
            .field("has_calculate", &self.has_calculate())
            .finish()
    }
}

impl fmt::Display for AnyProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.property_type())
    }
}

/// A typed property key.
///
/// The phantom type fixes the Rust type used by typed getters and setters;
/// the descriptor itself is shared through [`AnyProperty`].
///
/// ```rust
/// use propbag_model::{MutablePropertyContainer, Property, PropertySourceExt};
///
/// let age: Property<i64> = Property::builder("Age").default_value(18).build();
/// let mut person = MutablePropertyContainer::new();
/// assert_eq!(person.get_value(&age).unwrap(), 18);
///
/// person.set_value(&age, 9);
/// assert_eq!(person.get_value(&age).unwrap(), 9);
/// ```
pub struct Property<T> {
    inner: AnyProperty,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ValueType> Property<T> {
    /// Creates a property with no default value or calculation.
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    pub fn builder(name: impl Into<String>) -> PropertyBuilder<T> {
        PropertyBuilder::new(name)
    }

    pub fn as_any(&self) -> &AnyProperty {
        &self.inner
    }

    pub fn into_any(self) -> AnyProperty {
        self.inner
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Typed default value from the supplier, if any.
    pub fn default_value(&self) -> Option<T> {
        self.inner
            .default_value()
            .and_then(|value| T::from_value(value.as_ref()))
    }

    /// Typed examples.
    pub fn examples(&self) -> Vec<T> {
        self.inner
            .examples()
            .iter()
            .filter_map(|value| T::from_value(value.as_ref()))
            .collect()
    }
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl<T> AsRef<AnyProperty> for Property<T> {
    fn as_ref(&self) -> &AnyProperty {
        &self.inner
    }
}

impl<T> From<Property<T>> for AnyProperty {
    fn from(property: Property<T>) -> Self {
        property.inner
    }
}

impl<T> From<&Property<T>> for AnyProperty {
    fn from(property: &Property<T>) -> Self {
        property.inner.clone()
    }
}

/// Builder for [`Property`].
///
/// ```rust
/// use propbag_model::{Nullability, Property};
///
/// let sex: Property<Option<String>> = Property::builder("Sex")
///     .alias("Gender")
///     .allowed_values([Some("Male".to_string()), Some("Female".to_string())])
///     .not_null()
///     .build();
///
/// assert_eq!(sex.as_any().alias(), Some("Gender"));
/// assert_eq!(sex.as_any().nullability(), Nullability::NotNull);
/// ```
pub struct PropertyBuilder<T> {
    name: String,
    alias: Option<String>,
    description: Option<String>,
    nullability: Option<Nullability>,
    default_value: Option<DefaultValueFn>,
    calculate: Option<CalculateFn>,
    examples: Vec<Option<Value>>,
    allowed_values: Option<Vec<Option<Value>>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ValueType> PropertyBuilder<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            description: None,
            nullability: None,
            default_value: None,
            calculate: None,
            examples: Vec::new(),
            allowed_values: None,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Uses a fixed default value.
    #[must_use]
    pub fn default_value(self, value: T) -> Self {
        self.default_value_with(move || value.clone())
    }

    /// Uses a supplier invoked on every default-value lookup.
    #[must_use]
    pub fn default_value_with<F>(mut self, supplier: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.default_value = Some(Arc::new(move || supplier().into_value()));
        self
    }

    /// Sets the calculate function. It receives the container the lookup
    /// started from, not the parent the search may have walked into.
    #[must_use]
    pub fn calculate<F>(mut self, calculate: F) -> Self
    where
        F: Fn(&dyn PropertySource) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
    {
        self.calculate = Some(Arc::new(move |source: &dyn PropertySource| {
            calculate(source).map(T::into_value)
        }));
        self
    }

    #[must_use]
    pub fn examples<I>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.examples = examples.into_iter().map(T::into_value).collect();
        self
    }

    #[must_use]
    pub fn allowed_values<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.allowed_values = Some(values.into_iter().map(T::into_value).collect());
        self
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullability = Some(Nullability::NotNull);
        self
    }

    #[must_use]
    pub fn allow_null(mut self) -> Self {
        self.nullability = Some(Nullability::AllowNull);
        self
    }

    pub fn build(self) -> Property<T> {
        let property_type = T::TYPE;
        Property {
            inner: AnyProperty {
                def: Arc::new(PropertyDef {
                    id: PropertyId::next(),
                    name: self.name,
                    alias: self.alias,
                    description: self.description,
                    property_type,
                    nullability: self
                        .nullability
                        .unwrap_or_else(|| Nullability::for_type(property_type)),
                    default_value: self.default_value,
                    calculate: self.calculate,
                    examples: self.examples,
                    allowed_values: self.allowed_values,
                }),
            },
            _marker: PhantomData,
        }
    }
}
