//! Resolution policy.

use serde::{Deserialize, Serialize};

use crate::property::AnyProperty;

/// How a stored property is matched against the searched one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PropertyComparer {
    /// Same descriptor instance.
    #[default]
    ByReference,
    /// Exact name.
    ByName,
    /// Exact name, or either side's alias.
    ByNameOrAlias,
    /// Name or alias, ASCII case-insensitive.
    ByNameOrAliasIgnoreCase,
}

impl PropertyComparer {
    pub fn matches(&self, stored: &AnyProperty, wanted: &AnyProperty) -> bool {
        match self {
            PropertyComparer::ByReference => stored.same_as(wanted),
            PropertyComparer::ByName => stored.name() == wanted.name(),
            PropertyComparer::ByNameOrAlias => names_match(stored, wanted, false),
            PropertyComparer::ByNameOrAliasIgnoreCase => names_match(stored, wanted, true),
        }
    }

    pub fn is_name_based(&self) -> bool {
        !matches!(self, PropertyComparer::ByReference)
    }
}

fn names_match(stored: &AnyProperty, wanted: &AnyProperty, ignore_case: bool) -> bool {
    stored.matches_name(wanted.name(), ignore_case, true)
        || wanted
            .alias()
            .is_some_and(|alias| stored.matches_name(alias, ignore_case, true))
}

/// Options controlling how a value lookup walks the parent chain, applies
/// calculation and defaults, and what it returns when nothing is found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Searched instead of the property passed to the lookup.
    #[serde(skip)]
    pub search_property: Option<AnyProperty>,
    pub property_comparer: PropertyComparer,
    pub search_in_parent: bool,
    pub calculate_value: bool,
    pub use_default_value: bool,
    /// Return the `NotDefined` sentinel instead of nothing on a miss.
    pub return_not_defined: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            search_property: None,
            property_comparer: PropertyComparer::ByReference,
            search_in_parent: true,
            calculate_value: true,
            use_default_value: true,
            return_not_defined: true,
        }
    }
}

impl SearchOptions {
    /// Stored values of the container itself only: no parent, calculation,
    /// default or sentinel.
    pub fn existing_only() -> Self {
        Self {
            search_property: None,
            property_comparer: PropertyComparer::ByReference,
            search_in_parent: false,
            calculate_value: false,
            use_default_value: false,
            return_not_defined: false,
        }
    }

    #[must_use]
    pub fn with_search_property(mut self, property: Option<AnyProperty>) -> Self {
        self.search_property = property;
        self
    }

    #[must_use]
    pub fn with_comparer(mut self, comparer: PropertyComparer) -> Self {
        self.property_comparer = comparer;
        self
    }

    /// Shorthand for matching by name or alias.
    #[must_use]
    pub fn by_name(self) -> Self {
        self.with_comparer(PropertyComparer::ByNameOrAlias)
    }

    #[must_use]
    pub fn with_search_in_parent(mut self, enabled: bool) -> Self {
        self.search_in_parent = enabled;
        self
    }

    #[must_use]
    pub fn with_calculate_value(mut self, enabled: bool) -> Self {
        self.calculate_value = enabled;
        self
    }

    #[must_use]
    pub fn with_use_default_value(mut self, enabled: bool) -> Self {
        self.use_default_value = enabled;
        self
    }

    #[must_use]
    pub fn with_return_not_defined(mut self, enabled: bool) -> Self {
        self.return_not_defined = enabled;
        self
    }
}
