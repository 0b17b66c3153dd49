//! Property schemas.

use std::collections::HashMap;

use crate::property::AnyProperty;

/// Ordered set of properties describing one kind of object, with a
/// case-insensitive name and alias index.
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    properties: Vec<AnyProperty>,
    index: HashMap<String, usize>,
}

impl PropertySet {
    pub fn new<I, P>(properties: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<AnyProperty>,
    {
        let mut set = Self::default();
        for property in properties {
            set.push(property);
        }
        set
    }

    /// Appends a property. Names already indexed keep their first owner.
    pub fn push(&mut self, property: impl Into<AnyProperty>) {
        let property = property.into();
        let position = self.properties.len();
        let keys = std::iter::once(property.name()).chain(property.alias());
        for key in keys {
            self.index
                .entry(key.to_ascii_uppercase())
                .or_insert(position);
        }
        self.properties.push(property);
    }

    /// Looks up a property by name or alias, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&AnyProperty> {
        self.index
            .get(&name.to_ascii_uppercase())
            .and_then(|position| self.properties.get(*position))
    }

    pub fn contains(&self, property: &AnyProperty) -> bool {
        self.properties
            .iter()
            .any(|candidate| candidate.same_as(property))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnyProperty> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<'a> IntoIterator for &'a PropertySet {
    type Item = &'a AnyProperty;
    type IntoIter = std::slice::Iter<'a, AnyProperty>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Property;

    #[test]
    fn lookup_is_case_insensitive_and_covers_aliases() {
        let name: Property<String> = Property::builder("FirstName").alias("Name").build();
        let age: Property<i64> = Property::new("Age");
        let schema = PropertySet::new([name.as_any().clone(), age.as_any().clone()]);

        assert_eq!(schema.len(), 2);
        assert!(schema.get("firstname").is_some_and(|p| p.same_as(name.as_any())));
        assert!(schema.get("NAME").is_some_and(|p| p.same_as(name.as_any())));
        assert!(schema.get("age").is_some());
        assert!(schema.get("Sex").is_none());
        assert!(schema.contains(age.as_any()));
    }

    #[test]
    fn first_owner_of_a_name_wins() {
        let first: Property<i64> = Property::new("Age");
        let second: Property<String> = Property::new("AGE");
        let schema = PropertySet::new([first.as_any().clone(), second.as_any().clone()]);
        assert!(schema.get("age").is_some_and(|p| p.same_as(first.as_any())));
        let names: Vec<_> = schema.iter().map(AnyProperty::name).collect();
        assert_eq!(names, vec!["Age", "AGE"]);
    }
}
