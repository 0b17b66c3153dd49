//! Resolution tests across container chains.

use std::sync::{Arc, OnceLock};

use propbag_model::{
    ModelError, MutablePropertyContainer, Property, PropertyComparer, PropertyContainer,
    PropertySource, PropertySourceExt, PropertyValue, SearchOptions, Value, ValueSource,
    resolve,
};

fn person(name: &Property<String>, age: &Property<i64>) -> MutablePropertyContainer {
    let mut person = MutablePropertyContainer::new();
    person.set_value(name, "Alex Jr".to_string());
    person.set_value(age, 9);
    person
}

#[test]
fn child_falls_back_to_parent_values() {
    let name: Property<String> = Property::new("Name");
    let age: Property<i64> = Property::new("Age");
    let parent = person(&name, &age).freeze().into_shared();

    let mut child = MutablePropertyContainer::new().with_parent(parent);
    child.set_value(&name, "Sam".to_string());

    assert_eq!(child.get_value(&name).unwrap(), "Sam");
    let inherited = child
        .get_property_value(age.as_any())
        .unwrap()
        .expect("inherited value");
    assert_eq!(inherited.value(), Some(&Value::Int(9)));
    assert_eq!(inherited.source(), ValueSource::Defined);

    let own_only = SearchOptions::default().with_search_in_parent(false);
    assert_eq!(child.get_value_with(&age, &own_only).unwrap(), 0);
}

#[test]
fn deeper_stored_value_beats_default() {
    let age: Property<i64> = Property::builder("Age").default_value(18).build();
    let mut root = MutablePropertyContainer::new();
    root.set_value(&age, 40);

    let middle = PropertyContainer::empty().with_parent(root.freeze().into_shared());
    let leaf = PropertyContainer::empty().with_parent(middle.into_shared());

    assert_eq!(leaf.get_value(&age).unwrap(), 40);
}

#[test]
fn calculation_receives_original_container() {
    let name: Property<String> = Property::new("Name");
    let age: Property<i64> = Property::new("Age");
    let count: Property<i64> = Property::builder("Count")
        .calculate(|source| Ok(i64::try_from(source.count())?))
        .build();

    let parent = person(&name, &age).freeze().into_shared();
    let mut child = MutablePropertyContainer::new().with_parent(parent);
    child.set_value(&name, "Sam".to_string());

    let resolved = child
        .get_property_value(count.as_any())
        .unwrap()
        .expect("calculated");
    assert_eq!(resolved.source(), ValueSource::Calculated);
    assert_eq!(resolved.value(), Some(&Value::Int(1)));
}

#[test]
fn calculation_can_read_other_properties() {
    let name: Property<String> = Property::new("Name");
    let age: Property<i64> = Property::new("Age");
    let greeting: Property<String> = Property::builder("Greeting")
        .calculate({
            let name = name.clone();
            let age = age.clone();
            move |source| {
                let name = source.get_value(&name)?;
                let age = source.get_value(&age)?;
                Ok(format!("{name} ({age})"))
            }
        })
        .build();

    let container = person(&name, &age).freeze();
    assert_eq!(container.get_value(&greeting).unwrap(), "Alex Jr (9)");
}

#[test]
fn calculation_errors_propagate() {
    let broken: Property<i64> = Property::builder("Broken")
        .default_value(1)
        .calculate(|_| Err("sensor offline".into()))
        .build();
    let container = PropertyContainer::empty();

    let err = container.get_value(&broken).unwrap_err();
    assert!(matches!(err, ModelError::Calculation { ref property, .. } if property == "Broken"));
    let cause = std::error::Error::source(&err).expect("calculation cause");
    assert_eq!(cause.to_string(), "sensor offline");

    let skip_calc = SearchOptions::default().with_calculate_value(false);
    assert_eq!(container.get_value_with(&broken, &skip_calc).unwrap(), 1);
}

#[derive(Debug, Default)]
struct Looped {
    values: Vec<PropertyValue>,
    parent: OnceLock<Arc<dyn PropertySource>>,
}

impl PropertySource for Looped {
    fn properties(&self) -> &[PropertyValue] {
        &self.values
    }

    fn parent(&self) -> Option<&Arc<dyn PropertySource>> {
        self.parent.get()
    }
}

#[test]
fn self_parent_is_reported_as_cycle() {
    let age: Property<i64> = Property::new("Age");
    let looped = Arc::new(Looped::default());
    let as_parent: Arc<dyn PropertySource> = looped.clone();
    looped.parent.set(as_parent).expect("parent unset");

    let err = looped.get_value(&age).unwrap_err();
    assert!(matches!(err, ModelError::CyclicContainerGraph { depth: 1, .. }));

    let existing = resolve(&*looped, age.as_any(), &SearchOptions::existing_only());
    assert!(matches!(existing, Ok(None)));
    assert!(!looped.contains(age.as_any()).unwrap());
}

#[test]
fn two_node_cycle_is_reported() {
    let age: Property<i64> = Property::new("Age");
    let first = Arc::new(Looped::default());
    let second = Arc::new(Looped::default());
    let first_dyn: Arc<dyn PropertySource> = first.clone();
    let second_dyn: Arc<dyn PropertySource> = second.clone();
    first.parent.set(second_dyn).expect("parent unset");
    second.parent.set(first_dyn).expect("parent unset");

    let err = first.get_value(&age).unwrap_err();
    assert!(matches!(err, ModelError::CyclicContainerGraph { depth: 2, .. }));
}

#[test]
fn overly_deep_chain_is_rejected() {
    let age: Property<i64> = Property::new("Age");
    let mut root = MutablePropertyContainer::new();
    root.set_value(&age, 1);

    let mut shallow = root.clone().freeze().into_shared();
    for _ in 0..10 {
        shallow = PropertyContainer::empty().with_parent(shallow).into_shared();
    }
    assert_eq!(shallow.get_value(&age).unwrap(), 1);

    let mut deep = root.freeze().into_shared();
    for _ in 0..100 {
        deep = PropertyContainer::empty().with_parent(deep).into_shared();
    }
    assert!(matches!(
        deep.get_value(&age),
        Err(ModelError::CyclicContainerGraph { .. })
    ));
}

#[test]
fn name_search_uses_container_comparer() {
    let name: Property<String> = Property::builder("FirstName").alias("Name").build();
    let options = SearchOptions::default().with_comparer(PropertyComparer::ByNameOrAliasIgnoreCase);
    let mut container = MutablePropertyContainer::new().with_search_options(options);
    container.set_value(&name, "Alex".to_string());

    assert_eq!(container.get_value_by_name::<String>("name").unwrap(), "Alex");
    assert_eq!(container.get_value_by_name::<String>("FIRSTNAME").unwrap(), "Alex");
    assert_eq!(container.get_value_by_name::<String>("LastName").unwrap(), "");
}

#[test]
fn set_value_after_freeze_round_trip_keeps_identity() {
    let age: Property<i64> = Property::new("Age");
    let frozen = {
        let mut builder = MutablePropertyContainer::new();
        builder.set_value(&age, 9);
        builder.freeze()
    };

    let mut edited = frozen.to_mutable();
    edited.set_value(&age, 10);
    assert_eq!(frozen.get_value(&age).unwrap(), 9);
    assert_eq!(edited.get_value(&age).unwrap(), 10);
    assert_eq!(edited.count(), 1);
}

#[test]
fn frozen_containers_are_shared_across_readers() {
    let name: Property<String> = Property::new("Name");
    let age: Property<i64> = Property::new("Age");
    let shared = Arc::new(person(&name, &age).freeze());

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let shared = Arc::clone(&shared);
            let age = age.clone();
            scope.spawn(move || {
                for _ in 0..100 {
                    assert_eq!(shared.get_value(&age).unwrap(), 9);
                }
            });
        }
    });
}
