//! End-to-end validation of containers against rule sequences.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use proptest::prelude::*;
use propbag_model::{
    AnyProperty, MutablePropertyContainer, Property, PropertyContainer, PropertySource,
    PropertySourceExt,
};
use propbag_validate::rules::{
    exists, max_length, min_length, not_default, not_null, only_allowed_values, should_be,
    should_match_nullability,
};
use propbag_validate::{
    BoxedRule, CachedRules, Message, MessageSeverity, Result, ValidationRule, ValidationRuleExt,
    validate, validate_all,
};

struct Person {
    name: Property<String>,
    age: Property<i64>,
    sex: Property<Option<String>>,
}

impl Person {
    fn schema() -> Self {
        Self {
            name: Property::new("Name"),
            age: Property::new("Age"),
            sex: Property::builder("Sex")
                .allowed_values([Some("Male".to_string()), Some("Female".to_string())])
                .build(),
        }
    }

    fn container(&self, name: &str, age: i64, sex: &str) -> PropertyContainer {
        let mut person = MutablePropertyContainer::new();
        person.set_value(&self.name, name.to_string());
        person.set_value(&self.age, age);
        person.set_value(&self.sex, Some(sex.to_string()));
        person.freeze()
    }

    fn rules(&self) -> Vec<BoxedRule> {
        vec![
            not_null(&self.name).boxed(),
            not_default(&self.age)
                .and(should_be(&self.age, |age| *age > 18))
                .with_message("{Name} should be over 18! but was {value}")
                .boxed(),
            only_allowed_values(&self.sex)
                .and(should_match_nullability(&self.sex))
                .boxed(),
        ]
    }
}

#[test]
fn person_scenario_yields_two_messages() {
    let schema = Person::schema();
    let person = schema.container("Alex Jr", 9, "Undefined");

    let report = validate_all(&person, schema.rules()).unwrap();
    assert_eq!(
        report.formatted_messages(),
        vec![
            "Age should be over 18! but was 9",
            "Sex can not be 'Undefined' because it is not in allowed values list.",
        ]
    );
    assert_eq!(report.error_count(), 2);
}

#[test]
fn valid_person_yields_nothing() {
    let schema = Person::schema();
    let person = schema.container("Alex", 30, "Male");
    assert!(validate_all(&person, schema.rules()).unwrap().is_valid());
}

#[test]
fn exists_and_not_null_differ_on_stored_null() {
    let nickname: Property<Option<String>> = Property::new("Nickname");
    let rules: Vec<BoxedRule> = vec![exists(&nickname).boxed(), not_null(&nickname).boxed()];

    let mut stored_null = MutablePropertyContainer::new();
    stored_null.set_value(&nickname, None);
    let report = validate_all(&stored_null, &rules).unwrap();
    assert_eq!(report.formatted_messages(), vec!["Nickname should not be null."]);

    let absent = MutablePropertyContainer::new();
    let report = validate_all(&absent, &rules).unwrap();
    assert_eq!(
        report.formatted_messages(),
        vec!["Nickname is not exists.", "Nickname should not be null."]
    );
}

#[test]
fn length_scenario() {
    let value: Property<String> = Property::new("Value");
    let rules: Vec<BoxedRule> = vec![min_length(&value, 3).boxed(), max_length(&value, 4).boxed()];

    let check = |text: &str| {
        let mut container = MutablePropertyContainer::new();
        container.set_value(&value, text.to_string());
        validate_all(&container, &rules).unwrap().formatted_messages()
    };

    assert_eq!(
        check("12345678"),
        vec!["value '12345678' is too long (length: 8, maxLength: 4)"]
    );
    assert_eq!(check("12"), vec!["value '12' is too short (length: 2, minLength: 3)"]);
    assert!(check("1234").is_empty());
}

#[test]
fn cached_rules_validate_identically_twice() {
    let schema = Arc::new(Person::schema());
    let builds = Arc::new(AtomicUsize::new(0));
    let cached = CachedRules::new({
        let schema = Arc::clone(&schema);
        let builds = Arc::clone(&builds);
        move || {
            builds.fetch_add(1, Ordering::SeqCst);
            schema.rules()
        }
    });
    let person = schema.container("Alex Jr", 9, "Undefined");

    let first: Vec<Message> = validate(&person, &cached).collect::<Result<_>>().unwrap();
    let second: Vec<Message> = validate(&person, &cached).collect::<Result<_>>().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[test]
fn conditional_rule_for_cross_field_validation() {
    let employed: Property<bool> = Property::new("Employed");
    let employer: Property<Option<String>> = Property::new("Employer");
    let rule = not_null(&employer).when({
        let employed = employed.clone();
        move |source: &dyn PropertySource| source.get_value(&employed).unwrap_or(false)
    });

    let mut student = MutablePropertyContainer::new();
    student.set_value(&employed, false);
    assert!(validate_all(&student, [&rule]).unwrap().is_valid());

    let mut worker = MutablePropertyContainer::new();
    worker.set_value(&employed, true);
    assert_eq!(
        validate_all(&worker, [&rule]).unwrap().formatted_messages(),
        vec!["Employer should not be null."]
    );
}

#[test]
fn calculation_errors_surface_as_hard_errors() {
    let broken: Property<i64> = Property::builder("Broken")
        .calculate(|_| Err("no data".into()))
        .build();
    let name: Property<Option<String>> = Property::new("Name");
    let rules: Vec<BoxedRule> = vec![not_null(&name).boxed(), not_default(&broken).boxed()];
    let container = MutablePropertyContainer::new();

    let outcomes: Vec<_> = validate(&container, &rules).collect();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].is_ok());
    assert!(outcomes[1].is_err());
    assert!(validate_all(&container, &rules).is_err());
}

#[test]
fn validation_logs_through_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let schema = Person::schema();
    let person = schema.container("Alex Jr", 9, "Undefined");

    let report = tracing::subscriber::with_default(subscriber, || {
        validate_all(&person, schema.rules()).unwrap()
    });
    assert_eq!(report.messages.len(), 2);
}

/// Rule with a fixed outcome, for algebraic properties of the combinators.
#[derive(Debug)]
struct Fixed {
    property: AnyProperty,
    messages: Vec<String>,
}

impl Fixed {
    fn new(messages: Vec<String>) -> Self {
        let property: Property<i64> = Property::new("Fixed");
        Self {
            property: property.into_any(),
            messages,
        }
    }
}

impl ValidationRule for Fixed {
    fn property(&self) -> &AnyProperty {
        &self.property
    }

    fn validate(&self, _source: &dyn PropertySource) -> Result<Vec<Message>> {
        Ok(self.messages.iter().map(Message::new).collect())
    }
}

fn texts(rule: &dyn ValidationRule) -> Vec<String> {
    let container = MutablePropertyContainer::new();
    rule.validate(&container)
        .unwrap()
        .iter()
        .map(Message::formatted_message)
        .collect()
}

fn outcome() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 0..4)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn and_with_break_yields_first_failure_only(a in outcome(), b in outcome()) {
        let rule = Fixed::new(a.clone()).and(Fixed::new(b.clone()));
        let expected = if a.is_empty() { b } else { a };
        prop_assert_eq!(texts(&rule), expected);
    }

    #[test]
    fn and_without_break_concatenates(a in outcome(), b in outcome()) {
        let rule = Fixed::new(a.clone()).and_with(Fixed::new(b.clone()), false);
        let expected: Vec<String> = a.into_iter().chain(b).collect();
        prop_assert_eq!(texts(&rule), expected);
    }

    #[test]
    fn or_yields_fallback_on_failure(a in outcome(), b in outcome()) {
        let rule = Fixed::new(a.clone()).or(Fixed::new(b.clone()));
        let expected = if a.is_empty() { Vec::new() } else { b };
        prop_assert_eq!(texts(&rule), expected);
    }

    #[test]
    fn passing_rules_never_produce_messages(name in "[A-Za-z ]{1,20}", age in 1i64..120) {
        let schema = Person::schema();
        let person = schema.container(&name, age, "Female");
        let rules: Vec<BoxedRule> = vec![
            not_null(&schema.name).boxed(),
            exists(&schema.age).boxed(),
            not_default(&schema.age).boxed(),
            should_be(&schema.age, |age| *age > 0).boxed(),
            only_allowed_values(&schema.sex).boxed(),
            min_length(&schema.name, 1).and(max_length(&schema.name, 20)).boxed(),
            Fixed::new(vec!["ignored".to_string()]).or(Fixed::new(Vec::new())).boxed(),
        ];
        let report = validate_all(&person, &rules).unwrap();
        prop_assert!(report.is_valid());
    }

    #[test]
    fn with_severity_applies_to_every_message(a in outcome()) {
        let rule = Fixed::new(a.clone()).with_severity(MessageSeverity::Information);
        let container = MutablePropertyContainer::new();
        let messages = rule.validate(&container).unwrap();
        prop_assert_eq!(messages.len(), a.len());
        prop_assert!(messages.iter().all(|message| message.severity() == MessageSeverity::Information));
    }
}
