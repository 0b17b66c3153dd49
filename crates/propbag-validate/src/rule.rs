//! The rule trait and its composition methods.

use std::fmt;
use std::sync::Arc;

use propbag_model::{AnyProperty, PropertySource};

use crate::combinators::{And, Or, When, WithMessage, WithSeverity};
use crate::error::Result;
use crate::message::{Message, MessageSeverity};

/// A reusable check over one property of a container.
///
/// Rules hold no per-container state: the same rule value can validate any
/// number of containers, from any number of threads.
pub trait ValidationRule: fmt::Debug + Send + Sync {
    /// Property the rule reports on.
    fn property(&self) -> &AnyProperty;

    /// Runs the rule. An empty list means the container passed.
    fn validate(&self, source: &dyn PropertySource) -> Result<Vec<Message>>;
}

/// Shared, type-erased rule.
pub type BoxedRule = Arc<dyn ValidationRule>;

impl<R: ValidationRule + ?Sized> ValidationRule for Arc<R> {
    fn property(&self) -> &AnyProperty {
        (**self).property()
    }

    fn validate(&self, source: &dyn PropertySource) -> Result<Vec<Message>> {
        (**self).validate(source)
    }
}

impl<R: ValidationRule + ?Sized> ValidationRule for &R {
    fn property(&self) -> &AnyProperty {
        (**self).property()
    }

    fn validate(&self, source: &dyn PropertySource) -> Result<Vec<Message>> {
        (**self).validate(source)
    }
}

/// Builder-style composition for every rule.
///
/// ```rust
/// use propbag_model::{MutablePropertyContainer, Property};
/// use propbag_validate::{ValidationRuleExt, rules, validate_all};
///
/// let age: Property<i64> = Property::new("Age");
/// let mut person = MutablePropertyContainer::new();
/// person.set_value(&age, 9);
///
/// let adult = rules::not_default(&age)
///     .and(rules::should_be(&age, |age| *age > 18))
///     .with_message("{Name} should be over 18! but was {value}");
///
/// let report = validate_all(&person, [adult.boxed()]).unwrap();
/// assert_eq!(report.messages[0].formatted_message(), "Age should be over 18! but was 9");
/// ```
pub trait ValidationRuleExt: ValidationRule + Sized {
    /// Runs `next` only when `self` passes.
    fn and<R: ValidationRule>(self, next: R) -> And<Self, R> {
        And::new(self, next, true)
    }

    /// Runs both rules; with `break_on_first_error` set, `next` is skipped
    /// when `self` produced any message.
    fn and_with<R: ValidationRule>(self, next: R, break_on_first_error: bool) -> And<Self, R> {
        And::new(self, next, break_on_first_error)
    }

    /// Passes when either rule passes, reporting `fallback`'s messages otherwise.
    fn or<R: ValidationRule>(self, fallback: R) -> Or<Self, R> {
        Or::new(self, fallback)
    }

    fn with_message(self, template: impl Into<String>) -> WithMessage<Self> {
        WithMessage::new(self, template)
    }

    fn with_severity(self, severity: MessageSeverity) -> WithSeverity<Self> {
        WithSeverity::new(self, severity)
    }

    /// Evaluates the rule only for containers matching `predicate`.
    fn when<F>(self, predicate: F) -> When<Self>
    where
        F: Fn(&dyn PropertySource) -> bool + Send + Sync + 'static,
    {
        When::new(self, predicate)
    }

    fn boxed(self) -> BoxedRule
    where
        Self: 'static,
    {
        Arc::new(self)
    }
}

impl<R: ValidationRule> ValidationRuleExt for R {}
