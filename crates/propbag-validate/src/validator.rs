//! Container validation driver.

use propbag_model::PropertySource;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::Result;
use crate::message::{Message, MessageSeverity};
use crate::rule::ValidationRule;

/// Validates `source` against `rules`, lazily.
///
/// Rules run in sequence order as the iterator is advanced; each rule's
/// messages are yielded before the next rule is evaluated. A failing rule
/// never stops later rules. Resolution errors are yielded in place.
pub fn validate<I>(source: &dyn PropertySource, rules: I) -> impl Iterator<Item = Result<Message>>
where
    I: IntoIterator,
    I::Item: ValidationRule,
{
    rules.into_iter().flat_map(move |rule| {
        let outcome = rule.validate(source);
        trace!(
            property = rule.property().name(),
            messages = outcome.as_ref().map_or(0, Vec::len),
            "rule evaluated"
        );
        match outcome {
            Ok(messages) => messages.into_iter().map(Ok).collect::<Vec<_>>(),
            Err(error) => vec![Err(error)],
        }
    })
}

/// Runs every rule and collects the messages, stopping at the first hard error.
pub fn validate_all<I>(source: &dyn PropertySource, rules: I) -> Result<ValidationReport>
where
    I: IntoIterator,
    I::Item: ValidationRule,
{
    let messages = validate(source, rules).collect::<Result<Vec<_>>>()?;
    let report = ValidationReport { messages };
    debug!(
        messages = report.messages.len(),
        error_count = report.error_count(),
        warning_count = report.warning_count(),
        "validated container"
    );
    Ok(report)
}

/// Messages produced by one validation run, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub messages: Vec<Message>,
}

impl ValidationReport {
    pub fn error_count(&self) -> usize {
        self.count(MessageSeverity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(MessageSeverity::Warning)
    }

    /// True when no rule produced a message.
    pub fn is_valid(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn formatted_messages(&self) -> Vec<String> {
        self.messages.iter().map(Message::formatted_message).collect()
    }

    fn count(&self, severity: MessageSeverity) -> usize {
        self.messages
            .iter()
            .filter(|message| message.severity() == severity)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use propbag_model::{MutablePropertyContainer, Property};

    use super::*;
    use crate::rule::{BoxedRule, ValidationRuleExt};
    use crate::rules::{exists, not_null};

    #[test]
    fn messages_follow_rule_order() {
        let name: Property<Option<String>> = Property::new("Name");
        let age: Property<i64> = Property::new("Age");
        let rules: Vec<BoxedRule> = vec![
            exists(&age).boxed(),
            not_null(&name).with_severity(MessageSeverity::Warning).boxed(),
        ];

        let report = validate_all(&MutablePropertyContainer::new(), &rules).unwrap();
        assert_eq!(
            report.formatted_messages(),
            vec!["Age is not exists.", "Name should not be null."]
        );
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
        assert!(report.has_errors());
        assert!(!report.is_valid());
    }

    #[test]
    fn iteration_is_lazy() {
        let age: Property<i64> = Property::new("Age");
        let rules: Vec<BoxedRule> = vec![exists(&age).boxed(), exists(&age).boxed()];
        let container = MutablePropertyContainer::new();

        let mut messages = validate(&container, &rules);
        assert!(messages.next().is_some_and(|r| r.is_ok()));
        assert!(messages.next().is_some());
        assert!(messages.next().is_none());
    }

    #[test]
    fn empty_rule_set_is_valid() {
        let rules: Vec<BoxedRule> = Vec::new();
        let report = validate_all(&MutablePropertyContainer::new(), rules).unwrap();
        assert!(report.is_valid());
        assert!(!report.has_errors());
    }
}
