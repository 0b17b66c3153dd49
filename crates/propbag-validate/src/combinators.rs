//! Rule combinators.

use std::fmt;
use std::sync::Arc;

use propbag_model::{AnyProperty, PropertySource};
use tracing::trace;

use crate::error::Result;
use crate::message::{Message, MessageSeverity};
use crate::rule::ValidationRule;

/// Runs `first`, then `second`. With `break_on_first_error`, any message
/// from `first` stops evaluation.
#[derive(Debug)]
pub struct And<A, B> {
    first: A,
    second: B,
    break_on_first_error: bool,
}

impl<A, B> And<A, B> {
    pub fn new(first: A, second: B, break_on_first_error: bool) -> Self {
        Self {
            first,
            second,
            break_on_first_error,
        }
    }

    pub fn break_on_first_error(&self) -> bool {
        self.break_on_first_error
    }
}

impl<A: ValidationRule, B: ValidationRule> ValidationRule for And<A, B> {
    fn property(&self) -> &AnyProperty {
        self.first.property()
    }

    fn validate(&self, source: &dyn PropertySource) -> Result<Vec<Message>> {
        let mut messages = self.first.validate(source)?;
        if self.break_on_first_error && !messages.is_empty() {
            trace!(property = self.property().name(), "and: first rule failed, skipping second");
            return Ok(messages);
        }
        messages.extend(self.second.validate(source)?);
        Ok(messages)
    }
}

/// Passes when `first` passes; otherwise reports whatever `fallback` reports.
#[derive(Debug)]
pub struct Or<A, B> {
    first: A,
    fallback: B,
}

impl<A, B> Or<A, B> {
    pub fn new(first: A, fallback: B) -> Self {
        Self { first, fallback }
    }
}

impl<A: ValidationRule, B: ValidationRule> ValidationRule for Or<A, B> {
    fn property(&self) -> &AnyProperty {
        self.first.property()
    }

    fn validate(&self, source: &dyn PropertySource) -> Result<Vec<Message>> {
        if self.first.validate(source)?.is_empty() {
            return Ok(Vec::new());
        }
        self.fallback.validate(source)
    }
}

/// Swaps the template of every message the wrapped rule produces.
///
/// The bag captured by the wrapped rule is kept, so placeholders resolve
/// against the failing property's name and value.
#[derive(Debug)]
pub struct WithMessage<R> {
    rule: R,
    template: String,
}

impl<R> WithMessage<R> {
    pub fn new(rule: R, template: impl Into<String>) -> Self {
        Self {
            rule,
            template: template.into(),
        }
    }
}

impl<R: ValidationRule> ValidationRule for WithMessage<R> {
    fn property(&self) -> &AnyProperty {
        self.rule.property()
    }

    fn validate(&self, source: &dyn PropertySource) -> Result<Vec<Message>> {
        Ok(self
            .rule
            .validate(source)?
            .into_iter()
            .map(|message| message.with_original_message(self.template.as_str()))
            .collect())
    }
}

/// Sets the severity of every message the wrapped rule produces.
#[derive(Debug)]
pub struct WithSeverity<R> {
    rule: R,
    severity: MessageSeverity,
}

impl<R> WithSeverity<R> {
    pub fn new(rule: R, severity: MessageSeverity) -> Self {
        Self { rule, severity }
    }
}

impl<R: ValidationRule> ValidationRule for WithSeverity<R> {
    fn property(&self) -> &AnyProperty {
        self.rule.property()
    }

    fn validate(&self, source: &dyn PropertySource) -> Result<Vec<Message>> {
        Ok(self
            .rule
            .validate(source)?
            .into_iter()
            .map(|message| message.with_severity(self.severity))
            .collect())
    }
}

type Condition = Arc<dyn Fn(&dyn PropertySource) -> bool + Send + Sync>;

/// Evaluates the wrapped rule only when the condition holds for the container.
pub struct When<R> {
    rule: R,
    condition: Condition,
}

impl<R> When<R> {
    pub fn new<F>(rule: R, condition: F) -> Self
    where
        F: Fn(&dyn PropertySource) -> bool + Send + Sync + 'static,
    {
        Self {
            rule,
            condition: Arc::new(condition),
        }
    }
}

impl<R: ValidationRule> ValidationRule for When<R> {
    fn property(&self) -> &AnyProperty {
        self.rule.property()
    }

    fn validate(&self, source: &dyn PropertySource) -> Result<Vec<Message>> {
        if !(self.condition)(source) {
            trace!(property = self.property().name(), "condition not met, rule skipped");
            return Ok(Vec::new());
        }
        self.rule.validate(source)
    }
}

impl<R: fmt::Debug> fmt::Debug for When<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("When")
            .field("rule", &self.rule)
            .finish_non_exhaustive()
    }
}
