//! Rule sets that are built once and reused.

use std::fmt;
use std::sync::{Arc, OnceLock};

use propbag_model::{AnyProperty, PropertyCache};
use tracing::debug;

use crate::rule::BoxedRule;

type RuleFactory = Box<dyn Fn() -> Vec<BoxedRule> + Send + Sync>;

/// A rule sequence materialised on first use.
///
/// The factory runs at most once no matter how many times the set is
/// validated, so expensive rule construction is not repeated per container.
pub struct CachedRules {
    factory: RuleFactory,
    rules: OnceLock<Vec<BoxedRule>>,
}

impl CachedRules {
    pub fn new<F, I>(factory: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: IntoIterator<Item = BoxedRule>,
    {
        Self {
            factory: Box::new(move || factory().into_iter().collect::<Vec<_>>()),
            rules: OnceLock::new(),
        }
    }

    /// The materialised rules.
    pub fn rules(&self) -> &[BoxedRule] {
        self.rules.get_or_init(|| {
            let rules = (self.factory)();
            debug!(rule_count = rules.len(), "materialized cached rule set");
            rules
        })
    }

    pub fn is_materialized(&self) -> bool {
        self.rules.get().is_some()
    }
}

impl fmt::Debug for CachedRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedRules")
            .field("rules", &self.rules.get())
            .finish_non_exhaustive()
    }
}

impl<'a> IntoIterator for &'a CachedRules {
    type Item = &'a BoxedRule;
    type IntoIter = std::slice::Iter<'a, BoxedRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules().iter()
    }
}

/// Per-property rule sets shared across threads.
///
/// Concurrent callers asking for the same property converge on one rule set.
#[derive(Debug, Default)]
pub struct RuleCache {
    cache: PropertyCache<Vec<BoxedRule>>,
}

impl RuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, property: &AnyProperty) -> Option<Arc<Vec<BoxedRule>>> {
        self.cache.get(property)
    }

    pub fn get_or_add<F, I>(&self, property: &AnyProperty, factory: F) -> Arc<Vec<BoxedRule>>
    where
        F: FnOnce() -> I,
        I: IntoIterator<Item = BoxedRule>,
    {
        self.cache
            .get_or_add(property, || factory().into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
