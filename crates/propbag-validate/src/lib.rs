//! Composable validation rules over property containers.
//!
//! Rules implement [`ValidationRule`] and are combined with the methods of
//! [`ValidationRuleExt`]. [`validate`] runs a rule sequence against a
//! container and yields [`Message`]s; rule failures are never errors.

pub mod cached;
pub mod combinators;
pub mod error;
pub mod message;
pub mod rule;
pub mod rules;
pub mod validator;

pub use cached::{CachedRules, RuleCache};
pub use combinators::{And, Or, When, WithMessage, WithSeverity};
pub use error::{Result, ValidationError};
pub use message::{Message, MessageSeverity};
pub use rule::{BoxedRule, ValidationRule, ValidationRuleExt};
pub use rules::{NullabilityCheck, TextValue, required};
pub use validator::{ValidationReport, validate, validate_all};
