//! Value redaction for log output.
//!
//! Property values are business data. Log statements across the workspace
//! route values through [`redact_value`] so they only appear in logs once a
//! host application has opted in with [`set_log_values`].

use std::sync::atomic::{AtomicBool, Ordering};

use crate::value::{Value, display_value};

static LOG_VALUES_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder used when value logging is disabled.
pub const REDACTED_VALUE: &str = "[REDACTED]";

/// Enables or disables logging of property values process-wide.
pub fn set_log_values(enabled: bool) {
    LOG_VALUES_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Returns true if property values may be logged.
pub fn log_values_enabled() -> bool {
    LOG_VALUES_ENABLED.load(Ordering::Relaxed)
}

/// Returns the formatted value when value logging is enabled, otherwise a redacted token.
pub fn redact_value(value: Option<&Value>) -> String {
    if log_values_enabled() {
        display_value(value)
    } else {
        REDACTED_VALUE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_redacted_until_enabled() {
        let age = Value::Int(9);
        assert!(!log_values_enabled());
        assert_eq!(redact_value(Some(&age)), REDACTED_VALUE);
        assert_eq!(redact_value(None), REDACTED_VALUE);

        set_log_values(true);
        let shown = (redact_value(Some(&age)), redact_value(None));
        set_log_values(false);

        assert_eq!(shown, ("9".to_string(), "null".to_string()));
        assert_eq!(redact_value(Some(&age)), REDACTED_VALUE);
    }
}
