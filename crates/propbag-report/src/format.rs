//! Value formatting.

use std::fmt::{self, Write};

use propbag_model::Value;
use serde::{Deserialize, Serialize};

/// Options for turning property values into display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Text rendered for null values.
    pub null_text: String,
    /// `chrono` format string for dates.
    pub date_format: String,
    /// `chrono` format string for date-times.
    pub date_time_format: String,
    /// Fixed number of decimals for floats; shortest round-trip form when unset.
    pub float_precision: Option<usize>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            null_text: "null".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            date_time_format: "%Y-%m-%dT%H:%M:%S".to_string(),
            float_precision: None,
        }
    }
}

impl FormatOptions {
    #[must_use]
    pub fn with_null_text(mut self, text: impl Into<String>) -> Self {
        self.null_text = text.into();
        self
    }

    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    #[must_use]
    pub fn with_date_time_format(mut self, format: impl Into<String>) -> Self {
        self.date_time_format = format.into();
        self
    }

    #[must_use]
    pub fn with_float_precision(mut self, precision: usize) -> Self {
        self.float_precision = Some(precision);
        self
    }
}

pub fn format_value(value: Option<&Value>, options: &FormatOptions) -> String {
    let Some(value) = value else {
        return options.null_text.clone();
    };
    match value {
        Value::Float(number) => match options.float_precision {
            Some(precision) => format!("{number:.precision$}"),
            None => number.to_string(),
        },
        Value::Date(date) => formatted_or_default(date.format(&options.date_format), value),
        Value::DateTime(date_time) => {
            formatted_or_default(date_time.format(&options.date_time_format), value)
        }
        other => other.to_string(),
    }
}

/// Falls back to the ISO form when the configured format string is invalid.
fn formatted_or_default(formatted: impl fmt::Display, value: &Value) -> String {
    let mut text = String::new();
    if write!(text, "{formatted}").is_err() {
        return value.to_string();
    }
    text
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn formats_each_kind() {
        let options = FormatOptions::default();
        assert_eq!(format_value(None, &options), "null");
        assert_eq!(format_value(Some(&Value::Int(9)), &options), "9");
        assert_eq!(format_value(Some(&Value::Bool(true)), &options), "true");
        assert_eq!(format_value(Some(&Value::from("Alex")), &options), "Alex");
        assert_eq!(format_value(Some(&Value::Float(1.5)), &options), "1.5");
    }

    #[test]
    fn options_override_defaults() {
        let options = FormatOptions::default()
            .with_null_text("-")
            .with_date_format("%d.%m.%Y")
            .with_float_precision(2);
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).expect("valid date");
        assert_eq!(format_value(None, &options), "-");
        assert_eq!(format_value(Some(&Value::Date(date)), &options), "29.02.2024");
        assert_eq!(format_value(Some(&Value::Float(1.0 / 3.0)), &options), "0.33");
    }

    #[test]
    fn invalid_date_format_falls_back_to_iso() {
        let options = FormatOptions::default().with_date_format("%Q");
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).expect("valid date");
        assert_eq!(format_value(Some(&Value::Date(date)), &options), "2024-02-29");
    }

    #[test]
    fn partial_options_deserialize() {
        let options: FormatOptions =
            serde_json::from_str(r#"{"null_text": "n/a"}"#).expect("deserialize options");
        assert_eq!(options.null_text, "n/a");
        assert_eq!(options.date_format, "%Y-%m-%d");
    }
}
