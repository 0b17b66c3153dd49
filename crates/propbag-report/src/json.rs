//! JSON export of resolved containers and validation reports.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use propbag_model::{AnyProperty, PropertySource, PropertySourceExt, Value, ValueSource};
use propbag_validate::{Message, MessageSeverity, ValidationReport};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::format::{FormatOptions, format_value};

#[derive(Debug, Serialize)]
struct PropertyRow<'a> {
    property: &'a str,
    source: ValueSource,
    #[serde(rename = "type")]
    property_type: String,
    value: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct MessageRow<'a> {
    message: String,
    property: Option<&'a str>,
    severity: MessageSeverity,
    template: &'a str,
}

/// Resolves each property and emits one JSON object per resolved value.
///
/// Booleans and numbers are written as native JSON; dates and non-finite
/// floats are written as formatted text.
pub fn container_to_json<'a, I>(
    source: &dyn PropertySource,
    properties: I,
    options: &FormatOptions,
) -> Result<serde_json::Value>
where
    I: IntoIterator<Item = &'a AnyProperty>,
{
    let mut rows = Vec::new();
    for property in properties {
        let resolved = source
            .get_property_value(property)
            .with_context(|| format!("failed to resolve property '{}'", property.name()))?;
        let Some(resolved) = resolved else {
            continue;
        };
        let row = PropertyRow {
            property: property.name(),
            source: resolved.source(),
            property_type: property.property_type().to_string(),
            value: json_value(resolved.value(), options),
        };
        rows.push(serde_json::to_value(row).context("failed to serialize property row")?);
    }
    Ok(serde_json::Value::Array(rows))
}

pub fn messages_to_json(messages: &[Message]) -> Result<serde_json::Value> {
    let rows: Vec<MessageRow<'_>> = messages
        .iter()
        .map(|message| MessageRow {
            message: message.formatted_message(),
            property: message.property_name(),
            severity: message.severity(),
            template: message.original_message(),
        })
        .collect();
    serde_json::to_value(rows).context("failed to serialize messages")
}

/// Report summary plus every message.
pub fn report_to_json(report: &ValidationReport) -> Result<serde_json::Value> {
    Ok(json!({
        "error_count": report.error_count(),
        "messages": messages_to_json(&report.messages)?,
        "valid": report.is_valid(),
        "warning_count": report.warning_count(),
    }))
}

/// Writes the pretty-printed report to `path`.
pub fn write_report_json(path: &Path, report: &ValidationReport) -> Result<()> {
    let value = report_to_json(report)?;
    let text = serde_json::to_string_pretty(&value).context("failed to render report json")?;
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    info!(
        path = %path.display(),
        messages = report.messages.len(),
        "wrote validation report"
    );
    Ok(())
}

fn json_value(value: Option<&Value>, options: &FormatOptions) -> serde_json::Value {
    match value {
        None => serde_json::Value::Null,
        Some(Value::Bool(flag)) => serde_json::Value::Bool(*flag),
        Some(Value::Int(number)) => serde_json::Value::from(*number),
        Some(Value::Float(number)) => serde_json::Number::from_f64(*number).map_or_else(
            || serde_json::Value::String(format_value(value, options)),
            serde_json::Value::Number,
        ),
        Some(Value::Text(text)) => serde_json::Value::String(text.clone()),
        Some(_) => serde_json::Value::String(format_value(value, options)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_floats_become_text() {
        let options = FormatOptions::default();
        assert_eq!(
            json_value(Some(&Value::Float(f64::NAN)), &options),
            serde_json::Value::String("NaN".to_string())
        );
        assert_eq!(json_value(Some(&Value::Float(2.5)), &options), json!(2.5));
        assert_eq!(json_value(None, &options), serde_json::Value::Null);
    }

    #[test]
    fn message_rows_keep_template_and_text() {
        let messages = vec![Message::new("{Name} is odd").with_property("Name", "Age")];
        let value = messages_to_json(&messages).unwrap();
        assert_eq!(value[0]["message"], "Age is odd");
        assert_eq!(value[0]["template"], "{Name} is odd");
        assert_eq!(value[0]["severity"], "error");
        assert_eq!(value[0]["property"], "Age");
    }
}
