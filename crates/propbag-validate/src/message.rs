//! Validation messages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bag key holding the property name.
pub const NAME_KEY: &str = "Name";
/// Bag key holding the property name, for templates written in camel case.
pub const PROPERTY_NAME_KEY: &str = "propertyName";
/// Bag key holding the formatted value snapshot.
pub const VALUE_KEY: &str = "value";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSeverity {
    Information,
    Warning,
    #[default]
    Error,
}

impl MessageSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageSeverity::Information => "Information",
            MessageSeverity::Warning => "Warning",
            MessageSeverity::Error => "Error",
        }
    }
}

impl fmt::Display for MessageSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validation message: a `{placeholder}` template plus the property bag
/// captured when the message was created.
///
/// Placeholders are substituted lazily by [`Message::formatted_message`], so a
/// template swapped in later still sees the original name and value.
///
/// ```rust
/// use propbag_validate::Message;
///
/// let message = Message::new("{Name} should be over 18! but was {value}")
///     .with_property("Name", "Age")
///     .with_property("value", "9");
/// assert_eq!(message.formatted_message(), "Age should be over 18! but was 9");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    severity: MessageSeverity,
    original_message: String,
    properties: Vec<(String, String)>,
}

impl Message {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            severity: MessageSeverity::default(),
            original_message: template.into(),
            properties: Vec::new(),
        }
    }

    /// Adds a bag entry. An existing key keeps its position and takes the new value.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.properties.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.properties.push((key, value)),
        }
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: MessageSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Replaces the template, keeping severity and bag.
    #[must_use]
    pub fn with_original_message(mut self, template: impl Into<String>) -> Self {
        self.original_message = template.into();
        self
    }

    pub fn severity(&self) -> MessageSeverity {
        self.severity
    }

    pub fn original_message(&self) -> &str {
        &self.original_message
    }

    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Name of the property the message is about, if recorded.
    pub fn property_name(&self) -> Option<&str> {
        self.property(PROPERTY_NAME_KEY)
            .or_else(|| self.property(NAME_KEY))
    }

    /// Substitutes `{key}` placeholders from the bag. Unknown placeholders
    /// and unmatched braces are kept verbatim.
    pub fn formatted_message(&self) -> String {
        let template = self.original_message.as_str();
        let mut formatted = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            formatted.push_str(&rest[..open]);
            let after_open = &rest[open + 1..];
            let Some(close) = after_open.find('}') else {
                formatted.push_str(&rest[open..]);
                return formatted;
            };
            let key = &after_open[..close];
            match self.property(key) {
                Some(value) => formatted.push_str(value),
                None => formatted.push_str(&rest[open..open + close + 2]),
            }
            rest = &after_open[close + 1..];
        }
        formatted.push_str(rest);
        formatted
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted_message())
    }
}
