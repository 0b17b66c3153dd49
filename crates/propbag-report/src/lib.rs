//! Rendering of property containers and validation results.
//!
//! - **Tables**: `comfy-table` views of resolved values and messages
//! - **JSON**: machine-readable exports of the same data
//! - **Formatting**: configurable display text for property values

pub mod format;
pub mod json;
pub mod table;

pub use format::{FormatOptions, format_value};
pub use json::{container_to_json, messages_to_json, report_to_json, write_report_json};
pub use table::{render_container, render_messages};
