//! Terminal tables for resolved containers and validation messages.

use anyhow::{Context, Result};
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use propbag_model::{AnyProperty, PropertySource, PropertySourceExt, ValueSource};
use propbag_validate::{Message, MessageSeverity};
use tracing::debug;

use crate::format::{FormatOptions, format_value};

/// Resolves each property against `source` and renders Property / Value /
/// Source rows. Properties that resolve to nothing are left out.
pub fn render_container<'a, I>(
    source: &dyn PropertySource,
    properties: I,
    options: &FormatOptions,
) -> Result<Table>
where
    I: IntoIterator<Item = &'a AnyProperty>,
{
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Property"),
        header_cell("Value"),
        header_cell("Source"),
    ]);
    apply_table_style(&mut table);

    let mut rows = 0usize;
    for property in properties {
        let resolved = source
            .get_property_value(property)
            .with_context(|| format!("failed to resolve property '{}'", property.name()))?;
        let Some(resolved) = resolved else {
            continue;
        };
        let value = format_value(resolved.value(), options);
        let value_cell = if resolved.is_null() {
            dim_cell(value)
        } else {
            Cell::new(value)
        };
        table.add_row(vec![
            Cell::new(property.name()).add_attribute(Attribute::Bold),
            value_cell,
            source_cell(resolved.source()),
        ]);
        rows += 1;
    }
    debug!(rows, "rendered container table");
    Ok(table)
}

/// Renders Severity / Property / Message rows, most severe first. Messages of
/// equal severity keep their validation order.
pub fn render_messages(messages: &[Message]) -> Table {
    let mut ordered: Vec<&Message> = messages.iter().collect();
    ordered.sort_by_key(|message| std::cmp::Reverse(message.severity()));

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Property"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for message in ordered {
        table.add_row(vec![
            severity_cell(message.severity()),
            Cell::new(message.property_name().unwrap_or("-")),
            Cell::new(message.formatted_message()),
        ]);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn severity_cell(severity: MessageSeverity) -> Cell {
    match severity {
        MessageSeverity::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        MessageSeverity::Warning => Cell::new("WARN").fg(Color::Yellow),
        MessageSeverity::Information => Cell::new("INFO").fg(Color::Blue),
    }
}

fn source_cell(source: ValueSource) -> Cell {
    match source {
        ValueSource::Defined => Cell::new(source),
        ValueSource::Calculated => Cell::new(source).fg(Color::Green),
        ValueSource::DefaultValue => Cell::new(source).fg(Color::Yellow),
        ValueSource::NotDefined => dim_cell(source),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
