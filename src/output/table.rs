//! Table output formatting

use tabled::{
    Table, Tabled,
    settings::{
        Alignment, Modify, Style,
        object::{Columns, Rows},
    },
};

/// Format rows as a rounded table, or a placeholder when there are none
pub fn format_table<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// Two-column label/value table for single records and summaries
pub fn format_fields(fields: &[(&str, String)]) -> String {
    let mut builder = tabled::builder::Builder::default();
    for (label, value) in fields {
        builder.push_record([label.to_string(), value.clone()]);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Columns::last()).with(Alignment::right()));

    table.to_string()
}
