//! Result rendering (aligned table / JSON / CSV)
//!
//! Pure serialization functions. No terminal I/O here; the caller prints the
//! returned string.

use crate::api::types::{TableData, TableDescriptor, TableSchema, cell_text};
use unicode_width::UnicodeWidthStr;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// Render a result set in the requested format
pub fn render(data: &TableData, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => to_table(data),
        OutputFormat::Json => to_json(data),
        OutputFormat::Csv => to_csv(data),
    }
}

/// Column-aligned text with a header separator and a row count footer
pub fn to_table(data: &TableData) -> String {
    if data.columns.is_empty() {
        return "(no columns)\n".to_string();
    }

    let cells: Vec<Vec<String>> = data
        .rows
        .iter()
        .map(|row| row.iter().map(|v| single_line(&cell_text(v))).collect())
        .collect();

    let mut widths: Vec<usize> = data.columns.iter().map(|c| c.width()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.width());
            }
        }
    }

    let mut out = String::new();
    push_line(&mut out, data.columns.iter().map(String::as_str), &widths);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&separator.join("-+-"));
    out.push('\n');
    for row in &cells {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }

    let n = data.rows.len();
    out.push_str(&format!("({} row{})\n", n, if n == 1 { "" } else { "s" }));
    out
}

/// Serialize rows as a JSON array of objects keyed by column name
pub fn to_json(data: &TableData) -> String {
    let rows: Vec<serde_json::Value> = data
        .rows
        .iter()
        .map(|row| {
            let mut obj = serde_json::Map::new();
            for (i, value) in row.iter().enumerate() {
                let key = data.columns.get(i).map(String::as_str).unwrap_or("?");
                obj.insert(key.to_string(), value.clone());
            }
            serde_json::Value::Object(obj)
        })
        .collect();

    serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
}

/// Serialize rows as RFC 4180 CSV (NULL → empty field)
pub fn to_csv(data: &TableData) -> String {
    let mut out = String::new();

    for (i, col) in data.columns.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        csv_escape_into(&mut out, col);
    }
    out.push('\n');

    for row in &data.rows {
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let text = match value {
                serde_json::Value::Null => String::new(),
                other => cell_text(other),
            };
            csv_escape_into(&mut out, &text);
        }
        out.push('\n');
    }

    out
}

/// One table name per line
pub fn table_list(tables: &[TableDescriptor]) -> String {
    if tables.is_empty() {
        return "(no tables)\n".to_string();
    }
    tables.iter().map(|t| format!("{}\n", t.name)).collect()
}

/// Numbered field listing for `describe`
pub fn schema(schema: &TableSchema) -> String {
    let name_width = schema
        .fields
        .iter()
        .map(|f| f.name.width())
        .max()
        .unwrap_or(0)
        .max("name".len());

    let mut out = format!("{:>3}  {:<name_width$}  type\n", "#", "name");
    for (i, field) in schema.fields.iter().enumerate() {
        let pad = name_width.saturating_sub(field.name.width());
        out.push_str(&format!(
            "{:>3}  {}{}  {}\n",
            i,
            field.name,
            " ".repeat(pad),
            field.field_type
        ));
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, w)| format!("{}{}", cell, " ".repeat(w.saturating_sub(cell.width()))))
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}

fn single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

/// Quote a field if it contains `,` `"` or a newline (RFC 4180).
fn csv_escape_into(out: &mut String, field: &str) {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
