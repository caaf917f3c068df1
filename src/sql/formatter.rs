//! SQL formatting
//!
//! Pretty-prints statements for `--dry-run` previews using the sqlformat
//! crate. Only ever used for display; the statement sent to the backend is
//! the unformatted one.

use sqlformat::{FormatOptions, Indent, QueryParams, format};

/// Format a statement for display
pub fn format_sql(sql: &str) -> String {
    format_sql_with_indent(sql, 2)
}

/// Format a statement with custom indentation
pub fn format_sql_with_indent(sql: &str, indent_size: u8) -> String {
    let mut options = FormatOptions::default();
    options.indent = Indent::Spaces(indent_size);

    format(sql, &QueryParams::None, &options)
}
