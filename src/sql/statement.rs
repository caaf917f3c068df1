//! INSERT / UPDATE / DROP statement builder
//!
//! Turns an [`EditDraft`] (the values a user typed into an insert or edit
//! form) into a literal SQL statement for the `exec` endpoint.
//!
//! Values are formatted by the column's declared type. Integer, boolean and
//! double values are parsed and rejected with a [`StatementError`] when they
//! do not parse. Everything else is wrapped in double quotes as-is: embedded
//! quote characters are NOT escaped, so string input can break out of the
//! literal.

use crate::api::types::ColumnType;
use crate::error::{StatementError, StatementResult};
use std::collections::HashMap;

/// Whether a draft creates a new row or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DraftMode {
    #[default]
    Insert,
    Update,
}

/// Staging area for an in-progress insert or update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditDraft {
    pub mode: DraftMode,
    /// Column name -> text as entered by the user
    pub values: HashMap<String, String>,
    /// Row being edited, aligned with the table's columns (Update only)
    pub original_row: Vec<serde_json::Value>,
}

impl EditDraft {
    /// Empty insert draft
    pub fn insert() -> Self {
        Self::default()
    }

    /// Update draft for an existing row
    pub fn update(original_row: Vec<serde_json::Value>) -> Self {
        Self {
            mode: DraftMode::Update,
            values: HashMap::new(),
            original_row,
        }
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(column.into(), value.into());
        self
    }

    pub fn clear(&mut self, column: &str) {
        self.values.remove(column);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Back to an empty insert draft (after submit or when the form closes)
    pub fn reset(&mut self) {
        *self = Self::insert();
    }
}

/// Build the statement for `draft` against a table's columns and types
pub fn build_statement(
    table: &str,
    columns: &[String],
    types: &HashMap<String, ColumnType>,
    draft: &EditDraft,
) -> StatementResult<String> {
    check_identifier(table)?;
    if draft.values.is_empty() {
        return Err(StatementError::EmptyDraft);
    }
    if let Some(unknown) = draft.values.keys().find(|k| !columns.contains(k)) {
        return Err(StatementError::UnknownColumn(unknown.clone()));
    }

    match draft.mode {
        DraftMode::Insert => build_insert(table, columns, types, draft),
        DraftMode::Update => build_update(table, columns, types, draft),
    }
}

fn build_insert(
    table: &str,
    columns: &[String],
    types: &HashMap<String, ColumnType>,
    draft: &EditDraft,
) -> StatementResult<String> {
    let mut names = Vec::with_capacity(draft.values.len());
    let mut literals = Vec::with_capacity(draft.values.len());

    for column in columns {
        if let Some(value) = draft.values.get(column) {
            names.push(column.as_str());
            literals.push(format_value(column, column_type(types, column), value)?);
        }
    }

    Ok(format!(
        "INSERT INTO {}({}) VALUES ({})",
        table,
        names.join(", "),
        literals.join(", ")
    ))
}

fn build_update(
    table: &str,
    columns: &[String],
    types: &HashMap<String, ColumnType>,
    draft: &EditDraft,
) -> StatementResult<String> {
    if draft.original_row.is_empty() {
        return Err(StatementError::MissingOriginalRow);
    }
    if draft.original_row.len() != columns.len() {
        return Err(StatementError::RowShape {
            expected: columns.len(),
            actual: draft.original_row.len(),
        });
    }

    let mut assignments = Vec::with_capacity(draft.values.len());
    for column in columns {
        if let Some(value) = draft.values.get(column) {
            let literal = format_value(column, column_type(types, column), value)?;
            assignments.push(format!("{}={}", column, literal));
        }
    }

    // Match the row by every original value, not only the edited ones
    let conditions: Vec<String> = columns
        .iter()
        .zip(&draft.original_row)
        .map(|(column, original)| match original {
            serde_json::Value::Null => format!("{} IS NULL", column),
            value => format!("{}={}", column, format_original(value)),
        })
        .collect();

    Ok(format!(
        "UPDATE {} SET {} WHERE {}",
        table,
        assignments.join(", "),
        conditions.join(" AND ")
    ))
}

/// `DROP TABLE <table>;`
pub fn drop_table(table: &str) -> StatementResult<String> {
    check_identifier(table)?;
    Ok(format!("DROP TABLE {};", table))
}

/// Format one user-entered value as a SQL literal for its column type
pub fn format_value(column: &str, column_type: ColumnType, raw: &str) -> StatementResult<String> {
    let trimmed = raw.trim();
    match column_type {
        ColumnType::Int => trimmed
            .parse::<i64>()
            .map(|n| n.to_string())
            .map_err(|_| StatementError::InvalidInteger {
                column: column.to_string(),
                value: raw.to_string(),
            }),
        ColumnType::Bool => parse_bool(trimmed)
            .map(|b| b.to_string())
            .ok_or_else(|| StatementError::InvalidBoolean {
                column: column.to_string(),
                value: raw.to_string(),
            }),
        ColumnType::Double => match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n.to_string()),
            _ => Err(StatementError::InvalidDouble {
                column: column.to_string(),
                value: raw.to_string(),
            }),
        },
        ColumnType::String | ColumnType::Unknown => Ok(quote(raw)),
    }
}

/// Nonzero integers are true, zero is false; `true`/`false` also accepted
fn parse_bool(text: &str) -> Option<bool> {
    if let Ok(n) = text.parse::<i64>() {
        return Some(n != 0);
    }
    match text.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn format_original(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::String(s) => quote(s),
        other => quote(&other.to_string()),
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text)
}

fn column_type(types: &HashMap<String, ColumnType>, column: &str) -> ColumnType {
    types.get(column).copied().unwrap_or(ColumnType::Unknown)
}

/// Letters, digits and `_`, not starting with a digit
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_identifier(name: &str) -> StatementResult<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(StatementError::InvalidName(name.to_string()))
    }
}
