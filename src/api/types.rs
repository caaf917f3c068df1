//! Wire types of the admin REST API
//!
//! Core data structures for table listings, schemas and row data as the
//! backend encodes them in JSON.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A table as returned by the table listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: String,
}

/// Declared type of a table field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int64,
    Double,
    String,
}

/// One field of a table definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
}

/// Ordered field list of a table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<FieldSpec>,
}

/// Type tag attached to a result column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[serde(alias = "int64")]
    Int,
    #[serde(alias = "float")]
    Double,
    Bool,
    String,
    #[serde(other)]
    Unknown,
}

/// Rows returned by a table fetch or a query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub columns: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub column_types: HashMap<String, ColumnType>,

    /// Values are positionally aligned with `columns`
    #[serde(default, deserialize_with = "null_as_default")]
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Int64 => "int64",
            FieldType::Double => "double",
            FieldType::String => "string",
        }
    }

    /// Parse a type name as typed on the command line
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "int64" | "int" | "integer" => Some(FieldType::Int64),
            "double" | "float" => Some(FieldType::Double),
            "string" | "str" | "text" => Some(FieldType::String),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

impl From<FieldType> for ColumnType {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Int64 => ColumnType::Int,
            FieldType::Double => ColumnType::Double,
            FieldType::String => ColumnType::String,
        }
    }
}

impl TableData {
    /// Type of a column, `Unknown` if the backend did not report one
    pub fn column_type(&self, column: &str) -> ColumnType {
        self.column_types
            .get(column)
            .copied()
            .unwrap_or(ColumnType::Unknown)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Display text for an opaque cell value
pub fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
