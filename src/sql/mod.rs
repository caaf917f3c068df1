//! SQL utilities
//!
//! Statement building for the edit forms and formatting for previews.

pub mod formatter;
pub mod statement;

pub use formatter::format_sql;
pub use statement::{DraftMode, EditDraft, build_statement, drop_table};
