//! Query console commands
//!
//! Parsing of console lines and their execution against a session.

pub mod handlers;
pub mod parser;

pub use handlers::{Action, Console, session_lost};
pub use parser::{Command, HELP, parse_command};
