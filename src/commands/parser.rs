//! Console command parsing
//!
//! Parses lines typed into the query console. Lines starting with `/` are
//! console commands (e.g. `/tables`, `/quit`); anything else is a raw query
//! sent to the backend verbatim.

use crate::error::{CommandError, CommandResult};

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List tables of the current database
    Tables,

    /// Show the field list of a table
    Describe(String),

    /// Show every row of a table
    View(String),

    /// Drop a table
    Drop(String),

    /// Execute a statement that returns no rows
    Exec(String),

    /// Switch the current database
    Use(String),

    /// Show connection state
    Status,

    /// Reconnect with the last connection parameters
    Connect,

    /// Close the backend session
    Disconnect,

    /// Show help
    Help,

    /// Leave the console
    Quit,

    /// Raw query text
    Query(String),
}

/// Parse a console line into a Command
pub fn parse_command(input: &str) -> CommandResult<Command> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CommandError::MissingArgument);
    }

    let Some(body) = input.strip_prefix('/') else {
        return Ok(Command::Query(input.to_string()));
    };

    let (name, rest) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    };

    match name {
        "tables" | "t" => Ok(Command::Tables),
        "describe" | "d" => single_arg(rest).map(Command::Describe),
        "view" | "v" => single_arg(rest).map(Command::View),
        "drop" => single_arg(rest).map(Command::Drop),
        "use" => single_arg(rest).map(Command::Use),
        "exec" | "x" => {
            if rest.is_empty() {
                Err(CommandError::MissingArgument)
            } else {
                Ok(Command::Exec(rest.to_string()))
            }
        }
        "status" | "s" => Ok(Command::Status),
        "connect" => Ok(Command::Connect),
        "disconnect" | "close" => Ok(Command::Disconnect),
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        unknown => Err(CommandError::Unknown(unknown.to_string())),
    }
}

fn single_arg(rest: &str) -> CommandResult<String> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(arg), None) => Ok(arg.to_string()),
        (None, _) => Err(CommandError::MissingArgument),
        (Some(_), Some(extra)) => Err(CommandError::InvalidArgument(format!(
            "unexpected '{}'",
            extra
        ))),
    }
}

/// Console help text
pub const HELP: &str = "\
/tables               list tables
/describe <table>     show table fields
/view <table>         show all rows of a table
/drop <table>         drop a table
/exec <statement>     execute a statement without results
/use <db>             switch database
/status               show connection state
/connect              reconnect with the last parameters
/disconnect           close the session
/help                 this help
/quit                 leave the console
anything else is sent as a query
";
