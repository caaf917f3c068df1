//! Error types for sfdb-admin
//!
//! This module defines the error hierarchy used throughout the client.
//! We use `thiserror` for library-style errors with clear error chains.

use std::io;

/// Main error type for the sfdb-admin client
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// Session lifecycle errors (connect / ping / close)
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Table and query API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Statement building errors
    #[error("Statement error: {0}")]
    Statement(#[from] StatementError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Console command parsing errors
    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}

/// Failures of connect, ping and disconnect
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Connection parameters failed validation before any request was sent
    #[error("Invalid connection parameters: {0}")]
    InvalidConfig(String),

    /// The admin API could not be reached at all
    #[error("API unreachable: {0}")]
    Unreachable(String),

    /// The request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// The backend answered with a non-success status
    #[error("Backend rejected the request (HTTP {status})")]
    Rejected { status: u16 },
}

/// Table metadata and data access errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No live session
    #[error("Not connected to database")]
    NotConnected,

    /// Table creation requested without any fields
    #[error("Can not create empty table")]
    EmptySchema,

    /// Raw query consisting only of whitespace
    #[error("Query is empty")]
    EmptyQuery,

    /// Table or field name is not a plain identifier
    #[error("Invalid name: '{0}'")]
    InvalidName(String),

    /// The backend answered with a non-success status
    #[error("Backend rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The admin API could not be reached at all
    #[error("API unreachable: {0}")]
    Unreachable(String),

    /// The request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// Response body did not match the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),

    /// Draft could not be turned into a statement
    #[error(transparent)]
    Statement(#[from] StatementError),
}

/// Statement builder errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatementError {
    /// Draft carries no values to write
    #[error("Nothing to write: no column values entered")]
    EmptyDraft,

    /// Draft names a column the table does not have
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Value for an integer column is not a base-10 integer
    #[error("Column '{column}' expects an integer, got '{value}'")]
    InvalidInteger { column: String, value: String },

    /// Value for a boolean column is neither an integer nor true/false
    #[error("Column '{column}' expects a boolean, got '{value}'")]
    InvalidBoolean { column: String, value: String },

    /// Value for a double column is not a finite number
    #[error("Column '{column}' expects a number, got '{value}'")]
    InvalidDouble { column: String, value: String },

    /// Update draft without the row it edits
    #[error("Update requires the original row")]
    MissingOriginalRow,

    /// Original row does not line up with the column list
    #[error("Original row has {actual} values but the table has {expected} columns")]
    RowShape { expected: usize, actual: usize },

    /// Table name is not a plain identifier
    #[error("Invalid table name: '{0}'")]
    InvalidName(String),
}

/// Configuration loading/parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Home directory not found
    #[error("Could not determine home directory")]
    NoHomeDir,

    /// Config file not found
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Connection profile not found
    #[error("Connection profile '{0}' not found")]
    ProfileNotFound(String),
}

/// Console command parsing errors
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Unknown command
    #[error("Unknown command: {0}")]
    Unknown(String),

    /// Missing required argument
    #[error("Missing required argument for command")]
    MissingArgument,

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ConnectionError {
    /// HTTP status to report for this failure (0 = API unreachable)
    pub fn status(&self) -> u16 {
        match self {
            ConnectionError::InvalidConfig(_) => 400,
            ConnectionError::Unreachable(_) => 0,
            ConnectionError::Timeout => 408,
            ConnectionError::Rejected { status } => *status,
        }
    }
}

impl ApiError {
    /// HTTP status to report for this failure (0 = API unreachable)
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Rejected { status, .. } => *status,
            ApiError::Unreachable(_) => 0,
            ApiError::Timeout => 408,
            ApiError::NotConnected => 401,
            _ => 400,
        }
    }
}

/// User-facing title/message pair for a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPage {
    pub title: &'static str,
    pub message: &'static str,
}

impl ErrorPage {
    pub const API_DOWN: u16 = 0;
    pub const UNAUTHORIZED: u16 = 401;
    pub const FORBIDDEN: u16 = 403;
    pub const REQUEST_TIMEOUT: u16 = 408;

    /// Map an HTTP status code to what the user should see
    pub fn for_status(status: u16) -> Self {
        match status {
            Self::UNAUTHORIZED => Self {
                title: "Login required",
                message: "You are currently logged out or your authentication token has expired. \
                          Please connect again.",
            },
            Self::FORBIDDEN => Self {
                title: "Unauthorized access",
                message: "You are not authorized to access the selected resource.",
            },
            Self::REQUEST_TIMEOUT => Self {
                title: "Request timed out",
                message: "Your previous request has timed out. Please try again.",
            },
            Self::API_DOWN => Self {
                title: "SFDB API is unreachable",
                message: "We couldn't reach SFDB backend API. Please make sure it is running and try again.",
            },
            _ => Self {
                title: "Something went wrong.",
                message: "A generic error has happened",
            },
        }
    }
}

/// Specialized Result type for sfdb-admin operations
pub type Result<T> = std::result::Result<T, AdminError>;

/// Specialized Result type for session operations
pub type ConnectionResult<T> = std::result::Result<T, ConnectionError>;

/// Specialized Result type for table/query operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Specialized Result type for statement building
pub type StatementResult<T> = std::result::Result<T, StatementError>;

/// Specialized Result type for config operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized Result type for command operations
pub type CommandResult<T> = std::result::Result<T, CommandError>;
