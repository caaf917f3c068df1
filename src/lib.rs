//! sfdb-admin - administration client for the SFDB REST API
//!
//! sfdb-admin talks to the SFDB admin gateway over HTTP/JSON: it opens and
//! closes backend sessions, keeps them alive with a liveness poll, lists,
//! describes, creates and drops tables, fetches rows, and runs raw queries
//! and generated INSERT/UPDATE statements.
//!
//! # Architecture
//!
//! - [`session`]: connection state, connect/disconnect/ping, liveness poll
//! - [`api`]: HTTP transport, wire types and the table/query client
//! - [`sql`]: statement builder for insert/update drafts, SQL formatting
//! - [`config`]: connection profiles and client settings
//! - [`commands`]: query console command parsing and execution
//! - [`output`]: result rendering as text table, JSON or CSV
//! - [`error`]: error types and result aliases
//! - [`logging`]: tracing subscriber setup
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use sfdb_admin::api::HttpTransport;
//! use sfdb_admin::config::ConnectionConfig;
//! use sfdb_admin::session::Session;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::new("http://localhost:3000/api", Duration::from_secs(30))?;
//! let mut session = Session::new(transport);
//!
//! let config = ConnectionConfig::from_conn_str("root:@localhost:27910/MAIN?ttl=60")?;
//! session.connect(config).await?;
//!
//! let tables = session.tables();
//! for table in tables.list_tables("MAIN").await? {
//!     println!("{}", table.name);
//! }
//!
//! session.disconnect().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod session;
pub mod sql;

pub use error::{AdminError, ApiError, CommandError, ConfigError, ConnectionError, ErrorPage, Result, StatementError};
pub use session::{ConnectionState, Session};
