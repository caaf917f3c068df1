//! Command execution handlers
//!
//! The query console state and the execution of parsed commands against it.

use crate::api::transport::Transport;
use crate::commands::{Command, HELP};
use crate::config::ConnectionConfig;
use crate::error::{CommandError, Result};
use crate::output::{self, OutputFormat};
use crate::session::{ConnectionState, Session};
use tokio::sync::watch;

/// What the console loop should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print this text and keep reading
    Print(String),
    /// Leave the console
    Quit,
}

/// Query console bound to one session
pub struct Console<T: Transport> {
    pub session: Session<T>,
    /// Database the table commands operate on
    pub database: String,
    pub format: OutputFormat,
    /// Parameters for `/connect` when the session has not connected yet
    fallback: Option<ConnectionConfig>,
}

impl<T: Transport> Console<T> {
    pub fn new(
        session: Session<T>,
        database: impl Into<String>,
        format: OutputFormat,
        fallback: Option<ConnectionConfig>,
    ) -> Self {
        Self {
            session,
            database: database.into(),
            format,
            fallback,
        }
    }

    /// Execute a command and return the resulting action
    pub async fn execute(&mut self, command: Command) -> Result<Action> {
        let db = self.database.clone();
        let tables = self.session.tables();

        let text = match command {
            Command::Tables => output::table_list(&tables.list_tables(&db).await?),
            Command::Describe(table) => output::schema(&tables.describe_table(&db, &table).await?),
            Command::View(table) => output::render(&tables.get_table(&db, &table).await?, self.format),
            Command::Query(text) => output::render(&tables.query(&db, &text).await?, self.format),
            Command::Drop(table) => {
                tables.delete_table(&db, &table).await?;
                format!("Table {} deleted.\n", table)
            }
            Command::Exec(statement) => {
                tables.exec(&db, &statement).await?;
                "OK\n".to_string()
            }
            Command::Use(name) => {
                self.database = name;
                format!("Using database {}.\n", self.database)
            }
            Command::Status => self.status_line(),
            Command::Connect => {
                let config = self
                    .session
                    .config()
                    .cloned()
                    .or_else(|| self.fallback.clone())
                    .ok_or_else(|| {
                        CommandError::InvalidArgument(
                            "no connection parameters; start with --profile or --conn".into(),
                        )
                    })?;
                self.session.connect(config).await?;
                self.status_line()
            }
            Command::Disconnect => {
                self.session.disconnect().await?;
                "Closed DB connection.\n".to_string()
            }
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Action::Quit),
        };

        Ok(Action::Print(text))
    }

    /// Execute a command typed into the shell
    ///
    /// `observer` is marked seen afterwards, so a state change still pending
    /// on it was made by the liveness poll rather than by this command.
    pub async fn execute_observed(
        &mut self,
        command: Command,
        observer: &mut watch::Receiver<ConnectionState>,
    ) -> Result<Action> {
        let result = self.execute(command).await;
        observer.borrow_and_update();
        result
    }

    fn status_line(&self) -> String {
        match self.session.config() {
            Some(config) => format!(
                "{} ({}, database {})\n",
                self.session.state().label(),
                config.display_target(),
                self.database
            ),
            None => format!(
                "{} (database {})\n",
                self.session.state().label(),
                self.database
            ),
        }
    }
}

/// Consume a pending state change; true when it means the session was lost
pub fn session_lost(observer: &mut watch::Receiver<ConnectionState>) -> bool {
    *observer.borrow_and_update() == ConnectionState::Disconnected
}
