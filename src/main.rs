//! sfdb-admin - administration client for the SFDB REST API
//!
//! This is the command-line entry point. The actual logic is in the library
//! modules for better testability.

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use sfdb_admin::api::{FieldSpec, FieldType, HttpTransport, TableClient, TableData, Transport};
use sfdb_admin::commands::{Action, Console, parse_command, session_lost};
use sfdb_admin::config::{self, ConnectionConfig, Settings};
use sfdb_admin::output::{self, OutputFormat};
use sfdb_admin::sql::{self, EditDraft};
use sfdb_admin::{ApiError, ConnectionError, ConnectionState, ErrorPage, Session, logging};
use std::io::Write;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Parser)]
#[command(name = "sfdb-admin", version, about = "Administration client for the SFDB REST API")]
struct Cli {
    /// Admin API base URL (overrides api_endpoint from config.toml)
    #[arg(long, global = true)]
    api: Option<String>,

    /// Connection profile from ~/.sfdb-admin/connections.toml
    #[arg(long, global = true, conflicts_with = "conn")]
    profile: Option<String>,

    /// Connection string: user:password@host:port/db?ttl=N
    #[arg(long, global = true)]
    conn: Option<String>,

    /// Database to operate on
    #[arg(long, global = true)]
    db: Option<String>,

    /// Result output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Open a backend session
    Connect,
    /// Close the backend session
    Disconnect,
    /// Check whether the backend session is alive
    Ping,
    /// List tables
    Tables,
    /// Show the fields of a table
    Describe { table: String },
    /// Show every row of a table
    View { table: String },
    /// Create a table from name:type field specs (types: int64, double, string)
    Create {
        table: String,
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Delete a table
    Drop {
        table: String,
        /// Execute a DROP TABLE statement instead of calling the delete endpoint
        #[arg(long)]
        statement: bool,
    },
    /// Run a query and print its result set
    Query { text: String },
    /// Execute a statement that returns no rows
    Exec {
        statement: String,
        /// Print the statement instead of executing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Insert a row from column=value pairs
    Insert {
        table: String,
        #[arg(required = true)]
        values: Vec<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Update the row at --row (0-based, as listed by `view`) from column=value pairs
    Update {
        table: String,
        #[arg(long)]
        row: usize,
        #[arg(required = true)]
        values: Vec<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Interactive query console
    Shell,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = config::load_settings().unwrap_or_else(|e| {
        eprintln!("Warning: {}. Using default settings.", e);
        Settings::default()
    });
    logging::init_logging(cli.verbose, settings.log_filter.as_deref());

    let endpoint = cli.api.clone().unwrap_or_else(|| settings.api_endpoint.clone());
    let transport = HttpTransport::new(&endpoint, settings.request_timeout())
        .with_context(|| format!("creating HTTP client for {}", endpoint))?;
    let mut session = Session::with_poll_interval(transport, settings.poll_interval());

    let connection = resolve_connection(&cli)?;
    let db = cli
        .db
        .clone()
        .or_else(|| connection.as_ref().map(|c| c.database.clone()))
        .unwrap_or_else(|| settings.default_database.clone());
    tracing::debug!(%endpoint, %db, "starting");

    match cli.command {
        Cmd::Connect => {
            let config = connection.unwrap_or_else(|| ConnectionConfig {
                database: db.clone(),
                ..ConnectionConfig::default()
            });
            let target = config.display_target();
            session.connect(config).await?;
            println!("Connected to {}.", target);
        }
        Cmd::Disconnect => {
            session.disconnect().await?;
            println!("Closed DB connection.");
        }
        Cmd::Ping => {
            session.ping().await?;
            println!("{}", session.state().label());
        }
        Cmd::Shell => {
            establish(&mut session, connection.clone()).await;
            let console = Console::new(session, db, cli.format, connection);
            run_shell(console).await?;
        }
        command => {
            establish(&mut session, connection).await;
            let tables = session.tables();
            run_table_command(&tables, &db, command, cli.format).await?;
        }
    }

    Ok(())
}

/// Connection parameters from --profile or --conn, with --db applied
fn resolve_connection(cli: &Cli) -> Result<Option<ConnectionConfig>> {
    let mut connection = if let Some(name) = &cli.profile {
        Some(config::find_connection(name)?)
    } else if let Some(conn) = &cli.conn {
        Some(ConnectionConfig::from_conn_str(conn)?)
    } else {
        None
    };
    if let (Some(config), Some(db)) = (connection.as_mut(), &cli.db) {
        config.database = db.clone();
    }
    Ok(connection)
}

/// Reuse a live backend session, or open one if parameters were given
async fn establish<T: Transport>(session: &mut Session<T>, connection: Option<ConnectionConfig>) {
    if session.resume().await == ConnectionState::Connected {
        return;
    }
    if let Some(config) = connection
        && let Err(e) = session.connect(config).await
    {
        tracing::warn!(error = %e, "could not open a session");
    }
}

async fn run_table_command<T: Transport>(
    tables: &TableClient<T>,
    db: &str,
    command: Cmd,
    format: OutputFormat,
) -> Result<()> {
    match command {
        Cmd::Tables => print!("{}", output::table_list(&tables.list_tables(db).await?)),
        Cmd::Describe { table } => print!("{}", output::schema(&tables.describe_table(db, &table).await?)),
        Cmd::View { table } => print!("{}", output::render(&tables.get_table(db, &table).await?, format)),
        Cmd::Query { text } => print!("{}", output::render(&tables.query(db, &text).await?, format)),
        Cmd::Create { table, fields } => {
            let fields = fields
                .iter()
                .map(String::as_str)
                .map(parse_field)
                .collect::<Result<Vec<_>>>()?;
            tables.create_table(db, &table, &fields).await?;
            println!("Table {} created.", table);
        }
        Cmd::Drop { table, statement } => {
            if statement {
                tables.drop_table(db, &table).await?;
            } else {
                tables.delete_table(db, &table).await?;
            }
            println!("Table {} deleted.", table);
        }
        Cmd::Exec { statement, dry_run } => {
            if dry_run {
                println!("{}", sql::format_sql(&statement));
            } else {
                tables.exec(db, &statement).await?;
                println!("OK");
            }
        }
        Cmd::Insert {
            table,
            values,
            dry_run,
        } => {
            let data = tables.get_table(db, &table).await?;
            let mut draft = EditDraft::insert();
            fill_draft(&mut draft, &values)?;
            submit(tables, db, &table, draft, &data, dry_run).await?;
        }
        Cmd::Update {
            table,
            row,
            values,
            dry_run,
        } => {
            let data = tables.get_table(db, &table).await?;
            let Some(original) = data.rows.get(row).cloned() else {
                bail!("table {} has {} rows; no row {}", table, data.rows.len(), row);
            };
            let mut draft = EditDraft::update(original);
            fill_draft(&mut draft, &values)?;
            submit(tables, db, &table, draft, &data, dry_run).await?;
        }
        Cmd::Connect | Cmd::Disconnect | Cmd::Ping | Cmd::Shell => {
            unreachable!("session commands are handled in run")
        }
    }
    Ok(())
}

async fn submit<T: Transport>(
    tables: &TableClient<T>,
    db: &str,
    table: &str,
    mut draft: EditDraft,
    data: &TableData,
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        let statement = sql::build_statement(table, &data.columns, &data.column_types, &draft)?;
        println!("{}", sql::format_sql(&statement));
    } else {
        let statement = tables.submit(db, table, &mut draft, data).await?;
        println!("{}", statement);
    }
    Ok(())
}

/// `name:type` as typed on the command line
fn parse_field(spec: &str) -> Result<FieldSpec> {
    let Some((name, type_name)) = spec.split_once(':') else {
        bail!("field '{}' must be written as name:type", spec);
    };
    let Some(field_type) = FieldType::parse(type_name) else {
        bail!("unknown field type '{}' (expected int64, double or string)", type_name);
    };
    Ok(FieldSpec::new(name, field_type))
}

fn fill_draft(draft: &mut EditDraft, assignments: &[String]) -> Result<()> {
    for assignment in assignments {
        let Some((column, value)) = assignment.split_once('=') else {
            bail!("value '{}' must be written as column=value", assignment);
        };
        draft.set(column.trim(), value);
    }
    Ok(())
}

async fn run_shell<T: Transport>(mut console: Console<T>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut state = console.session.subscribe();

    println!(
        "sfdb-admin console ({}). Type /help for commands.",
        console.session.state().label()
    );
    prompt(&console.database);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !line.trim().is_empty() {
                    match parse_command(&line) {
                        Ok(command) => match console.execute_observed(command, &mut state).await {
                            Ok(Action::Print(text)) => print!("{}", text),
                            Ok(Action::Quit) => break,
                            Err(e) => report(&anyhow::Error::from(e)),
                        },
                        Err(e) => eprintln!("{}", e),
                    }
                }
                prompt(&console.database);
            }
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                if session_lost(&mut state) {
                    eprintln!("\nDisconnected from backend. Use /connect to reconnect.");
                    prompt(&console.database);
                }
            }
        }
    }

    Ok(())
}

fn prompt(db: &str) {
    print!("{}> ", db);
    let _ = std::io::stdout().flush();
}

/// Print an error with the user-facing title for its HTTP status
fn report(err: &anyhow::Error) {
    let status = err
        .downcast_ref::<ApiError>()
        .map(ApiError::status)
        .or_else(|| err.downcast_ref::<ConnectionError>().map(ConnectionError::status))
        .or_else(|| match err.downcast_ref::<sfdb_admin::AdminError>() {
            Some(sfdb_admin::AdminError::Api(e)) => Some(e.status()),
            Some(sfdb_admin::AdminError::Connection(e)) => Some(e.status()),
            _ => None,
        });

    match status {
        Some(status) => {
            let page = ErrorPage::for_status(status);
            eprintln!("{}: {}", page.title, err);
            eprintln!("{}", page.message);
        }
        None => eprintln!("Error: {:#}", err),
    }
}
