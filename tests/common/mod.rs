//! Common test utilities and helpers
//!
//! An in-memory stand-in for the admin API: it answers the same routes the
//! real gateway does, keeps a tiny table catalog, and records every request.

#![allow(dead_code)]

use serde_json::{Value, json};
use sfdb_admin::api::transport::{ApiRequest, ApiResponse, Method, RequestBody, Transport, TransportError};
use sfdb_admin::api::types::{FieldType, TableSchema};
use sfdb_admin::config::ConnectionConfig;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Table {
    schema: TableSchema,
    rows: Vec<Vec<Value>>,
}

#[derive(Debug)]
struct Backend {
    /// false = every request fails as unreachable
    reachable: bool,
    /// Status answered to `/connect`
    connect_status: u16,
    /// Whether a backend session is open
    session_open: bool,
    tables: BTreeMap<String, Table>,
    requests: Vec<ApiRequest>,
    executed: Vec<String>,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            reachable: true,
            connect_status: 200,
            session_open: false,
            tables: BTreeMap::new(),
            requests: Vec::new(),
            executed: Vec::new(),
        }
    }
}

/// Cloneable handle; all clones share one fake backend
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    backend: Arc<Mutex<Backend>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that already has an open session (e.g. from an earlier run)
    pub fn with_open_session() -> Self {
        let mock = Self::new();
        mock.backend.lock().unwrap().session_open = true;
        mock
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.backend.lock().unwrap().reachable = reachable;
    }

    pub fn set_connect_status(&self, status: u16) {
        self.backend.lock().unwrap().connect_status = status;
    }

    /// Simulate the backend dropping the session (TTL expiry, restart)
    pub fn expire_session(&self) {
        self.backend.lock().unwrap().session_open = false;
    }

    pub fn session_open(&self) -> bool {
        self.backend.lock().unwrap().session_open
    }

    /// Seed a table with rows
    pub fn add_table(&self, name: &str, fields: &[(&str, FieldType)], rows: Vec<Vec<Value>>) {
        let schema = TableSchema {
            fields: fields
                .iter()
                .map(|(n, t)| sfdb_admin::api::FieldSpec::new(*n, *t))
                .collect(),
        };
        self.backend
            .lock()
            .unwrap()
            .tables
            .insert(name.to_string(), Table { schema, rows });
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.backend.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.backend.lock().unwrap().requests.len()
    }

    pub fn ping_count(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == Method::Get && r.path == "/ping")
            .count()
    }

    pub fn executed(&self) -> Vec<String> {
        self.backend.lock().unwrap().executed.clone()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.backend.lock().unwrap().requests.last().cloned()
    }

    fn handle(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut backend = self.backend.lock().unwrap();
        backend.requests.push(request.clone());

        if !backend.reachable {
            return Err(TransportError::Unreachable("connection refused".to_string()));
        }

        let segments: Vec<&str> = request.path.trim_start_matches('/').split('/').collect();
        match (request.method, segments.as_slice()) {
            (Method::Post, ["connect"]) => {
                let status = backend.connect_status;
                if status == 200 {
                    backend.session_open = true;
                }
                Ok(respond(status, ""))
            }
            (Method::Get, ["ping"]) => {
                if backend.session_open {
                    Ok(respond(200, ""))
                } else {
                    Ok(respond(404, ""))
                }
            }
            (Method::Post, ["close"]) => {
                backend.session_open = false;
                Ok(respond(200, ""))
            }
            _ if !backend.session_open => Ok(respond(500, "sql: database is closed")),
            (Method::Get, [_db]) => {
                let names: Vec<&String> = backend.tables.keys().collect();
                Ok(respond_json(json!(names)))
            }
            (Method::Post, [_db]) => {
                let query = match &request.body {
                    RequestBody::Json(body) => body["query"].clone(),
                    _ => return Ok(respond(400, "expected JSON body")),
                };
                backend.executed.push(query.as_str().unwrap_or_default().to_string());
                Ok(respond_json(json!({
                    "columns": ["query"],
                    "column_types": {"query": "string"},
                    "rows": [[query]]
                })))
            }
            (Method::Post, [_db, "exec"]) => match &request.body {
                RequestBody::Text(statement) => {
                    backend.executed.push(statement.clone());
                    Ok(respond(200, ""))
                }
                _ => Ok(respond(400, "expected text body")),
            },
            (Method::Get, [_db, table, "describe"]) => match backend.tables.get(*table) {
                Some(t) => Ok(respond_json(json!(t.schema))),
                None => Ok(respond(404, "no such table")),
            },
            (Method::Get, [_db, table]) => match backend.tables.get(*table) {
                Some(t) => Ok(respond_json(table_data(t))),
                None => Ok(respond(500, "no such table")),
            },
            (Method::Post, [_db, table]) => {
                if backend.tables.contains_key(*table) {
                    return Ok(respond(500, "table already exists"));
                }
                let schema: TableSchema = match &request.body {
                    RequestBody::Json(body) => match serde_json::from_value(body.clone()) {
                        Ok(schema) => schema,
                        Err(e) => return Ok(respond(400, &e.to_string())),
                    },
                    _ => return Ok(respond(400, "expected JSON body")),
                };
                backend.tables.insert(
                    table.to_string(),
                    Table {
                        schema,
                        rows: Vec::new(),
                    },
                );
                Ok(respond(200, ""))
            }
            (Method::Delete, [_db, table]) => match backend.tables.remove(*table) {
                Some(_) => Ok(respond(200, "")),
                None => Ok(respond(500, "no such table")),
            },
            _ => Ok(respond(404, "404 page not found")),
        }
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.handle(request)
    }
}

fn respond(status: u16, body: &str) -> ApiResponse {
    ApiResponse {
        status,
        body: body.to_string(),
    }
}

fn respond_json(value: Value) -> ApiResponse {
    respond(200, &value.to_string())
}

/// Shape a stored table the way the gateway reports it
fn table_data(table: &Table) -> Value {
    let columns: Vec<&str> = table.schema.fields.iter().map(|f| f.name.as_str()).collect();
    let types: serde_json::Map<String, Value> = table
        .schema
        .fields
        .iter()
        .map(|f| {
            let tag = match f.field_type {
                FieldType::Int64 => "int",
                FieldType::Double => "double",
                FieldType::String => "string",
            };
            (f.name.clone(), json!(tag))
        })
        .collect();
    json!({ "columns": columns, "column_types": types, "rows": table.rows })
}

/// Create a test connection configuration
pub fn test_connection_config() -> ConnectionConfig {
    ConnectionConfig {
        name: "test".to_string(),
        host: "localhost".to_string(),
        port: 27910,
        user: "root".to_string(),
        password: "test_password".to_string(),
        database: "MAIN".to_string(),
        ttl_seconds: 5,
    }
}
