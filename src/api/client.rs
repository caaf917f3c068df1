//! Table metadata and data access
//!
//! Every operation is one request/response against the admin API: no
//! retries and no caching. All of them fail with [`ApiError::NotConnected`]
//! before touching the network unless the owning session is connected.

use crate::api::transport::{ApiRequest, ApiResponse, Method, RequestBody, Transport};
use crate::api::types::{FieldSpec, TableData, TableDescriptor, TableSchema};
use crate::error::{ApiError, ApiResult};
use crate::session::ConnectionState;
use crate::sql::statement::{self, EditDraft, is_identifier};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::watch;

/// Characters escaped in a single URL path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Data-access client handed out by a connected `Session`
pub struct TableClient<T: Transport> {
    transport: Arc<T>,
    state: watch::Receiver<ConnectionState>,
}

impl<T: Transport> Clone for TableClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            state: self.state.clone(),
        }
    }
}

impl<T: Transport> TableClient<T> {
    pub(crate) fn new(transport: Arc<T>, state: watch::Receiver<ConnectionState>) -> Self {
        Self { transport, state }
    }

    /// Names of all tables in `db`
    pub async fn list_tables(&self, db: &str) -> ApiResult<Vec<TableDescriptor>> {
        let response = self
            .request(ApiRequest::get(format!("/{}", segment(db))))
            .await?;
        let names: Option<Vec<String>> = decode(&response)?;
        Ok(names
            .unwrap_or_default()
            .into_iter()
            .map(|name| TableDescriptor { name })
            .collect())
    }

    /// Field list of `table`, in declaration order
    pub async fn describe_table(&self, db: &str, table: &str) -> ApiResult<TableSchema> {
        let path = format!("/{}/{}/describe", segment(db), segment(table));
        let response = self.request(ApiRequest::get(path)).await?;
        decode(&response)
    }

    /// Every row of `table`, unpaginated
    pub async fn get_table(&self, db: &str, table: &str) -> ApiResult<TableData> {
        let path = format!("/{}/{}", segment(db), segment(table));
        let response = self.request(ApiRequest::get(path)).await?;
        decode(&response)
    }

    /// Create `table` with the given fields
    ///
    /// # Errors
    /// `EmptySchema` / `InvalidName` are raised before any request is sent.
    pub async fn create_table(&self, db: &str, table: &str, fields: &[FieldSpec]) -> ApiResult<()> {
        self.ensure_connected()?;
        if fields.is_empty() {
            return Err(ApiError::EmptySchema);
        }
        check_name(table)?;
        for field in fields {
            check_name(&field.name)?;
        }

        let schema = TableSchema {
            fields: fields.to_vec(),
        };
        let body =
            serde_json::to_value(&schema).map_err(|e| ApiError::Decode(e.to_string()))?;
        let path = format!("/{}/{}", segment(db), segment(table));
        self.request(ApiRequest::post(path, RequestBody::Json(body)))
            .await?;
        tracing::info!(db, table, fields = fields.len(), "table created");
        Ok(())
    }

    pub async fn delete_table(&self, db: &str, table: &str) -> ApiResult<()> {
        let path = format!("/{}/{}", segment(db), segment(table));
        self.request(ApiRequest::delete(path)).await?;
        tracing::info!(db, table, "table deleted");
        Ok(())
    }

    /// Drop `table` by executing a `DROP TABLE` statement
    pub async fn drop_table(&self, db: &str, table: &str) -> ApiResult<()> {
        let sql = statement::drop_table(table)?;
        self.exec(db, &sql).await
    }

    /// Run a query verbatim and return its result set
    pub async fn query(&self, db: &str, text: &str) -> ApiResult<TableData> {
        self.ensure_connected()?;
        if text.trim().is_empty() {
            return Err(ApiError::EmptyQuery);
        }
        let body = serde_json::json!({ "query": text });
        let request = ApiRequest {
            method: Method::Post,
            path: format!("/{}", segment(db)),
            body: RequestBody::Json(body),
        };
        let response = self.request(request).await?;
        decode(&response)
    }

    /// Execute a statement that returns no rows
    pub async fn exec(&self, db: &str, statement: &str) -> ApiResult<()> {
        self.ensure_connected()?;
        if statement.trim().is_empty() {
            return Err(ApiError::EmptyQuery);
        }
        let path = format!("/{}/exec", segment(db));
        self.request(ApiRequest::post(path, RequestBody::Text(statement.to_string())))
            .await?;
        Ok(())
    }

    /// Build and execute the statement for `draft`
    ///
    /// On success the draft is reset to an empty insert and the executed
    /// statement is returned. On failure the draft is left untouched.
    pub async fn submit(
        &self,
        db: &str,
        table: &str,
        draft: &mut EditDraft,
        data: &TableData,
    ) -> ApiResult<String> {
        self.ensure_connected()?;
        let sql = statement::build_statement(table, &data.columns, &data.column_types, draft)?;
        self.exec(db, &sql).await?;
        tracing::debug!(db, table, mode = ?draft.mode, "draft submitted");
        draft.reset();
        Ok(sql)
    }

    fn ensure_connected(&self) -> ApiResult<()> {
        if *self.state.borrow() == ConnectionState::Connected {
            Ok(())
        } else {
            Err(ApiError::NotConnected)
        }
    }

    async fn request(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        self.ensure_connected()?;
        let response = self.transport.send(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiError::Rejected {
                status: response.status,
                message: response.body.trim().to_string(),
            })
        }
    }
}

fn decode<D: DeserializeOwned>(response: &ApiResponse) -> ApiResult<D> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn segment(raw: &str) -> String {
    utf8_percent_encode(raw, SEGMENT).to_string()
}

fn check_name(name: &str) -> ApiResult<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(ApiError::InvalidName(name.to_string()))
    }
}
