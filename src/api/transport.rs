//! HTTP transport
//!
//! The session manager and table client talk to the admin API only through
//! the [`Transport`] trait. [`HttpTransport`] is the reqwest-backed
//! implementation; tests plug in an in-memory one.

use crate::error::{ApiError, ConnectionError};
use std::future::Future;
use std::time::Duration;

/// HTTP verbs used by the admin API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// Request body variants the API accepts
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Text(String),
}

/// A request relative to the API base path
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the base, starting with `/`
    pub path: String,
    pub body: RequestBody,
}

/// Status and raw body of a completed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// Failure to complete an exchange at all
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("unreachable: {0}")]
    Unreachable(String),

    #[error("timed out")]
    Timeout,
}

/// Sends API requests and returns whatever status the server answered with
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}

impl From<TransportError> for ConnectionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Unreachable(msg) => ConnectionError::Unreachable(msg),
            TransportError::Timeout => ConnectionError::Timeout,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Unreachable(msg) => ApiError::Unreachable(msg),
            TransportError::Timeout => ApiError::Timeout,
        }
    }
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn post(path: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body,
        }
    }
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// reqwest-backed transport rooted at the API base URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport for `base_url` (e.g. `http://localhost:3000/api`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let builder = self.client.request(method, &url);
        let builder = match request.body {
            RequestBody::Empty => builder.header(reqwest::header::CONTENT_TYPE, "application/json"),
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Text(text) => builder
                .header(reqwest::header::CONTENT_TYPE, "text/plain")
                .body(text),
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;

        tracing::debug!(
            method = request.method.as_str(),
            path = %request.path,
            status,
            "api request"
        );
        Ok(ApiResponse { status, body })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Unreachable(err.to_string())
    }
}
