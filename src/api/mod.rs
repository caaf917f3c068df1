//! Admin REST API access
//!
//! The transport seam, the wire types and the table/query client built on
//! top of them.

pub mod client;
pub mod transport;
pub mod types;

pub use client::TableClient;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, RequestBody, Transport, TransportError};
pub use types::{ColumnType, FieldSpec, FieldType, TableData, TableDescriptor, TableSchema};
