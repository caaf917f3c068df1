//! Integration tests for table metadata and data access

use crate::common::{MockTransport, test_connection_config};
use serde_json::json;
use sfdb_admin::api::transport::{Method, RequestBody};
use sfdb_admin::api::{FieldSpec, FieldType, TableClient};
use sfdb_admin::sql::{DraftMode, EditDraft};
use sfdb_admin::{ApiError, Session, StatementError};
use tokio_test::{assert_err, assert_ok};

const DB: &str = "MAIN";

async fn connected(mock: &MockTransport) -> (Session<MockTransport>, TableClient<MockTransport>) {
    let mut session = Session::new(mock.clone());
    session.connect(test_connection_config()).await.unwrap();
    let tables = session.tables();
    (session, tables)
}

fn users(mock: &MockTransport) {
    mock.add_table(
        "users",
        &[("id", FieldType::Int64), ("name", FieldType::String)],
        vec![vec![json!(1), json!("Alice")], vec![json!(2), json!("Bob")]],
    );
}

#[tokio::test(start_paused = true)]
async fn test_operations_require_connection() {
    let mock = MockTransport::new();
    let session = Session::new(mock.clone());
    let tables = session.tables();

    assert!(matches!(tables.list_tables(DB).await, Err(ApiError::NotConnected)));
    assert!(matches!(tables.get_table(DB, "users").await, Err(ApiError::NotConnected)));
    assert!(matches!(
        tables.create_table(DB, "t", &[FieldSpec::new("id", FieldType::Int64)]).await,
        Err(ApiError::NotConnected)
    ));
    assert!(matches!(tables.query(DB, "SELECT 1").await, Err(ApiError::NotConnected)));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_client_follows_disconnect() {
    let mock = MockTransport::new();
    let (mut session, tables) = connected(&mock).await;
    assert_ok!(tables.list_tables(DB).await);

    session.disconnect().await.unwrap();
    assert!(matches!(tables.list_tables(DB).await, Err(ApiError::NotConnected)));
}

#[tokio::test(start_paused = true)]
async fn test_list_tables() {
    let mock = MockTransport::new();
    users(&mock);
    mock.add_table("orders", &[("id", FieldType::Int64)], vec![]);
    let (_session, tables) = connected(&mock).await;

    let names: Vec<String> = tables
        .list_tables(DB)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["orders", "users"]);
    assert_eq!(mock.last_request().unwrap().path, "/MAIN");
}

#[tokio::test(start_paused = true)]
async fn test_create_then_describe_keeps_field_order() {
    let mock = MockTransport::new();
    let (_session, tables) = connected(&mock).await;
    let fields = vec![
        FieldSpec::new("zeta", FieldType::String),
        FieldSpec::new("alpha", FieldType::Int64),
        FieldSpec::new("mid", FieldType::Double),
    ];

    assert_ok!(tables.create_table(DB, "readings", &fields).await);
    let schema = tables.describe_table(DB, "readings").await.unwrap();
    assert_eq!(schema.fields, fields);
}

#[tokio::test(start_paused = true)]
async fn test_create_empty_table_rejected_before_request() {
    let mock = MockTransport::new();
    let (_session, tables) = connected(&mock).await;
    let before = mock.request_count();

    let err = assert_err!(tables.create_table(DB, "empty", &[]).await);
    assert!(matches!(err, ApiError::EmptySchema));
    assert_eq!(mock.request_count(), before);
}

#[tokio::test(start_paused = true)]
async fn test_create_invalid_names_rejected() {
    let mock = MockTransport::new();
    let (_session, tables) = connected(&mock).await;

    let err = assert_err!(
        tables
            .create_table(DB, "bad name", &[FieldSpec::new("id", FieldType::Int64)])
            .await
    );
    assert!(matches!(err, ApiError::InvalidName(_)));

    let err = assert_err!(
        tables
            .create_table(DB, "t", &[FieldSpec::new("1st", FieldType::Int64)])
            .await
    );
    assert!(matches!(err, ApiError::InvalidName(_)));
}

#[tokio::test(start_paused = true)]
async fn test_create_duplicate_is_backend_rejection() {
    let mock = MockTransport::new();
    users(&mock);
    let (_session, tables) = connected(&mock).await;

    let err = assert_err!(
        tables
            .create_table(DB, "users", &[FieldSpec::new("id", FieldType::Int64)])
            .await
    );
    match err {
        ApiError::Rejected { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "table already exists");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_get_table() {
    let mock = MockTransport::new();
    users(&mock);
    let (_session, tables) = connected(&mock).await;

    let data = tables.get_table(DB, "users").await.unwrap();
    assert_eq!(data.columns, vec!["id", "name"]);
    assert_eq!(data.rows.len(), 2);
    assert_eq!(data.rows[1], vec![json!(2), json!("Bob")]);
}

#[tokio::test(start_paused = true)]
async fn test_delete_table() {
    let mock = MockTransport::new();
    users(&mock);
    let (_session, tables) = connected(&mock).await;

    assert_ok!(tables.delete_table(DB, "users").await);
    let request = mock.last_request().unwrap();
    assert_eq!(request.method, Method::Delete);
    assert_eq!(request.path, "/MAIN/users");
    assert!(tables.list_tables(DB).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_drop_table_uses_exec() {
    let mock = MockTransport::new();
    let (_session, tables) = connected(&mock).await;

    assert_ok!(tables.drop_table(DB, "LoadTest").await);
    assert_eq!(mock.executed(), vec!["DROP TABLE LoadTest;"]);
    assert_eq!(mock.last_request().unwrap().path, "/MAIN/exec");
}

#[tokio::test(start_paused = true)]
async fn test_query_sent_verbatim() {
    let mock = MockTransport::new();
    let (_session, tables) = connected(&mock).await;
    let text = "select  *  from users where name = 'x';";

    let data = tables.query(DB, text).await.unwrap();
    assert_eq!(data.rows, vec![vec![json!(text)]]);

    let request = mock.last_request().unwrap();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.path, "/MAIN");
    assert_eq!(request.body, RequestBody::Json(json!({ "query": text })));
}

#[tokio::test(start_paused = true)]
async fn test_blank_query_rejected() {
    let mock = MockTransport::new();
    let (_session, tables) = connected(&mock).await;
    assert!(matches!(tables.query(DB, "  \n").await, Err(ApiError::EmptyQuery)));
}

#[tokio::test(start_paused = true)]
async fn test_exec_sends_plain_text() {
    let mock = MockTransport::new();
    let (_session, tables) = connected(&mock).await;

    assert_ok!(tables.exec(DB, "DELETE FROM users").await);
    assert_eq!(
        mock.last_request().unwrap().body,
        RequestBody::Text("DELETE FROM users".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_submit_insert_resets_draft() {
    let mock = MockTransport::new();
    users(&mock);
    let (_session, tables) = connected(&mock).await;
    let data = tables.get_table(DB, "users").await.unwrap();

    let mut draft = EditDraft::insert();
    draft.set("id", "3").set("name", "Bob");
    let sql = tables.submit(DB, "users", &mut draft, &data).await.unwrap();

    assert_eq!(sql, r#"INSERT INTO users(id, name) VALUES (3, "Bob")"#);
    assert_eq!(mock.executed(), vec![sql]);
    assert!(draft.is_empty());
    assert_eq!(draft.mode, DraftMode::Insert);
}

#[tokio::test(start_paused = true)]
async fn test_submit_update_matches_original_row() {
    let mock = MockTransport::new();
    users(&mock);
    let (_session, tables) = connected(&mock).await;
    let data = tables.get_table(DB, "users").await.unwrap();

    let mut draft = EditDraft::update(data.rows[0].clone());
    draft.set("name", "Carol");
    let sql = tables.submit(DB, "users", &mut draft, &data).await.unwrap();

    assert_eq!(
        sql,
        r#"UPDATE users SET name="Carol" WHERE id=1 AND name="Alice""#
    );
}

#[tokio::test(start_paused = true)]
async fn test_submit_bad_value_keeps_draft() {
    let mock = MockTransport::new();
    users(&mock);
    let (_session, tables) = connected(&mock).await;
    let data = tables.get_table(DB, "users").await.unwrap();

    let mut draft = EditDraft::insert();
    draft.set("id", "three");
    let err = assert_err!(tables.submit(DB, "users", &mut draft, &data).await);

    assert!(matches!(
        err,
        ApiError::Statement(StatementError::InvalidInteger { .. })
    ));
    assert!(mock.executed().is_empty());
    assert_eq!(draft.values.get("id").map(String::as_str), Some("three"));
}

#[tokio::test(start_paused = true)]
async fn test_backend_down_maps_to_unreachable() {
    let mock = MockTransport::new();
    let (_session, tables) = connected(&mock).await;

    mock.set_reachable(false);
    let err = assert_err!(tables.list_tables(DB).await);
    assert!(matches!(err, ApiError::Unreachable(_)));
    assert_eq!(err.status(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_path_segments_are_encoded() {
    let mock = MockTransport::new();
    let (_session, tables) = connected(&mock).await;

    let _ = tables.get_table(DB, "odd/name").await;
    assert_eq!(mock.last_request().unwrap().path, "/MAIN/odd%2Fname");
}
