//! Integration tests for the PostgREST store client
//!
//! These tests run the real `RestStore` against a mock server and check
//! request shapes, count parsing and error classification.

mod common;

use common::fixtures::*;
use exochat_manager::constants::{http, store};
use exochat_manager::errors::StoreError;
use exochat_manager::scheduler::{AutoCleanupMonitor, CheckOutcome, MonitorSettings};
use exochat_manager::services::CleanupService;
use exochat_manager::store::{CleanupLogEntry, CleanupType, RemoteStore, RestStore};
use serde_json::json;
use std::sync::Arc;

fn rest_store(mock: &MockStoreServer) -> RestStore {
    RestStore::new(&mock.base_url, tokens::ACCESS_KEY, http::REQUEST_TIMEOUT).unwrap()
}

#[tokio::test]
async fn test_delete_all_reads_count_from_content_range() {
    let mock = MockStoreServer::start().await;
    mock.mock_delete_all(store::MESSAGES_TABLE, 7).await;

    let deleted = rest_store(&mock)
        .delete_all(store::MESSAGES_TABLE)
        .await
        .unwrap();

    assert_eq!(deleted, 7);
    assert_eq!(mock.request_count("/rest/v1/messages").await, 1);
}

#[tokio::test]
async fn test_procedure_returns_json_rows() {
    let mock = MockStoreServer::start().await;
    mock.mock_procedure(
        store::TRIGGER_CLEANUP_PROCEDURE,
        json!([{ "messages_deleted": 31, "hack_messages_deleted": 4, "cleanup_time": "2025-06-15T00:10:02+00:00" }]),
    )
    .await;

    let value = rest_store(&mock)
        .call_procedure(store::TRIGGER_CLEANUP_PROCEDURE)
        .await
        .unwrap();

    assert_eq!(value[0]["messages_deleted"], 31);
    assert_eq!(
        mock.request_bodies("/rest/v1/rpc/trigger_manual_cleanup").await,
        vec![json!({})]
    );
}

#[tokio::test]
async fn test_missing_procedure_is_not_found() {
    let mock = MockStoreServer::start().await;
    mock.mock_procedure_error(
        store::CLEAR_HACK_MESSAGES_PROCEDURE,
        404,
        "PGRST202",
        "Could not find the function public.clear_hack_messages",
    )
    .await;

    let error = rest_store(&mock)
        .call_procedure(store::CLEAR_HACK_MESSAGES_PROCEDURE)
        .await
        .unwrap_err();

    assert!(error.is_not_found());
}

#[tokio::test]
async fn test_undefined_table_code_is_not_found() {
    let mock = MockStoreServer::start().await;
    mock.mock_procedure_error(
        store::TRIGGER_CLEANUP_PROCEDURE,
        400,
        "42P01",
        "relation \"cleanup_log\" does not exist",
    )
    .await;

    let error = rest_store(&mock)
        .call_procedure(store::TRIGGER_CLEANUP_PROCEDURE)
        .await
        .unwrap_err();

    assert!(error.is_not_found());
}

#[tokio::test]
async fn test_other_remote_errors_keep_status_and_code() {
    let mock = MockStoreServer::start().await;
    mock.mock_procedure_error(
        store::TRIGGER_CLEANUP_PROCEDURE,
        403,
        "42501",
        "permission denied for table messages",
    )
    .await;

    let error = rest_store(&mock)
        .call_procedure(store::TRIGGER_CLEANUP_PROCEDURE)
        .await
        .unwrap_err();

    match &error {
        StoreError::Remote { status, code, .. } => {
            assert_eq!(*status, 403);
            assert_eq!(code.as_deref(), Some("42501"));
        }
        other => panic!("Expected a remote error, got {:?}", other),
    }
    assert_eq!(
        error.to_string(),
        "rpc trigger_manual_cleanup rejected with status 403 (42501): permission denied for table messages"
    );
}

#[tokio::test]
async fn test_unreachable_store_is_transport_error() {
    // Nothing listens on port 1
    let rest = RestStore::new("http://127.0.0.1:1", tokens::ACCESS_KEY, http::REQUEST_TIMEOUT)
        .unwrap();
    let error = rest.delete_all(store::MESSAGES_TABLE).await.unwrap_err();

    assert!(matches!(error, StoreError::Transport { .. }));
}

#[tokio::test]
async fn test_latest_log_and_missing_log_table() {
    let mock = MockStoreServer::start().await;
    mock.mock_latest_log(json!([{
        "id": "6a1d6f4e-0000-0000-0000-000000000001",
        "created_at": "2025-06-15T00:10:00.000",
        "messages_deleted": 12,
        "hack_messages_deleted": 1,
        "cleanup_type": "auto"
    }]))
    .await;

    let latest = rest_store(&mock).latest_cleanup_log().await.unwrap().unwrap();
    assert_eq!(latest.cleanup_type, CleanupType::Auto);
    assert_eq!(latest.messages_deleted, 12);

    let empty = MockStoreServer::start().await;
    empty.mock_missing_table(store::CLEANUP_LOG_TABLE).await;
    let error = rest_store(&empty).latest_cleanup_log().await.unwrap_err();
    assert!(error.is_not_found());
}

#[tokio::test]
async fn test_append_log_posts_entry() {
    let mock = MockStoreServer::start().await;
    mock.mock_log_insert().await;

    let entry = log_entry(days::TODAY, 0, 10, CleanupType::Manual);
    rest_store(&mock).append_cleanup_log(&entry).await.unwrap();

    let bodies = mock.request_bodies("/rest/v1/cleanup_log").await;
    assert_eq!(bodies.len(), 1);
    let posted: CleanupLogEntry = serde_json::from_value(bodies[0].clone()).unwrap();
    assert_eq!(posted, entry);
}

#[tokio::test]
async fn test_count_rows_and_maintenance_status() {
    let mock = MockStoreServer::start().await;
    mock.mock_count(store::HACK_MESSAGES_TABLE, 3573).await;
    mock.mock_maintenance_status(json!([{
        "in_maintenance": false,
        "status_message": "System is operational",
        "check_time": "2025-06-15T12:00:00+00:00"
    }]))
    .await;

    let rest = rest_store(&mock);
    assert_eq!(rest.count_rows(store::HACK_MESSAGES_TABLE).await.unwrap(), 3573);

    let status = rest.maintenance_status().await.unwrap().unwrap();
    assert!(!status.in_maintenance);
    assert_eq!(status.status_message, "System is operational");
}

#[tokio::test]
async fn test_monitor_over_rest_store_logs_first_run_of_the_day() {
    let mock = MockStoreServer::start().await;
    mock.mock_missing_table(store::CLEANUP_LOG_TABLE).await;
    mock.mock_procedure(
        store::TRIGGER_CLEANUP_PROCEDURE,
        json!([{ "messages_deleted": 9, "hack_messages_deleted": 0 }]),
    )
    .await;
    mock.mock_procedure(store::ENSURE_CLEANUP_LOG_PROCEDURE, json!(null))
        .await;

    let rest: Arc<dyn RemoteStore> = Arc::new(rest_store(&mock));
    let clock = clock_at(days::TODAY, 0, 10);
    let cleanup = Arc::new(CleanupService::new(rest.clone(), clock.clone()));
    let monitor = AutoCleanupMonitor::new(cleanup, rest, clock, MonitorSettings::default());

    let outcome = monitor.check_and_run().await;

    // Missing log table reads as empty; the insert hits the same missing table
    assert!(matches!(outcome, CheckOutcome::Cleaned { logged: false, .. }));
    assert_eq!(
        mock.request_count("/rest/v1/rpc/trigger_manual_cleanup").await,
        1
    );
}
