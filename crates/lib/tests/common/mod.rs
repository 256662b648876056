#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared setup for the integration tests of `employee-import`.

use dotenvy::dotenv;
use employee_import::{DocumentRef, InMemoryStore};
use serde_json::Value;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Fetches the import record stored under `request_id`.
pub async fn import_record(store: &InMemoryStore, request_id: &str) -> Option<Value> {
    store
        .get(&DocumentRef::new("employee-imports", request_id))
        .await
}

/// Lists the employees stored under the import record `request_id`.
pub async fn imported_employees(store: &InMemoryStore, request_id: &str) -> Vec<(String, Value)> {
    store
        .list(&format!("employee-imports/{request_id}/employees"))
        .await
}
