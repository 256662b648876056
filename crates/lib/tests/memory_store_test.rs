//! # In-Memory Store Tests
//!
//! Tests for the `DocumentStore` contract as implemented by `InMemoryStore`.

use anyhow::Result;
use employee_import::{DocumentRef, DocumentStore, InMemoryStore, StoreError, WriteBatch};
use serde_json::json;

#[tokio::test]
async fn test_add_generates_unique_ids() -> Result<()> {
    let store = InMemoryStore::new();

    let first = store.add("alibeez-requests", json!({ "n": 1 })).await?;
    let second = store.add("alibeez-requests", json!({ "n": 2 })).await?;

    assert_ne!(first.id(), second.id());
    assert_eq!(first.collection(), "alibeez-requests");
    assert_eq!(store.get(&first).await, Some(json!({ "n": 1 })));
    assert_eq!(store.get(&second).await, Some(json!({ "n": 2 })));
    assert_eq!(store.list("alibeez-requests").await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_commit_writes_parent_and_children_together() -> Result<()> {
    let store = InMemoryStore::new();
    let record = DocumentRef::new("employee-imports", "req1");
    let mut batch = WriteBatch::new();
    batch
        .set(record.clone(), json!({ "employeeCount": 2 }))
        .set(record.child("employees", "a@zenika.com"), json!({ "email": "a@zenika.com" }))
        .set(record.child("employees", "b@zenika.com"), json!({ "email": "b@zenika.com" }));

    store.commit(batch).await?;

    assert_eq!(store.get(&record).await, Some(json!({ "employeeCount": 2 })));
    let children = store.list("employee-imports/req1/employees").await;
    let ids: Vec<&str> = children.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["a@zenika.com", "b@zenika.com"]);
    // Children are not listed with their parent's collection.
    assert_eq!(store.list("employee-imports").await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_commit_is_all_or_nothing() {
    let store = InMemoryStore::new();
    let record = DocumentRef::new("employee-imports", "req1");
    let mut batch = WriteBatch::new();
    batch
        .set(record.clone(), json!({ "employeeCount": 2 }))
        .set(record.child("employees", "a@zenika.com"), json!({}))
        .set(record.child("employees", "bad/id@zenika.com"), json!({}));

    let result = store.commit(batch).await;

    match result {
        Err(StoreError::InvalidDocumentId { collection, id }) => {
            assert_eq!(collection, "employees");
            assert_eq!(id, "bad/id@zenika.com");
        }
        other => panic!("Expected InvalidDocumentId, got {other:?}"),
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_commit_overwrites_existing_documents() -> Result<()> {
    let store = InMemoryStore::new();
    let doc = DocumentRef::new("employee-imports", "req1").child("employees", "a@zenika.com");

    let mut batch = WriteBatch::new();
    batch.set(doc.clone(), json!({ "fullName": "Old" }));
    store.commit(batch).await?;
    let mut batch = WriteBatch::new();
    batch.set(doc.clone(), json!({ "fullName": "New" }));
    store.commit(batch).await?;

    assert_eq!(store.len().await, 1);
    assert_eq!(store.get(&doc).await, Some(json!({ "fullName": "New" })));
    Ok(())
}

#[tokio::test]
async fn test_clones_share_documents() -> Result<()> {
    let store = InMemoryStore::new();
    let handle = store.clone();
    let boxed: Box<dyn DocumentStore> = Box::new(store);

    let doc = boxed.add("alibeez-responses", json!({ "ok": true })).await?;

    assert_eq!(boxed.name(), "InMemory");
    assert_eq!(handle.get(&doc).await, Some(json!({ "ok": true })));
    Ok(())
}
