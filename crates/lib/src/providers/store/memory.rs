use crate::{
    errors::StoreError,
    providers::store::{DocumentRef, DocumentStore, WriteBatch},
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A `DocumentStore` that keeps every document in process memory.
///
/// Clones share the same documents, so a test can hand one clone to the runner
/// and inspect the other. Used by the CLI's dry-run mode as well.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    documents: Arc<RwLock<BTreeMap<DocumentRef, Value>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, doc: &DocumentRef) -> Option<Value> {
        self.documents.read().await.get(doc).cloned()
    }

    /// Lists `(id, data)` of every document directly inside `collection_path`,
    /// e.g. `"employee-imports"` or `"employee-imports/abc/employees"`.
    pub async fn list(&self, collection_path: &str) -> Vec<(String, Value)> {
        self.documents
            .read()
            .await
            .iter()
            .filter(|(doc, _)| doc.collection_path() == collection_path)
            .map(|(doc, data)| (doc.id().to_string(), data.clone()))
            .collect()
    }

    /// Total number of documents across all collections.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn name(&self) -> &str {
        "InMemory"
    }

    async fn add(&self, collection: &str, data: Value) -> Result<DocumentRef, StoreError> {
        let mut documents = self.documents.write().await;
        // Ids are unique within the store.
        let doc = loop {
            let candidate = DocumentRef::new(collection, Uuid::new_v4().simple().to_string());
            if !documents.contains_key(&candidate) {
                break candidate;
            }
        };
        doc.validate()?;
        documents.insert(doc.clone(), data);
        Ok(doc)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        batch.validate()?;
        let mut documents = self.documents.write().await;
        for (doc, data) in batch.into_writes() {
            documents.insert(doc, data);
        }
        Ok(())
    }
}
