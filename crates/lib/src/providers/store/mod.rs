//! # Document Store Capability
//!
//! The persistence seam of the import pipeline: append a document with a
//! store-generated id, and commit a batch of writes atomically.

pub mod memory;

use crate::errors::StoreError;
use async_trait::async_trait;
use dyn_clone::DynClone;
pub use memory::InMemoryStore;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{self, Debug};

/// Address of a document, possibly nested under other documents.
///
/// Each segment is a `(collection, document id)` pair, from the root down.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentRef {
    segments: Vec<(String, String)>,
}

impl DocumentRef {
    /// Addresses document `id` in the top-level `collection`.
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            segments: vec![(collection.into(), id.into())],
        }
    }

    /// Addresses document `id` in the sub-collection `collection` of this document.
    pub fn child(&self, collection: impl Into<String>, id: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push((collection.into(), id.into()));
        Self { segments }
    }

    pub fn id(&self) -> &str {
        &self.leaf().1
    }

    pub fn collection(&self) -> &str {
        &self.leaf().0
    }

    /// The document this one is nested under, if any.
    pub fn parent(&self) -> Option<DocumentRef> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn segments(&self) -> &[(String, String)] {
        &self.segments
    }

    /// The slash-separated path, e.g. `employee-imports/abc/employees/a@zenika.com`.
    pub fn path(&self) -> String {
        self.to_string()
    }

    /// Path of the collection holding this document.
    pub fn collection_path(&self) -> String {
        match self.parent() {
            Some(parent) => format!("{}/{}", parent.path(), self.collection()),
            None => self.collection().to_string(),
        }
    }

    /// Rejects ids a document store cannot address.
    pub fn validate(&self) -> Result<(), StoreError> {
        for (collection, id) in &self.segments {
            if id.is_empty() || id.contains('/') || id == "." || id == ".." {
                return Err(StoreError::InvalidDocumentId {
                    collection: collection.clone(),
                    id: id.clone(),
                });
            }
        }
        Ok(())
    }

    fn leaf(&self) -> &(String, String) {
        // A ref is always built with at least one segment.
        &self.segments[self.segments.len() - 1]
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (collection, id) in &self.segments {
            if !first {
                f.write_str("/")?;
            }
            first = false;
            write!(f, "{collection}/{id}")?;
        }
        Ok(())
    }
}

/// A set of document writes committed as one unit.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    writes: Vec<(DocumentRef, Value)>,
    positions: HashMap<DocumentRef, usize>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a full overwrite of `doc`. Staging the same path twice keeps the
    /// position of the first write and the data of the last.
    pub fn set(&mut self, doc: DocumentRef, data: Value) -> &mut Self {
        match self.positions.get(&doc) {
            Some(&index) => self.writes[index].1 = data,
            None => {
                self.positions.insert(doc.clone(), self.writes.len());
                self.writes.push((doc, data));
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[(DocumentRef, Value)] {
        &self.writes
    }

    pub fn into_writes(self) -> Vec<(DocumentRef, Value)> {
        self.writes
    }

    /// Validates every staged path.
    pub fn validate(&self) -> Result<(), StoreError> {
        self.writes.iter().try_for_each(|(doc, _)| doc.validate())
    }
}

/// A trait for the document store an import writes to.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug + DynClone {
    /// Returns the name of the store backend (e.g. "Firestore", "InMemory").
    fn name(&self) -> &str;

    /// Appends `data` to the top-level `collection` under a newly generated unique id.
    async fn add(&self, collection: &str, data: Value) -> Result<DocumentRef, StoreError>;

    /// Applies every write of `batch`, or none of them.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

dyn_clone::clone_trait_object!(DocumentStore);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_ref_paths() {
        let record = DocumentRef::new("employee-imports", "req1");
        let employee = record.child("employees", "a@zenika.com");
        assert_eq!(employee.path(), "employee-imports/req1/employees/a@zenika.com");
        assert_eq!(employee.collection_path(), "employee-imports/req1/employees");
        assert_eq!(employee.id(), "a@zenika.com");
        assert_eq!(employee.parent(), Some(record.clone()));
        assert_eq!(record.parent(), None);
        assert_eq!(record.collection_path(), "employee-imports");
    }

    #[test]
    fn test_validate_rejects_unaddressable_ids() {
        for id in ["", "a/b", ".", ".."] {
            let doc = DocumentRef::new("employee-imports", "req1").child("employees", id);
            assert!(
                matches!(doc.validate(), Err(StoreError::InvalidDocumentId { .. })),
                "id {id:?} should be rejected"
            );
        }
        assert!(DocumentRef::new("employee-imports", "req1").validate().is_ok());
    }

    #[test]
    fn test_batch_set_on_same_path_replaces() {
        let mut batch = WriteBatch::new();
        let doc = DocumentRef::new("employees", "a@zenika.com");
        batch
            .set(doc.clone(), json!({ "v": 1 }))
            .set(DocumentRef::new("employees", "b@zenika.com"), json!({}))
            .set(doc.clone(), json!({ "v": 2 }));
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.writes()[0], (doc, json!({ "v": 2 })));
    }

    #[test]
    fn test_batch_keeps_first_position_across_many_writes() {
        let record = DocumentRef::new("employee-imports", "req1");
        let mut batch = WriteBatch::new();
        for round in 0..2 {
            for i in 0..1_000 {
                batch.set(
                    record.child("employees", format!("e{i}@zenika.com")),
                    json!({ "round": round }),
                );
            }
        }
        assert_eq!(batch.len(), 1_000);
        assert_eq!(batch.writes()[0].0.id(), "e0@zenika.com");
        assert_eq!(batch.writes()[999].0.id(), "e999@zenika.com");
        assert!(batch.writes().iter().all(|(_, data)| data["round"] == 1));
    }
}
