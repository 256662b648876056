//! # `employee-import-firebase`: Firestore Document Store
//!
//! This crate provides a `DocumentStore` backed by Google Firestore so the
//! `employee-import` runner can write its audit trail and import records to
//! the same database the rest of the organization's tooling reads from.
//! Batches are committed inside a single Firestore transaction.

use async_trait::async_trait;
use employee_import::{DocumentRef, DocumentStore, StoreError, WriteBatch};
use firestore::{FirestoreDb, FirestoreTransaction};
use serde_json::Value;
use std::{fmt, path::Path};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Firestore rejects commit requests larger than this many bytes.
pub const MAX_COMMIT_BYTES: usize = 10 * 1024 * 1024;

// --- Error Definitions ---

#[derive(Error, Debug)]
pub enum FirestoreStoreError {
    #[error("Firestore error: {0}")]
    Firestore(#[from] firestore::errors::FirestoreError),
    #[error("Batch payload of {0} bytes exceeds Firestore's request limit of 10 MiB")]
    BatchTooLarge(usize),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<FirestoreStoreError> for StoreError {
    fn from(err: FirestoreStoreError) -> Self {
        match err {
            FirestoreStoreError::BatchTooLarge(size) => StoreError::BatchTooLarge {
                size,
                limit: MAX_COMMIT_BYTES,
            },
            FirestoreStoreError::Store(e) => e,
            FirestoreStoreError::Firestore(e) => StoreError::Backend(e.to_string()),
        }
    }
}

/// Approximate request size of committing `batch`: document paths plus their
/// JSON-encoded data.
pub fn estimated_commit_bytes(batch: &WriteBatch) -> usize {
    batch
        .writes()
        .iter()
        .map(|(doc, data)| doc.path().len() + data.to_string().len())
        .sum()
}

/// Rejects batches Firestore could not commit in one request.
///
/// Oversized batches fail as a whole; they are never split.
pub fn ensure_within_commit_limit(batch: &WriteBatch) -> Result<(), FirestoreStoreError> {
    let size = estimated_commit_bytes(batch);
    if size > MAX_COMMIT_BYTES {
        return Err(FirestoreStoreError::BatchTooLarge(size));
    }
    Ok(())
}

// --- Store Implementation ---

/// A `DocumentStore` writing to a Firestore database.
#[derive(Clone)]
pub struct FirestoreStore {
    db: FirestoreDb,
    project_id: String,
}

impl fmt::Debug for FirestoreStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirestoreStore")
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl FirestoreStore {
    /// Connects to the Firestore database of `project_id`.
    ///
    /// A `gcp_creds.json` service account file in the working directory is used
    /// when present; otherwise application default credentials apply.
    pub async fn connect(project_id: &str) -> Result<Self, FirestoreStoreError> {
        if Path::new("gcp_creds.json").exists() {
            info!("Setting GOOGLE_APPLICATION_CREDENTIALS to use gcp_creds.json");
            std::env::set_var("GOOGLE_APPLICATION_CREDENTIALS", "gcp_creds.json");
        }
        let db = FirestoreDb::new(project_id).await?;
        info!("Connected to Firestore project '{project_id}'.");
        Ok(Self {
            db,
            project_id: project_id.to_string(),
        })
    }

    async fn insert_new(
        &self,
        collection: &str,
        data: &Value,
    ) -> Result<DocumentRef, FirestoreStoreError> {
        let doc = DocumentRef::new(collection, Uuid::new_v4().simple().to_string());
        doc.validate()?;
        let _: Value = self
            .db
            .fluent()
            .insert()
            .into(collection)
            .document_id(doc.id())
            .object(data)
            .execute()
            .await?;
        Ok(doc)
    }

    /// Stages one full-document write in `transaction`.
    fn stage_write(
        &self,
        transaction: &mut FirestoreTransaction<'_>,
        doc: &DocumentRef,
        data: &Value,
    ) -> Result<(), FirestoreStoreError> {
        let update = self
            .db
            .fluent()
            .update()
            .in_col(doc.collection())
            .document_id(doc.id());
        match doc.parent() {
            None => {
                update.object(data).add_to_transaction(transaction)?;
            }
            Some(parent) => {
                let mut segments = parent.segments().iter();
                let (root_collection, root_id) = segments
                    .next()
                    .ok_or_else(|| StoreError::Backend("empty parent path".to_string()))?;
                let mut parent_path = self.db.parent_path(root_collection, root_id)?;
                for (collection, id) in segments {
                    parent_path = parent_path.at(collection, id)?;
                }
                update
                    .parent(&parent_path)
                    .object(data)
                    .add_to_transaction(transaction)?;
            }
        }
        Ok(())
    }

    async fn commit_in_transaction(&self, batch: WriteBatch) -> Result<(), FirestoreStoreError> {
        ensure_within_commit_limit(&batch)?;
        batch.validate()?;

        let mut transaction = self.db.begin_transaction().await?;
        for (doc, data) in batch.writes() {
            if let Err(e) = self.stage_write(&mut transaction, doc, data) {
                warn!("Rolling back transaction: failed to stage '{doc}': {e}");
                transaction.rollback().await?;
                return Err(e);
            }
        }
        transaction.commit().await?;
        info!("Committed {} documents to Firestore.", batch.len());
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn name(&self) -> &str {
        "Firestore"
    }

    async fn add(&self, collection: &str, data: Value) -> Result<DocumentRef, StoreError> {
        Ok(self.insert_new(collection, &data).await?)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        Ok(self.commit_in_transaction(batch).await?)
    }
}
