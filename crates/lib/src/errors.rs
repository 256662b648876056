use thiserror::Error;

/// Errors raised by a `DocumentStore` backend.
///
/// Backend crates (e.g. `employee-import-firebase`) map their own error types
/// into these variants so the runner can treat every store the same way.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document store backend error: {0}")]
    Backend(String),

    #[error("Invalid document id '{id}' in collection '{collection}'")]
    InvalidDocumentId { collection: String, id: String },

    #[error("Batch of {size} bytes exceeds the store limit of {limit} bytes")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("Failed to serialize document: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors surfaced by one import attempt.
///
/// A non-2xx answer from the directory is not an error; it is reported as
/// `ImportOutcome::Rejected`.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Directory configuration is missing: {}", .missing.join(", "))]
    ConfigInvalid { missing: Vec<String> },

    #[error("Failed to reach the directory API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Directory API returned a malformed roster: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Failed to persist import documents: {0}")]
    Persistence(#[from] StoreError),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),

    #[error("A document store is required to run an import")]
    MissingStore,
}

impl ImportError {
    /// A stable, short label for logs and alerting.
    pub fn kind(&self) -> &'static str {
        match self {
            ImportError::ConfigInvalid { .. } => "config_invalid",
            ImportError::Transport(_) => "transport_failure",
            ImportError::MalformedPayload(_) => "malformed_payload",
            ImportError::Persistence(_) => "persistence_failure",
            ImportError::ClientBuild(_) => "client_build",
            ImportError::MissingStore => "missing_store",
        }
    }
}
