use anyhow::Result;
use async_trait::async_trait;
use employee_import::{
    DirectoryConfig, DocumentRef, DocumentStore, ImportRunner, ImportSettings, InMemoryStore,
    StoreError, WriteBatch,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The path the mock directory serves the roster on.
pub const ROSTER_PATH: &str = "/employees";

/// A credential long enough to be partially revealed once obfuscated.
pub const TEST_CREDENTIAL: &str = "test-credential-123";

// --- Fault-injecting Store ---

/// A `DocumentStore` wrapping an `InMemoryStore` that can be told to fail.
///
/// Failures happen before the inner store is touched, so a failed commit
/// leaves nothing behind.
#[derive(Clone, Debug)]
pub struct FlakyStore {
    inner: InMemoryStore,
    failing_collections: Arc<Mutex<HashSet<String>>>,
    fail_commits: Arc<Mutex<bool>>,
    commits_attempted: Arc<Mutex<usize>>,
}

impl FlakyStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            failing_collections: Arc::new(Mutex::new(HashSet::new())),
            fail_commits: Arc::new(Mutex::new(false)),
            commits_attempted: Arc::new(Mutex::new(0)),
        }
    }

    /// Makes every `add` into `collection` fail.
    pub fn fail_adds_to(&self, collection: &str) {
        self.failing_collections
            .lock()
            .unwrap()
            .insert(collection.to_string());
    }

    /// Makes every `commit` fail.
    pub fn fail_commits(&self) {
        *self.fail_commits.lock().unwrap() = true;
    }

    pub fn commits_attempted(&self) -> usize {
        *self.commits_attempted.lock().unwrap()
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    fn name(&self) -> &str {
        "Flaky"
    }

    async fn add(&self, collection: &str, data: Value) -> Result<DocumentRef, StoreError> {
        if self.failing_collections.lock().unwrap().contains(collection) {
            return Err(StoreError::Backend(format!(
                "simulated write failure on '{collection}'"
            )));
        }
        self.inner.add(collection, data).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        *self.commits_attempted.lock().unwrap() += 1;
        if *self.fail_commits.lock().unwrap() {
            return Err(StoreError::Backend(format!(
                "simulated commit failure for {} writes",
                batch.len()
            )));
        }
        self.inner.commit(batch).await
    }
}

// --- Directory Fixtures ---

/// Builds one roster entry in the directory's wire format. `None` fields are omitted.
pub fn raw_employee(full_name: &str, email: Option<&str>, manager: Option<&str>) -> Value {
    let mut entry = json!({ "fullName": full_name });
    if let Some(email) = email {
        entry["zenikaEmail"] = json!(email);
    }
    if let Some(manager) = manager {
        entry["operationalManagerShortUsername"] = json!(manager);
    }
    entry
}

/// A mock directory API plus an in-memory store to import into.
pub struct TestSetup {
    pub server: MockServer,
    pub store: InMemoryStore,
}

impl TestSetup {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
            store: InMemoryStore::new(),
        }
    }

    /// The config pointing at the mock directory with `TEST_CREDENTIAL`.
    pub fn directory_config(&self) -> DirectoryConfig {
        DirectoryConfig::new(TEST_CREDENTIAL, format!("{}{ROSTER_PATH}", self.server.uri()))
    }

    /// Serves `body` with `status` to requests carrying the test credential.
    pub async fn mount_roster(&self, status: u16, body: Value) {
        self.mount_raw_roster(status, body.to_string()).await;
    }

    pub async fn mount_raw_roster(&self, status: u16, body: String) {
        Mock::given(method("GET"))
            .and(path(ROSTER_PATH))
            .and(header("Authorization", TEST_CREDENTIAL))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// A runner over the real HTTP client and this setup's store.
    pub fn runner(&self) -> Result<ImportRunner> {
        self.runner_with_store(Box::new(self.store.clone()))
    }

    pub fn runner_with_store(&self, store: Box<dyn DocumentStore>) -> Result<ImportRunner> {
        Ok(ImportRunner::builder()
            .store(store)
            .settings(ImportSettings::default())
            .build()?)
    }
}
