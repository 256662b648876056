//! # Import Runner
//!
//! Orchestrates one employee import: record the request, call the directory,
//! record the response, then commit the import record and its employees as a
//! single atomic batch keyed by the request's id.

use crate::{
    config::DirectoryConfig,
    errors::{ImportError, StoreError},
    providers::{
        directory::{DirectoryClient, HttpDirectoryClient},
        store::{DocumentRef, DocumentStore, WriteBatch},
    },
    types::{
        now_timestamp, ImportOutcome, ImportRecord, ImportRequest, ImportResponse,
        ImportSettings, ImportSummary, ImportedEmployee, RawEmployee,
    },
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

fn to_document<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    Ok(serde_json::to_value(value)?)
}

/// Derives a manager's email from their short username.
pub fn manager_email(short_username: Option<&str>, domain_suffix: &str) -> Option<String> {
    short_username
        .filter(|username| !username.is_empty())
        .map(|username| format!("{username}{domain_suffix}"))
}

/// Keeps the employees whose email ends with `domain_suffix` and converts them.
///
/// Source order is preserved. When two entries share an email, the later one
/// wins and takes the position of the first.
pub fn select_employees(roster: &[RawEmployee], domain_suffix: &str) -> Vec<ImportedEmployee> {
    let mut selected: Vec<ImportedEmployee> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for raw in roster {
        let Some(email) = raw
            .zenika_email
            .as_deref()
            .filter(|email| email.ends_with(domain_suffix))
        else {
            continue;
        };
        let employee = ImportedEmployee {
            full_name: raw.full_name.clone(),
            email: email.to_string(),
            manager_email: manager_email(
                raw.operational_manager_short_username.as_deref(),
                domain_suffix,
            ),
        };
        match positions.get(email) {
            Some(&index) => {
                warn!("[select_employees] duplicate roster entry for '{email}', keeping the later one");
                selected[index] = employee;
            }
            None => {
                positions.insert(email.to_string(), selected.len());
                selected.push(employee);
            }
        }
    }
    selected
}

/// Runs employee imports against a directory client and a document store.
#[derive(Clone, Debug)]
pub struct ImportRunner {
    pub(crate) directory: Box<dyn DirectoryClient>,
    pub(crate) store: Box<dyn DocumentStore>,
    pub(crate) settings: ImportSettings,
}

impl ImportRunner {
    pub fn builder() -> ImportRunnerBuilder {
        ImportRunnerBuilder::new()
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Runs one import attempt end-to-end.
    ///
    /// Every failure is returned as-is: there is no retry and no cleanup of the
    /// documents already written. A non-success directory status is not an
    /// error; it yields `ImportOutcome::Rejected`.
    pub async fn run_import(&self, config: &DirectoryConfig) -> Result<ImportOutcome, ImportError> {
        let collections = &self.settings.collections;

        // 1. Record the attempt before any network call.
        let request = ImportRequest::new(&config.url, &config.credential);
        let request_ref = self
            .store
            .add(&collections.requests, to_document(&request)?)
            .await
            .inspect_err(|e| error!("[run_import] failed to record import request: {e}"))?;
        let request_id = request_ref.id().to_string();
        info!(
            "[run_import] recorded request '{request_id}' in {} for {}",
            self.store.name(),
            config.url
        );

        // 2. Call the directory.
        let response = self
            .directory
            .fetch_roster(&config.url, &config.credential)
            .await
            .inspect_err(|e| error!("[run_import] request '{request_id}': directory unreachable: {e}"))?;

        // 3. Record whatever the directory answered.
        let audit = ImportResponse {
            request: request_ref.path(),
            at: now_timestamp(),
            ok: response.ok(),
            status: response.status,
        };
        self.store
            .add(&collections.responses, to_document(&audit)?)
            .await
            .inspect_err(|e| error!("[run_import] request '{request_id}': failed to record response: {e}"))?;

        // 4. A rejected call ends the attempt.
        if !response.ok() {
            warn!(
                "[run_import] request '{request_id}': directory answered with status {}",
                response.status
            );
            return Ok(ImportOutcome::Rejected {
                request_id,
                status: response.status,
            });
        }

        // 5. and 6. Parse, filter and convert.
        let roster: Vec<RawEmployee> = serde_json::from_str(&response.body)
            .map_err(ImportError::MalformedPayload)
            .inspect_err(|e| error!("[run_import] request '{request_id}': {e}"))?;
        let employees = select_employees(&roster, &self.settings.domain_suffix);
        debug!(
            "[run_import] request '{request_id}': kept {} of {} employees, dropped {}",
            employees.len(),
            roster.len(),
            roster.len() - employees.len()
        );

        // 7. Commit the record and its employees together.
        let record_ref = DocumentRef::new(&collections.imports, &request_id);
        let record = ImportRecord {
            at: now_timestamp(),
            employee_count: roster.len(),
            employee_with_valid_email_count: employees.len(),
        };
        let mut batch = WriteBatch::new();
        batch.set(record_ref.clone(), to_document(&record)?);
        for employee in &employees {
            batch.set(
                record_ref.child(&collections.employees, &employee.email),
                to_document(employee)?,
            );
        }
        self.store
            .commit(batch)
            .await
            .inspect_err(|e| error!("[run_import] request '{request_id}': batch commit failed: {e}"))?;

        info!(
            "[run_import] request '{request_id}': imported {} of {} employees",
            record.employee_with_valid_email_count, record.employee_count
        );
        Ok(ImportOutcome::Imported(ImportSummary {
            request_id,
            employee_count: record.employee_count,
            valid_email_count: record.employee_with_valid_email_count,
        }))
    }
}

/// A builder for creating `ImportRunner` instances.
///
/// The store is required. Without an explicit directory client the runner
/// uses an `HttpDirectoryClient` with the default timeout.
#[derive(Default)]
pub struct ImportRunnerBuilder {
    directory: Option<Box<dyn DirectoryClient>>,
    store: Option<Box<dyn DocumentStore>>,
    settings: ImportSettings,
}

impl ImportRunnerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directory(mut self, directory: Box<dyn DirectoryClient>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn store(mut self, store: Box<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn settings(mut self, settings: ImportSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Result<ImportRunner, ImportError> {
        let store = self.store.ok_or(ImportError::MissingStore)?;
        let directory = match self.directory {
            Some(directory) => directory,
            None => Box::new(HttpDirectoryClient::new()?),
        };
        Ok(ImportRunner {
            directory,
            store,
            settings: self.settings,
        })
    }
}
