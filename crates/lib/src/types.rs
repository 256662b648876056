//! # Import Data Model
//!
//! The documents written by an import attempt, the roster entries read from the
//! directory API, and the settings that parameterize a run.

use crate::constants::{
    CREDENTIAL_MASK, CREDENTIAL_REVEAL_THRESHOLD, CREDENTIAL_VISIBLE_CHARS, DEFAULT_DOMAIN_SUFFIX,
    EMPLOYEES_SUBCOLLECTION, IMPORTS_COLLECTION, REQUESTS_COLLECTION, RESPONSES_COLLECTION,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Returns the current instant as an RFC 3339 UTC string with millisecond precision.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Masks a credential before it is written to any audit document.
///
/// Credentials longer than 8 characters keep their first 4 characters, shorter
/// ones are fully masked, and an absent or empty credential yields `None`.
pub fn obfuscate_credential(credential: Option<&str>) -> Option<String> {
    let credential = credential.filter(|c| !c.is_empty())?;
    if credential.chars().count() > CREDENTIAL_REVEAL_THRESHOLD {
        let visible: String = credential.chars().take(CREDENTIAL_VISIBLE_CHARS).collect();
        Some(format!("{visible}{CREDENTIAL_MASK}"))
    } else {
        Some(CREDENTIAL_MASK.to_string())
    }
}

/// Audit document written once per attempt, before the directory is called.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImportRequest {
    pub at: String,
    pub url: String,
    /// Obfuscated credential; `null` when no credential was supplied.
    pub key: Option<String>,
}

impl ImportRequest {
    pub fn new(url: &str, credential: &str) -> Self {
        Self {
            at: now_timestamp(),
            url: url.to_string(),
            key: obfuscate_credential(Some(credential)),
        }
    }
}

/// Audit document recording what the directory answered.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImportResponse {
    /// Path of the `ImportRequest` this response belongs to.
    pub request: String,
    pub at: String,
    pub ok: bool,
    pub status: u16,
}

/// One roster entry as returned by the directory API.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawEmployee {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub zenika_email: Option<String>,
    #[serde(default)]
    pub operational_manager_short_username: Option<String>,
}

/// Summary document of a successful import, stored under the request's id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    pub at: String,
    pub employee_count: usize,
    pub employee_with_valid_email_count: usize,
}

/// An employee kept by the import, stored under its record keyed by email.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportedEmployee {
    pub full_name: Option<String>,
    pub email: String,
    pub manager_email: Option<String>,
}

/// Collection names used by an import run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CollectionNames {
    pub requests: String,
    pub responses: String,
    pub imports: String,
    pub employees: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            requests: REQUESTS_COLLECTION.to_string(),
            responses: RESPONSES_COLLECTION.to_string(),
            imports: IMPORTS_COLLECTION.to_string(),
            employees: EMPLOYEES_SUBCOLLECTION.to_string(),
        }
    }
}

/// Settings that parameterize an `ImportRunner`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ImportSettings {
    pub domain_suffix: String,
    pub collections: CollectionNames,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            domain_suffix: DEFAULT_DOMAIN_SUFFIX.to_string(),
            collections: CollectionNames::default(),
        }
    }
}

/// Counts of a committed import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub request_id: String,
    pub employee_count: usize,
    pub valid_email_count: usize,
}

/// How an import attempt ended when no error was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The roster was fetched and the record with its employees committed.
    Imported(ImportSummary),
    /// The directory answered with a non-success status; only the audit trail was written.
    Rejected { request_id: String, status: u16 },
}

impl ImportOutcome {
    pub fn request_id(&self) -> &str {
        match self {
            ImportOutcome::Imported(summary) => &summary.request_id,
            ImportOutcome::Rejected { request_id, .. } => request_id,
        }
    }
}
