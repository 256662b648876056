//! # Employee Import
//!
//! This crate imports the employee roster of an external HR directory into a
//! document store. One import attempt records its request and the directory's
//! response for audit, keeps the employees with an organizational email, and
//! commits an import record with its employees as a single atomic batch.
//!
//! The directory and the store are capabilities passed to the [`ImportRunner`]
//! (see [`providers::directory::DirectoryClient`] and
//! [`providers::store::DocumentStore`]), so any backend, including the bundled
//! [`InMemoryStore`], can be substituted.

pub mod config;
pub mod constants;
pub mod errors;
pub mod providers;
pub mod runner;
pub mod types;

pub use config::{validate_config, ConfigValidation, DirectoryConfig};
pub use errors::{ImportError, StoreError};
pub use providers::directory::{DirectoryClient, DirectoryResponse, HttpDirectoryClient};
pub use providers::store::{DocumentRef, DocumentStore, InMemoryStore, WriteBatch};
pub use runner::{ImportRunner, ImportRunnerBuilder};
pub use types::{
    obfuscate_credential, CollectionNames, ImportOutcome, ImportRecord, ImportRequest,
    ImportResponse, ImportSettings, ImportSummary, ImportedEmployee, RawEmployee,
};
