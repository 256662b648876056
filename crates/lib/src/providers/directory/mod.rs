pub mod http;

use crate::errors::ImportError;
use async_trait::async_trait;
use dyn_clone::DynClone;
pub use http::HttpDirectoryClient;
use std::fmt::Debug;

/// What the directory API answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryResponse {
    pub status: u16,
    /// The raw body. Only read for success statuses; empty otherwise.
    pub body: String,
}

impl DirectoryResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A trait for fetching the employee roster from the directory API.
///
/// Implementations return `Ok` for every HTTP answer, whatever its status. Only
/// a failure to obtain an answer at all is an error.
#[async_trait]
pub trait DirectoryClient: Send + Sync + Debug + DynClone {
    /// Issues `GET url` with the raw credential as the `Authorization` header.
    async fn fetch_roster(
        &self,
        url: &str,
        credential: &str,
    ) -> Result<DirectoryResponse, ImportError>;
}

dyn_clone::clone_trait_object!(DirectoryClient);
