use crate::{
    constants::DEFAULT_HTTP_TIMEOUT_SECS,
    errors::ImportError,
    providers::directory::{DirectoryClient, DirectoryResponse},
};
use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client as ReqwestClient};
use std::time::Duration;
use tracing::debug;

/// A `DirectoryClient` backed by `reqwest`.
///
/// The request timeout belongs to this collaborator; the runner imposes none.
#[derive(Clone, Debug)]
pub struct HttpDirectoryClient {
    client: ReqwestClient,
}

impl HttpDirectoryClient {
    /// Creates a client with the default request timeout.
    pub fn new() -> Result<Self, ImportError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ImportError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(ImportError::ClientBuild)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    async fn fetch_roster(
        &self,
        url: &str,
        credential: &str,
    ) -> Result<DirectoryResponse, ImportError> {
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, credential)
            .send()
            .await?;

        let status = response.status();
        debug!("[fetch_roster] directory answered with status {status}");
        let body = if status.is_success() {
            response.text().await?
        } else {
            String::new()
        };

        Ok(DirectoryResponse {
            status: status.as_u16(),
            body,
        })
    }
}
