//! HTTP relay client

use async_trait::async_trait;
use escrow_http_client::{HttpClient, HttpError};
use tracing::instrument;
use url::Url;

use super::RelayConnector;
use crate::error::Error;
use crate::types::{
    BalanceResponse, CreateJobRequest, CreateJobResponse, DeployEscrowRequest,
    DeployEscrowResponse, JobId, JobStatusResponse,
};

/// Http Client for a relay
#[derive(Debug, Clone)]
pub struct HttpRelayClient {
    base_url: Url,
    inner: HttpClient,
}

impl HttpRelayClient {
    /// Create new [`HttpRelayClient`]
    pub fn new(base_url: Url) -> Self {
        Self::with_client(base_url, HttpClient::new())
    }

    /// Create new [`HttpRelayClient`] on top of a configured [`HttpClient`]
    pub fn with_client(base_url: Url, client: HttpClient) -> Self {
        Self {
            base_url,
            inner: client,
        }
    }

    /// Relay base url
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|_| Error::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }
}

/// Re-labels a non-success status with the error of the failing call
fn map_status(
    err: HttpError,
    on_status: impl FnOnce(u16, String) -> Error,
) -> Error {
    match err {
        HttpError::Status { status, message } => on_status(status, message),
        other => Error::Http(other),
    }
}

#[async_trait]
impl RelayConnector for HttpRelayClient {
    #[instrument(skip(self), fields(relay = %self.base_url))]
    async fn create_job(&self, request: CreateJobRequest) -> Result<CreateJobResponse, Error> {
        let url = self.endpoint(&["create_job"])?;

        self.inner
            .post_json(url.as_str(), &request)
            .await
            .map_err(|err| map_status(err, |status, message| Error::Submission { status, message }))
    }

    #[instrument(skip(self), fields(relay = %self.base_url))]
    async fn job_status(&self, job_id: &JobId) -> Result<JobStatusResponse, Error> {
        let url = self.endpoint(&["job_status", job_id.as_str()])?;

        self.inner
            .fetch(url.as_str())
            .await
            .map_err(|err| map_status(err, |status, message| Error::Poll { status, message }))
    }

    #[instrument(skip(self), fields(relay = %self.base_url))]
    async fn get_address(&self, contract: Option<&str>) -> Result<String, Error> {
        let url = match contract {
            Some(contract) => self.endpoint(&["get_address", contract])?,
            None => self.endpoint(&["get_address"])?,
        };

        let address = self.inner.get_text(url.as_str()).await?;

        Ok(address.trim().to_string())
    }

    #[instrument(skip(self), fields(relay = %self.base_url))]
    async fn balance(&self) -> Result<BalanceResponse, Error> {
        let url = self.endpoint(&["balance"])?;

        Ok(self.inner.fetch(url.as_str()).await?)
    }

    #[instrument(skip(self), fields(relay = %self.base_url))]
    async fn deploy_escrow(
        &self,
        request: DeployEscrowRequest,
    ) -> Result<DeployEscrowResponse, Error> {
        let url = self.endpoint(&["deploy_escrow"])?;

        self.inner
            .post_json(url.as_str(), &request)
            .await
            .map_err(|err| map_status(err, |status, message| Error::Deploy { status, message }))
    }
}
