//! Relay connector

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::Error;
use crate::types::{
    BalanceResponse, CreateJobRequest, CreateJobResponse, DeployEscrowRequest,
    DeployEscrowResponse, JobId, JobStatusResponse,
};

pub mod http_client;

pub use http_client::HttpRelayClient;

/// Interface that connects the client to an escrow relay. Typically represents an [HttpRelayClient].
///
/// Implementations map a non-success HTTP status to the error variant of the
/// call (`Submission`, `Poll`, `Deploy`) and transport failures to `Error::Http`.
#[async_trait]
pub trait RelayConnector: Debug {
    /// Create a payment relay job
    async fn create_job(&self, request: CreateJobRequest) -> Result<CreateJobResponse, Error>;
    /// Job status
    async fn job_status(&self, job_id: &JobId) -> Result<JobStatusResponse, Error>;
    /// Deposit address of the relay wallet, optionally for one escrow contract
    async fn get_address(&self, contract: Option<&str>) -> Result<String, Error>;
    /// Relay wallet balance
    async fn balance(&self) -> Result<BalanceResponse, Error>;
    /// Deploy an escrow contract
    async fn deploy_escrow(
        &self,
        request: DeployEscrowRequest,
    ) -> Result<DeployEscrowResponse, Error>;
}
