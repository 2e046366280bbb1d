//! Types exchanged with the escrow relays

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Payment the user asked for
///
/// Only constructed through validation: the destination is non-empty and the
/// amount is a positive integer in the smallest unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    destination: String,
    amount: u64,
}

impl PaymentIntent {
    /// Validate a destination and an amount
    pub fn new(destination: &str, amount: u64) -> Result<Self, Error> {
        let destination = destination.trim();

        if destination.is_empty() {
            return Err(Error::EmptyDestination);
        }

        if amount == 0 {
            return Err(Error::InvalidAmount(amount.to_string()));
        }

        Ok(Self {
            destination: destination.to_string(),
            amount,
        })
    }

    /// Validate raw user input
    pub fn parse(destination: &str, amount: &str) -> Result<Self, Error> {
        if destination.trim().is_empty() {
            return Err(Error::EmptyDestination);
        }

        Self::new(destination, parse_amount(amount)?)
    }

    /// Destination address (escrow contract or partial address)
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Amount in the smallest unit
    pub fn amount(&self) -> u64 {
        self.amount
    }
}

/// Parse a positive integer amount from user input
///
/// Zero, negative, fractional and non-numeric input are rejected.
pub fn parse_amount(input: &str) -> Result<u64, Error> {
    let trimmed = input.trim();

    match trimmed.parse::<u64>() {
        Ok(amount) if amount > 0 => Ok(amount),
        _ => Err(Error::InvalidAmount(trimmed.to_string())),
    }
}

/// Opaque identifier of a relay job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Job id as str
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job status reported by the relay
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    /// Job is still running
    #[default]
    Pending,
    /// Job finished, payment relayed
    Completed,
    /// Job finished without relaying the payment
    Failed,
    /// Status string this client does not know; treated as still running
    Unknown(String),
}

impl JobStatus {
    /// Job will not change status anymore
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
            Self::Unknown(status) => write!(f, "{status}"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = std::convert::Infallible;

    fn from_str(status: &str) -> Result<Self, Self::Err> {
        Ok(match status {
            "Pending" => Self::Pending,
            "Completed" => Self::Completed,
            "Failed" => Self::Failed,
            other => Self::Unknown(other.to_string()),
        })
    }
}

impl From<String> for JobStatus {
    fn from(status: String) -> Self {
        match status.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.to_string()
    }
}

/// Create job request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJobRequest {
    /// Escrow contract (or partial address) the payment is for
    pub contract_address: String,
    /// Amount in the smallest unit
    pub amount: u64,
}

impl From<&PaymentIntent> for CreateJobRequest {
    fn from(intent: &PaymentIntent) -> Self {
        Self {
            contract_address: intent.destination.clone(),
            amount: intent.amount,
        }
    }
}

/// Create job response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJobResponse {
    /// Job id
    pub job_id: JobId,
}

/// Job status response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusResponse {
    /// Current status
    pub status: JobStatus,
}

/// Deploy escrow request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployEscrowRequest {
    /// Amount locked in the escrow
    pub amount: u64,
}

/// Deploy escrow response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployEscrowResponse {
    /// Deployed escrow contract address
    #[serde(rename = "contractAddress")]
    pub contract_address: String,
}

/// Relay wallet balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResponse {
    /// Balance as reported by the relay
    pub balance: String,
}
