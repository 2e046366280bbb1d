//! Errors

use std::fmt;

use escrow_http_client::HttpError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::types::JobId;

/// Escrow relay client error
#[derive(Debug, Error)]
pub enum Error {
    /// Destination address is empty
    #[error("Please enter a valid partial escrow address")]
    EmptyDestination,
    /// Amount is not a positive integer
    #[error("Invalid amount `{0}`: must be a positive integer")]
    InvalidAmount(String),
    /// Relay rejected the job creation request
    #[error("Failed to create job ({status}): {message}")]
    Submission {
        /// HTTP status code
        status: u16,
        /// Relay message
        message: String,
    },
    /// Relay rejected a job status request
    #[error("Failed to get job status ({status}): {message}")]
    Poll {
        /// HTTP status code
        status: u16,
        /// Relay message
        message: String,
    },
    /// Relay reported the job as failed
    #[error("Job `{0}` failed")]
    JobFailed(JobId),
    /// Job did not complete within the allowed number of status requests
    #[error("Job `{job_id}` not completed after {attempts} status checks")]
    PollExhausted {
        /// Job being polled
        job_id: JobId,
        /// Status requests issued
        attempts: u32,
    },
    /// Job did not complete before the polling deadline
    #[error("Job `{0}` not completed before the deadline")]
    PollDeadline(JobId),
    /// Relay rejected the escrow deployment
    #[error("Deployment failed ({status}): {message}")]
    Deploy {
        /// HTTP status code
        status: u16,
        /// Relay message
        message: String,
    },
    /// A deployment is already running
    #[error("Deployment already in progress")]
    DeployInProgress,
    /// View state does not accept the event
    #[error("Invalid view transition: `{event}` in state `{state}`")]
    InvalidTransition {
        /// Current state name
        state: &'static str,
        /// Rejected event name
        event: &'static str,
    },
    /// Escrow contract store error
    #[error("Escrow store error: {0}")]
    Store(String),
    /// Background task failed
    #[error("Internal error: {0}")]
    Internal(String),
    /// Transport error
    #[error(transparent)]
    Http(#[from] HttpError),
    /// Relay URL error
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Stable discriminant of the error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyDestination => ErrorCode::EmptyDestination,
            Self::InvalidAmount(_) => ErrorCode::InvalidAmount,
            Self::Submission { .. } => ErrorCode::SubmissionRejected,
            Self::Poll { .. } => ErrorCode::StatusRejected,
            Self::JobFailed(_) => ErrorCode::JobFailed,
            Self::PollExhausted { .. } => ErrorCode::PollExhausted,
            Self::PollDeadline(_) => ErrorCode::PollDeadline,
            Self::Deploy { .. } => ErrorCode::DeployRejected,
            Self::DeployInProgress => ErrorCode::DeployInProgress,
            Self::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            Self::Store(_) => ErrorCode::Store,
            Self::Internal(_) => ErrorCode::Internal,
            Self::Http(_) => ErrorCode::Transport,
            Self::Url(_) => ErrorCode::Url,
        }
    }

    /// Error caused by user input, raised before any network call
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyDestination | Self::InvalidAmount(_))
    }
}

/// Possible Error Codes
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ErrorCode {
    // 1xxx - Input validation
    /// Destination address is empty (1001)
    EmptyDestination,
    /// Amount is not a positive integer (1002)
    InvalidAmount,

    // 2xxx - Job submission
    /// Relay rejected job creation (2001)
    SubmissionRejected,

    // 3xxx - Job status polling
    /// Relay rejected a status request (3001)
    StatusRejected,
    /// Job reported as failed (3002)
    JobFailed,
    /// Attempt budget exhausted (3003)
    PollExhausted,
    /// Deadline reached (3004)
    PollDeadline,

    // 4xxx - Transport
    /// Connection, timeout or decoding failure (4001)
    Transport,

    // 5xxx - View
    /// Event rejected by the view state (5001)
    InvalidTransition,

    // 6xxx - Escrow deployment
    /// Relay rejected the deployment (6001)
    DeployRejected,
    /// Deployment already running (6002)
    DeployInProgress,

    // 7xxx - Local storage
    /// Escrow contract store failure (7001)
    Store,

    // 8xxx - Configuration
    /// Invalid relay URL (8001)
    Url,

    // 9xxx - Internal
    /// Background task failure (9001)
    Internal,

    /// Unknown error code
    Unknown(u16),
}

impl ErrorCode {
    /// Error code from u16
    pub fn from_code(code: u16) -> Self {
        match code {
            1001 => Self::EmptyDestination,
            1002 => Self::InvalidAmount,
            2001 => Self::SubmissionRejected,
            3001 => Self::StatusRejected,
            3002 => Self::JobFailed,
            3003 => Self::PollExhausted,
            3004 => Self::PollDeadline,
            4001 => Self::Transport,
            5001 => Self::InvalidTransition,
            6001 => Self::DeployRejected,
            6002 => Self::DeployInProgress,
            7001 => Self::Store,
            8001 => Self::Url,
            9001 => Self::Internal,
            _ => Self::Unknown(code),
        }
    }

    /// Error code to u16
    pub fn to_code(&self) -> u16 {
        match self {
            Self::EmptyDestination => 1001,
            Self::InvalidAmount => 1002,
            Self::SubmissionRejected => 2001,
            Self::StatusRejected => 3001,
            Self::JobFailed => 3002,
            Self::PollExhausted => 3003,
            Self::PollDeadline => 3004,
            Self::Transport => 4001,
            Self::InvalidTransition => 5001,
            Self::DeployRejected => 6001,
            Self::DeployInProgress => 6002,
            Self::Store => 7001,
            Self::Url => 8001,
            Self::Internal => 9001,
            Self::Unknown(code) => *code,
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u16(self.to_code())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = u16::deserialize(deserializer)?;

        Ok(ErrorCode::from_code(code))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_code())
    }
}
