//! Payment view state machine

use crate::error::{Error, ErrorCode};
use crate::types::{JobId, PaymentIntent};

/// Message shown when a failure carries no text
pub const SUBMISSION_FAILED_MESSAGE: &str = "Escrow submission failed";

/// Message shown when loading the wallet fails without text
pub const LOAD_FAILED_MESSAGE: &str = "Unknown error occurred";

/// State of a payment view
///
/// Exactly one panel is visible at a time. Every state after a successful load
/// carries the relay wallet address; `Error` carries it only when it was
/// loaded, which is what allows submitting again from an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Nothing loaded yet
    #[default]
    Idle,
    /// Fetching the relay wallet address
    Loading,
    /// Wallet address known, ready to submit
    WalletReady {
        /// Relay wallet address
        address: String,
    },
    /// Job creation request in flight
    Submitting {
        /// Relay wallet address
        address: String,
        /// Payment being submitted
        intent: PaymentIntent,
    },
    /// Waiting for the job to complete
    Polling {
        /// Relay wallet address
        address: String,
        /// Payment being relayed
        intent: PaymentIntent,
        /// Relay job
        job_id: JobId,
        /// Non-terminal statuses seen so far
        attempt: u32,
    },
    /// Job completed
    Success {
        /// Relay wallet address
        address: String,
        /// Completed job
        job_id: JobId,
    },
    /// Something failed
    Error {
        /// Message shown to the user
        message: String,
        /// Error code
        code: ErrorCode,
        /// Relay wallet address, when it was loaded
        address: Option<String>,
    },
}

/// Input of the payment view state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// Start loading the wallet address
    Load,
    /// Wallet address fetched
    AddressLoaded(String),
    /// Wallet address could not be fetched
    LoadFailed {
        /// Failure text
        message: String,
        /// Error code
        code: ErrorCode,
    },
    /// Validated payment submitted
    Submit(PaymentIntent),
    /// Relay accepted the job
    JobCreated(JobId),
    /// Relay reported a non-terminal status
    StatusPending,
    /// Relay reported the job as completed
    JobCompleted,
    /// Validation, submission or polling failed
    Failed {
        /// Failure text
        message: String,
        /// Error code
        code: ErrorCode,
    },
    /// Back to the initial state
    Reset,
}

impl ViewEvent {
    /// Wallet load failure from an error
    pub fn load_failed(err: &Error) -> Self {
        Self::LoadFailed {
            message: err.to_string(),
            code: err.code(),
        }
    }

    /// Workflow failure from an error
    pub fn failed(err: &Error) -> Self {
        Self::Failed {
            message: err.to_string(),
            code: err.code(),
        }
    }

    /// Event name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::AddressLoaded(_) => "address_loaded",
            Self::LoadFailed { .. } => "load_failed",
            Self::Submit(_) => "submit",
            Self::JobCreated(_) => "job_created",
            Self::StatusPending => "status_pending",
            Self::JobCompleted => "job_completed",
            Self::Failed { .. } => "failed",
            Self::Reset => "reset",
        }
    }
}

fn message_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

impl ViewState {
    /// State name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::WalletReady { .. } => "wallet_ready",
            Self::Submitting { .. } => "submitting",
            Self::Polling { .. } => "polling",
            Self::Success { .. } => "success",
            Self::Error { .. } => "error",
        }
    }

    /// Relay wallet address, when loaded
    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Idle | Self::Loading => None,
            Self::WalletReady { address }
            | Self::Submitting { address, .. }
            | Self::Polling { address, .. }
            | Self::Success { address, .. } => Some(address),
            Self::Error { address, .. } => address.as_deref(),
        }
    }

    /// A submission is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Submitting { .. } | Self::Polling { .. })
    }

    /// A payment can be submitted from this state
    pub fn can_submit(&self) -> bool {
        matches!(
            self,
            Self::WalletReady { .. }
                | Self::Success { .. }
                | Self::Error {
                    address: Some(_),
                    ..
                }
        )
    }

    /// Next state after `event`
    pub fn apply(&self, event: ViewEvent) -> Result<ViewState, Error> {
        let next = match (self, event) {
            (_, ViewEvent::Reset) => Self::Idle,

            (Self::Idle | Self::Error { .. }, ViewEvent::Load) => Self::Loading,

            (Self::Loading, ViewEvent::AddressLoaded(address)) => Self::WalletReady { address },

            (Self::Loading, ViewEvent::LoadFailed { message, code }) => Self::Error {
                message: message_or(message, LOAD_FAILED_MESSAGE),
                code,
                address: None,
            },

            // A busy view accepts a new submission once its workflow is cancelled
            (
                Self::WalletReady { address }
                | Self::Success { address, .. }
                | Self::Submitting { address, .. }
                | Self::Polling { address, .. }
                | Self::Error {
                    address: Some(address),
                    ..
                },
                ViewEvent::Submit(intent),
            ) => Self::Submitting {
                address: address.clone(),
                intent,
            },

            (Self::Submitting { address, intent }, ViewEvent::JobCreated(job_id)) => {
                Self::Polling {
                    address: address.clone(),
                    intent: intent.clone(),
                    job_id,
                    attempt: 0,
                }
            }

            (
                Self::Polling {
                    address,
                    intent,
                    job_id,
                    attempt,
                },
                ViewEvent::StatusPending,
            ) => Self::Polling {
                address: address.clone(),
                intent: intent.clone(),
                job_id: job_id.clone(),
                attempt: attempt.saturating_add(1),
            },

            (Self::Polling { address, job_id, .. }, ViewEvent::JobCompleted) => Self::Success {
                address: address.clone(),
                job_id: job_id.clone(),
            },

            (
                Self::WalletReady { .. }
                | Self::Submitting { .. }
                | Self::Polling { .. }
                | Self::Success { .. }
                | Self::Error { .. },
                ViewEvent::Failed { message, code },
            ) => Self::Error {
                message: message_or(message, SUBMISSION_FAILED_MESSAGE),
                code,
                address: self.address().map(str::to_string),
            },

            (state, event) => {
                return Err(Error::InvalidTransition {
                    state: state.name(),
                    event: event.name(),
                })
            }
        };

        Ok(next)
    }
}
