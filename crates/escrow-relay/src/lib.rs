//! Escrow payment relay client
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod connector;
pub mod error;
pub mod poller;
pub mod store;
pub mod submit;
pub mod timer;
pub mod types;
pub mod view;

#[cfg(test)]
mod test_utils;

pub use connector::{HttpRelayClient, RelayConnector};
pub use error::{Error, ErrorCode};
pub use poller::{Backoff, JobPoller, PollOutcome, PollPolicy, PollTask};
pub use store::{EscrowStore, EscrowUpdated};
pub use submit::submit_job;
pub use types::{JobId, JobStatus, PaymentIntent};
pub use view::{DeployView, PaymentView};
