//! Job status poller
//!
//! Polls a relay job until it reaches the `Completed` status. The only outcome
//! that is retried is a non-terminal status; every error stops polling at once.
//! The loop is bounded by an attempt budget and an optional deadline, and it
//! can be cancelled at any await point through a [`CancellationToken`].

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::connector::RelayConnector;
use crate::error::Error;
use crate::types::{JobId, JobStatus};

/// Interval observed between status checks of the web front-ends
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Default number of status checks before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 150;

/// How the delay between two status checks evolves
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Backoff {
    /// Always wait the base interval
    #[default]
    Fixed,
    /// Multiply the delay by `factor` after every check, up to `max_interval`
    Exponential {
        /// Growth factor
        factor: u32,
        /// Upper bound of the delay
        max_interval: Duration,
    },
}

/// Bounds and cadence of a poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Base delay between two status checks
    pub interval: Duration,
    /// Delay growth
    pub backoff: Backoff,
    /// Maximum number of status checks
    pub max_attempts: u32,
    /// Give up once this much time has passed since the first check
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            backoff: Backoff::Fixed,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            deadline: None,
        }
    }
}

impl PollPolicy {
    /// Delay to wait after the `attempt`-th status check (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match &self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Exponential {
                factor,
                max_interval,
            } => {
                let exponent = attempt.saturating_sub(1);
                let multiplier = (*factor).max(1).saturating_pow(exponent);

                self.interval.saturating_mul(multiplier).min(*max_interval)
            }
        }
    }
}

/// How a poll ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Relay reported the job as completed
    Completed {
        /// Status checks issued
        attempts: u32,
    },
    /// Poll was cancelled before the job completed
    Cancelled {
        /// Status checks issued
        attempts: u32,
    },
}

impl PollOutcome {
    /// Status checks issued
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Completed { attempts } | Self::Cancelled { attempts } => *attempts,
        }
    }
}

/// Polls relay jobs with a [`PollPolicy`]
#[derive(Debug, Clone)]
pub struct JobPoller {
    connector: Arc<dyn RelayConnector + Send + Sync>,
    policy: PollPolicy,
}

impl JobPoller {
    /// Create new [`JobPoller`]
    pub fn new(connector: Arc<dyn RelayConnector + Send + Sync>, policy: PollPolicy) -> Self {
        Self { connector, policy }
    }

    /// Poll policy
    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Wait until the job is completed, fails, runs out of budget or is cancelled
    pub async fn wait_for_completion(
        &self,
        job_id: &JobId,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome, Error> {
        self.wait_for_completion_with(job_id, cancel, |_, _| {})
            .await
    }

    /// Same as [`JobPoller::wait_for_completion`], calling `on_pending` after
    /// every non-terminal status with the number of checks issued so far
    pub async fn wait_for_completion_with<F>(
        &self,
        job_id: &JobId,
        cancel: &CancellationToken,
        mut on_pending: F,
    ) -> Result<PollOutcome, Error>
    where
        F: FnMut(u32, &JobStatus) + Send,
    {
        let deadline = self.policy.deadline.map(|deadline| Instant::now() + deadline);
        let mut attempts: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                tracing::debug!("Polling of job {} cancelled", job_id);
                return Ok(PollOutcome::Cancelled { attempts });
            }

            if attempts >= self.policy.max_attempts {
                tracing::warn!("Job {} not completed after {} checks", job_id, attempts);
                return Err(Error::PollExhausted {
                    job_id: job_id.clone(),
                    attempts,
                });
            }

            attempts += 1;

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Polling of job {} cancelled", job_id);
                    return Ok(PollOutcome::Cancelled { attempts });
                }
                response = self.connector.job_status(job_id) => response,
                _ = deadline_elapsed(deadline) => {
                    tracing::warn!("Job {} status check {} outlived the deadline", job_id, attempts);
                    return Err(Error::PollDeadline(job_id.clone()));
                }
            };

            let status = match response {
                Ok(response) => response.status,
                Err(err) => {
                    tracing::warn!("Status check {} of job {} failed: {}", attempts, job_id, err);
                    return Err(err);
                }
            };

            tracing::debug!("Job {} status after {} checks: {}", job_id, attempts, status);

            match status {
                JobStatus::Completed => {
                    tracing::info!("Job {} completed", job_id);
                    return Ok(PollOutcome::Completed { attempts });
                }
                JobStatus::Failed => {
                    tracing::warn!("Job {} failed", job_id);
                    return Err(Error::JobFailed(job_id.clone()));
                }
                status => on_pending(attempts, &status),
            }

            let mut wake_at = Instant::now() + self.policy.delay_after(attempts);

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    tracing::warn!("Job {} not completed before the deadline", job_id);
                    return Err(Error::PollDeadline(job_id.clone()));
                }

                // Last check lands on the deadline
                wake_at = wake_at.min(deadline);
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Polling of job {} cancelled", job_id);
                    return Ok(PollOutcome::Cancelled { attempts });
                }
                _ = sleep_until(wake_at) => {}
            }
        }
    }

    /// Poll on a background task
    ///
    /// The returned [`PollTask`] cancels the poll when dropped.
    pub fn spawn(&self, job_id: JobId) -> PollTask {
        let cancel = CancellationToken::new();
        let poller = self.clone();
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            poller.wait_for_completion(&job_id, &task_cancel).await
        });

        PollTask {
            cancel,
            handle: Some(handle),
        }
    }
}

async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Handle of a poll running on a background task
#[derive(Debug)]
pub struct PollTask {
    cancel: CancellationToken,
    handle: Option<JoinHandle<Result<PollOutcome, Error>>>,
}

impl PollTask {
    /// Token cancelling the poll
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the poll
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the poll to end
    pub async fn join(mut self) -> Result<PollOutcome, Error> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| Error::Internal("poll task already joined".to_string()))?;

        handle
            .await
            .map_err(|err| Error::Internal(err.to_string()))?
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
