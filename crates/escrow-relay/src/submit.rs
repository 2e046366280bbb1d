//! Job submission

use crate::connector::RelayConnector;
use crate::error::Error;
use crate::types::{CreateJobRequest, JobId, PaymentIntent};

/// Submit a payment intent to the relay and return the id of the created job
///
/// A rejected request surfaces as [`Error::Submission`] immediately; nothing
/// is retried at this layer.
pub async fn submit_job<C>(connector: &C, intent: &PaymentIntent) -> Result<JobId, Error>
where
    C: RelayConnector + ?Sized,
{
    let response = connector
        .create_job(CreateJobRequest::from(intent))
        .await
        .inspect_err(|err| {
            tracing::warn!(
                "Could not create job for {}: {}",
                intent.destination(),
                err
            )
        })?;

    tracing::info!(
        "Created job {} paying {} to {}",
        response.job_id,
        intent.amount(),
        intent.destination()
    );

    Ok(response.job_id)
}
