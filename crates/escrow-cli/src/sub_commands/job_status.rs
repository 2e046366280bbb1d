use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use escrow_relay::{JobId, JobPoller, PollOutcome, PollPolicy, RelayConnector};

#[derive(Args)]
pub struct JobStatusSubCommand {
    /// Relay job id
    job_id: String,
    /// Poll until the job completes
    #[arg(short, long)]
    wait: bool,
}

pub async fn job_status(
    connector: Arc<dyn RelayConnector + Send + Sync>,
    policy: PollPolicy,
    sub_command_args: &JobStatusSubCommand,
) -> Result<()> {
    let job_id = JobId::from(sub_command_args.job_id.as_str());

    if !sub_command_args.wait {
        let response = connector.job_status(&job_id).await?;
        println!("{}: {}", job_id, response.status);
        return Ok(());
    }

    let task = JobPoller::new(connector, policy).spawn(job_id.clone());

    let cancel = task.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    match task.join().await? {
        PollOutcome::Completed { attempts } => {
            println!("{job_id}: Completed after {attempts} status checks")
        }
        PollOutcome::Cancelled { attempts } => {
            println!("{job_id}: still pending after {attempts} status checks")
        }
    }

    Ok(())
}
