#![cfg(test)]
#![allow(missing_docs)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use escrow_http_client::HttpError;

use crate::connector::RelayConnector;
use crate::error::Error;
use crate::types::{
    BalanceResponse, CreateJobRequest, CreateJobResponse, DeployEscrowRequest,
    DeployEscrowResponse, JobId, JobStatus, JobStatusResponse,
};
use crate::view::{Rendered, Renderer, ViewState};

/// Scripted answer of the relay
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Status(u16, &'static str),
    Timeout,
}

/// Relay calls observed by the [`ScriptedConnector`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateJob(CreateJobRequest),
    JobStatus(JobId),
    GetAddress(Option<String>),
    Balance,
    DeployEscrow(u64),
}

#[derive(Debug, Default)]
struct Script {
    create_job: VecDeque<Reply<String>>,
    job_status: VecDeque<Reply<JobStatus>>,
    address: VecDeque<Reply<String>>,
    balance: VecDeque<Reply<String>>,
    deploy: VecDeque<Reply<String>>,
    calls: Vec<Call>,
    latency: Option<Duration>,
}

/// In-memory relay answering from a script and recording every call
///
/// When a queue runs dry the last scripted answer is repeated.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    script: Arc<Mutex<Script>>,
}

fn next<T: Clone>(queue: &mut VecDeque<Reply<T>>, call: &str) -> Reply<T> {
    if queue.len() > 1 {
        queue.pop_front().expect("queue is not empty")
    } else {
        queue
            .front()
            .cloned()
            .unwrap_or_else(|| panic!("no scripted reply for {call}"))
    }
}

fn into_result<T, R>(
    reply: Reply<T>,
    ok: impl FnOnce(T) -> R,
    status: impl FnOnce(u16, String) -> Error,
) -> Result<R, Error> {
    match reply {
        Reply::Ok(value) => Ok(ok(value)),
        Reply::Status(code, message) => Err(status(code, message.to_string())),
        Reply::Timeout => Err(Error::Http(HttpError::Timeout)),
    }
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_job_replies(self, replies: impl IntoIterator<Item = Reply<String>>) -> Self {
        self.script
            .lock()
            .expect("lock")
            .create_job
            .extend(replies);
        self
    }

    pub fn status_replies(self, replies: impl IntoIterator<Item = Reply<JobStatus>>) -> Self {
        self.script
            .lock()
            .expect("lock")
            .job_status
            .extend(replies);
        self
    }

    pub fn address_replies(self, replies: impl IntoIterator<Item = Reply<String>>) -> Self {
        self.script.lock().expect("lock").address.extend(replies);
        self
    }

    pub fn balance_replies(self, replies: impl IntoIterator<Item = Reply<String>>) -> Self {
        self.script.lock().expect("lock").balance.extend(replies);
        self
    }

    pub fn deploy_replies(self, replies: impl IntoIterator<Item = Reply<String>>) -> Self {
        self.script.lock().expect("lock").deploy.extend(replies);
        self
    }

    /// Every call waits `latency` before answering
    pub fn latency(self, latency: Duration) -> Self {
        self.script.lock().expect("lock").latency = Some(latency);
        self
    }

    async fn delay(&self) {
        let latency = self.script.lock().expect("lock").latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    pub fn deploy_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::DeployEscrow(_)))
            .count()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().expect("lock").calls.clone()
    }

    pub fn status_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::JobStatus(_)))
            .count()
    }

    pub fn create_job_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::CreateJob(_)))
            .count()
    }

    pub fn balance_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Balance))
            .count()
    }
}

#[async_trait]
impl RelayConnector for ScriptedConnector {
    async fn create_job(&self, request: CreateJobRequest) -> Result<CreateJobResponse, Error> {
        let reply = {
            let mut script = self.script.lock().expect("lock");
            script.calls.push(Call::CreateJob(request));
            next(&mut script.create_job, "create_job")
        };
        self.delay().await;

        into_result(
            reply,
            |job_id| CreateJobResponse {
                job_id: JobId::from(job_id),
            },
            |status, message| Error::Submission { status, message },
        )
    }

    async fn job_status(&self, job_id: &JobId) -> Result<JobStatusResponse, Error> {
        let reply = {
            let mut script = self.script.lock().expect("lock");
            script.calls.push(Call::JobStatus(job_id.clone()));
            next(&mut script.job_status, "job_status")
        };
        self.delay().await;

        into_result(
            reply,
            |status| JobStatusResponse { status },
            |status, message| Error::Poll { status, message },
        )
    }

    async fn get_address(&self, contract: Option<&str>) -> Result<String, Error> {
        let reply = {
            let mut script = self.script.lock().expect("lock");
            script
                .calls
                .push(Call::GetAddress(contract.map(str::to_string)));
            next(&mut script.address, "get_address")
        };
        self.delay().await;

        into_result(
            reply,
            |address| address,
            |status, message| Error::Http(HttpError::Status { status, message }),
        )
    }

    async fn balance(&self) -> Result<BalanceResponse, Error> {
        let reply = {
            let mut script = self.script.lock().expect("lock");
            script.calls.push(Call::Balance);
            next(&mut script.balance, "balance")
        };
        self.delay().await;

        into_result(
            reply,
            |balance| BalanceResponse { balance },
            |status, message| Error::Http(HttpError::Status { status, message }),
        )
    }

    async fn deploy_escrow(
        &self,
        request: DeployEscrowRequest,
    ) -> Result<DeployEscrowResponse, Error> {
        let reply = {
            let mut script = self.script.lock().expect("lock");
            script.calls.push(Call::DeployEscrow(request.amount));
            next(&mut script.deploy, "deploy_escrow")
        };
        self.delay().await;

        into_result(
            reply,
            |contract_address| DeployEscrowResponse { contract_address },
            |status, message| Error::Deploy { status, message },
        )
    }
}

/// Renderer keeping every state it was asked to draw
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    frames: Mutex<Vec<(ViewState, Rendered)>>,
}

impl RecordingRenderer {
    pub fn states(&self) -> Vec<ViewState> {
        self.frames
            .lock()
            .expect("lock")
            .iter()
            .map(|(state, _)| state.clone())
            .collect()
    }

    pub fn state_names(&self) -> Vec<&'static str> {
        self.states().iter().map(ViewState::name).collect()
    }

    pub fn last(&self) -> Option<Rendered> {
        self.frames
            .lock()
            .expect("lock")
            .last()
            .map(|(_, rendered)| rendered.clone())
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, state: &ViewState, rendered: &Rendered) {
        self.frames
            .lock()
            .expect("lock")
            .push((state.clone(), rendered.clone()));
    }
}
