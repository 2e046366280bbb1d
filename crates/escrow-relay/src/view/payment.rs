//! Payment view controller
//!
//! Drives one [`ViewState`] through the submit and poll workflow. Each
//! submission runs under its own generation number and cancellation token: a
//! newer accepted submission, [`PaymentView::cancel`] or teardown cancels the
//! current one, and a stale workflow can never write to the state of a newer
//! one. Rejected input never touches a running workflow.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use super::render::{render, Renderer, ViewLabels};
use super::state::{ViewEvent, ViewState};
use crate::connector::RelayConnector;
use crate::error::Error;
use crate::poller::{JobPoller, PollOutcome, PollPolicy};
use crate::store::EscrowStore;
use crate::submit::submit_job;
use crate::timer::{TaskHandle, TaskSlot};
use crate::types::PaymentIntent;

/// Payment view configuration
#[derive(Debug, Clone, Default)]
pub struct PaymentViewConfig {
    /// Escrow contract whose deposit address is shown, relay default if `None`
    pub contract: Option<String>,
    /// Job status polling
    pub poll: PollPolicy,
    /// Texts
    pub labels: ViewLabels,
}

#[derive(Debug, Default)]
struct Workflow {
    generation: u64,
    active: Option<CancellationToken>,
}

/// Payment view
pub struct PaymentView {
    connector: Arc<dyn RelayConnector + Send + Sync>,
    poller: JobPoller,
    contract: Option<String>,
    labels: ViewLabels,
    renderer: Arc<dyn Renderer>,
    state: watch::Sender<ViewState>,
    workflow: Mutex<Workflow>,
    root: CancellationToken,
    default_destination: Arc<RwLock<Option<String>>>,
    store_listener: TaskSlot,
}

impl std::fmt::Debug for PaymentView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentView")
            .field("contract", &self.contract)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl PaymentView {
    /// Create new [`PaymentView`] in the [`ViewState::Idle`] state
    pub fn new(
        connector: Arc<dyn RelayConnector + Send + Sync>,
        config: PaymentViewConfig,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let (state, _) = watch::channel(ViewState::Idle);

        Self {
            poller: JobPoller::new(connector.clone(), config.poll),
            connector,
            contract: config.contract,
            labels: config.labels,
            renderer,
            state,
            workflow: Mutex::new(Workflow::default()),
            root: CancellationToken::new(),
            default_destination: Arc::new(RwLock::new(None)),
            store_listener: TaskSlot::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Destination used when a submission names none
    pub fn default_destination(&self) -> Option<String> {
        self.default_destination
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Set the destination used when a submission names none
    pub fn set_default_destination(&self, destination: Option<String>) {
        *self
            .default_destination
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = destination;
    }

    /// Follow the escrow contract of `store` as default destination
    ///
    /// Must be called from within a tokio runtime.
    pub fn watch_store(&self, store: &EscrowStore) {
        self.set_default_destination(store.get());

        let mut updates = store.subscribe();
        let destination = self.default_destination.clone();
        let cancel = self.root.clone();

        self.store_listener.replace(TaskHandle::spawn(async move {
            loop {
                let update = tokio::select! {
                    _ = cancel.cancelled() => break,
                    update = updates.recv() => update,
                };

                match update {
                    Ok(update) => {
                        tracing::debug!("Default destination now {}", update.address);
                        *destination
                            .write()
                            .unwrap_or_else(|poisoned| poisoned.into_inner()) =
                            Some(update.address);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Missed {} escrow contract updates", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }));
    }

    /// Load the relay wallet address
    pub async fn init(&self) -> Result<String, Error> {
        let Some((generation, cancel)) = self.begin(ViewEvent::Load)? else {
            return Err(Error::Internal("view closed".to_string()));
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Internal("view closed".to_string())),
            result = self.connector.get_address(self.contract.as_deref()) => result,
        };

        let event = match &result {
            Ok(address) => {
                tracing::info!("Relay wallet address: {}", address);
                ViewEvent::AddressLoaded(address.clone())
            }
            Err(err) => {
                tracing::warn!("Could not load relay wallet address: {}", err);
                ViewEvent::load_failed(err)
            }
        };

        self.transition(generation, event)?;
        self.finish(generation);

        result
    }

    /// Validate and submit a payment, then poll its job until it completes
    ///
    /// Once the input is valid and the view accepts it, any workflow still
    /// running is cancelled. Invalid input only shows an error when no
    /// workflow is running. Without a destination the default destination is used. A superseded or cancelled workflow
    /// returns [`PollOutcome::Cancelled`] and leaves the state to the newer one.
    pub async fn submit(
        &self,
        destination: Option<&str>,
        amount: &str,
    ) -> Result<PollOutcome, Error> {
        let destination = match destination {
            Some(destination) => destination.to_string(),
            None => self.default_destination().unwrap_or_default(),
        };

        let intent = match PaymentIntent::parse(&destination, amount) {
            Ok(intent) => intent,
            Err(err) => {
                tracing::debug!("Rejected payment input: {}", err);
                self.reject_input(&err);
                return Err(err);
            }
        };

        let Some((generation, cancel)) = self.begin(ViewEvent::Submit(intent.clone()))? else {
            return Ok(PollOutcome::Cancelled { attempts: 0 });
        };

        let created = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(PollOutcome::Cancelled { attempts: 0 }),
            created = submit_job(self.connector.as_ref(), &intent) => created,
        };

        let job_id = match created {
            Ok(job_id) => job_id,
            Err(err) => {
                self.fail(generation, &err);
                return Err(err);
            }
        };

        if !self.transition(generation, ViewEvent::JobCreated(job_id.clone()))? {
            return Ok(PollOutcome::Cancelled { attempts: 0 });
        }

        let polled = self
            .poller
            .wait_for_completion_with(&job_id, &cancel, |_, _| {
                if let Err(err) = self.transition(generation, ViewEvent::StatusPending) {
                    tracing::debug!("Dropped pending status of job {}: {}", job_id, err);
                }
            })
            .await;

        match polled {
            Ok(PollOutcome::Completed { attempts }) => {
                if !self.transition(generation, ViewEvent::JobCompleted)? {
                    return Ok(PollOutcome::Cancelled { attempts });
                }
                self.finish(generation);
                Ok(PollOutcome::Completed { attempts })
            }
            Ok(outcome @ PollOutcome::Cancelled { .. }) => Ok(outcome),
            Err(err) => {
                self.fail(generation, &err);
                Err(err)
            }
        }
    }

    /// Cancel the running workflow, keeping the current state
    pub fn cancel(&self) {
        let mut workflow = self.lock_workflow();
        workflow.generation += 1;
        if let Some(active) = workflow.active.take() {
            tracing::debug!("Cancelling payment workflow");
            active.cancel();
        }
    }

    /// Cancel the running workflow and go back to [`ViewState::Idle`]
    pub fn reset(&self) -> Result<(), Error> {
        self.cancel();
        let generation = self.lock_workflow().generation;
        self.transition(generation, ViewEvent::Reset)?;
        Ok(())
    }

    /// Cancel everything the view owns
    pub fn shutdown(&self) {
        self.cancel();
        self.root.cancel();
        self.store_listener.clear();
    }

    fn lock_workflow(&self) -> MutexGuard<'_, Workflow> {
        self.workflow
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a workflow with `event`, cancelling the previous one
    ///
    /// The event is checked against the current state first; a rejected event
    /// leaves the running workflow alone. `None` once the view is shut down.
    fn begin(&self, event: ViewEvent) -> Result<Option<(u64, CancellationToken)>, Error> {
        let mut workflow = self.lock_workflow();

        if self.root.is_cancelled() {
            return Ok(None);
        }

        let next = self.state.borrow().apply(event)?;

        workflow.generation += 1;

        if let Some(previous) = workflow.active.take() {
            tracing::debug!("Superseding payment workflow");
            previous.cancel();
        }

        let token = self.root.child_token();
        workflow.active = Some(token.clone());

        self.publish(next);

        Ok(Some((workflow.generation, token)))
    }

    /// Release the token of a workflow that ran to completion
    fn finish(&self, generation: u64) {
        let mut workflow = self.lock_workflow();
        if workflow.generation == generation {
            workflow.active = None;
        }
    }

    /// Apply `event` for workflow `generation`
    ///
    /// Returns `false` without touching the state when the workflow is stale.
    fn transition(&self, generation: u64, event: ViewEvent) -> Result<bool, Error> {
        let workflow = self.lock_workflow();

        if workflow.generation != generation || self.root.is_cancelled() {
            tracing::debug!("Discarding {} from a superseded workflow", event.name());
            return Ok(false);
        }

        let next = self.state.borrow().apply(event)?;
        self.publish(next);

        drop(workflow);

        Ok(true)
    }

    /// Store and render `next`; callers hold the workflow lock
    fn publish(&self, next: ViewState) {
        let rendered = render(&next, &self.labels);

        self.state.send_replace(next.clone());
        self.renderer.render(&next, &rendered);
    }

    /// Show a validation error unless a workflow is running
    fn reject_input(&self, err: &Error) {
        let generation = {
            let workflow = self.lock_workflow();
            if workflow.active.is_some() {
                tracing::debug!("Keeping running workflow despite invalid input");
                return;
            }
            workflow.generation
        };

        self.fail(generation, err);
    }

    fn fail(&self, generation: u64, err: &Error) {
        match self.transition(generation, ViewEvent::failed(err)) {
            Ok(_) => self.finish(generation),
            Err(transition) => {
                tracing::debug!("Could not show error `{}`: {}", err, transition);
            }
        }
    }
}

impl Drop for PaymentView {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;
    use crate::error::ErrorCode;
    use crate::test_utils::{Call, RecordingRenderer, Reply, ScriptedConnector};
    use crate::types::{CreateJobRequest, JobId, JobStatus};
    use crate::view::render::Panel;

    fn view(
        connector: &ScriptedConnector,
        config: PaymentViewConfig,
    ) -> (PaymentView, Arc<RecordingRenderer>) {
        let renderer = Arc::new(RecordingRenderer::default());
        let view = PaymentView::new(Arc::new(connector.clone()), config, renderer.clone());
        (view, renderer)
    }

    fn wallet_connector() -> ScriptedConnector {
        ScriptedConnector::new().address_replies([Reply::Ok("wallet-address".to_string())])
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_loads_address() {
        let connector = wallet_connector();
        let (view, renderer) = view(&connector, PaymentViewConfig::default());

        let address = view.init().await.expect("address loaded");

        assert_eq!(address, "wallet-address");
        assert_eq!(renderer.state_names(), vec!["loading", "wallet_ready"]);
        assert_eq!(connector.calls(), vec![Call::GetAddress(None)]);
        assert_eq!(
            renderer.last().map(|rendered| rendered.message),
            Some("wallet-address".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_uses_configured_contract() {
        let connector = wallet_connector();
        let config = PaymentViewConfig {
            contract: Some("default".to_string()),
            ..Default::default()
        };
        let (view, _) = view(&connector, config);

        view.init().await.expect("address loaded");

        assert_eq!(
            connector.calls(),
            vec![Call::GetAddress(Some("default".to_string()))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_failure_blocks_submission() {
        let connector = ScriptedConnector::new()
            .address_replies([Reply::Status(500, "Failed to get address")]);
        let (view, _) = view(&connector, PaymentViewConfig::default());

        assert!(view.init().await.is_err());
        assert!(matches!(
            view.state(),
            ViewState::Error { address: None, .. }
        ));

        let result = view.submit(Some("addr1"), "100").await;
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
        assert_eq!(connector.create_job_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_then_completed_reaches_success_once() {
        let connector = wallet_connector()
            .create_job_replies([Reply::Ok("job-42".to_string())])
            .status_replies([Reply::Ok(JobStatus::Pending), Reply::Ok(JobStatus::Completed)]);
        let (view, renderer) = view(&connector, PaymentViewConfig::default());
        view.init().await.expect("address loaded");

        let outcome = view.submit(Some("addr1"), "100").await.expect("job completes");

        assert_eq!(outcome, PollOutcome::Completed { attempts: 2 });
        assert_eq!(connector.status_calls(), 2);
        assert_eq!(
            renderer.state_names(),
            vec![
                "loading",
                "wallet_ready",
                "submitting",
                "polling",
                "polling",
                "success"
            ]
        );
        assert_eq!(
            view.state(),
            ViewState::Success {
                address: "wallet-address".to_string(),
                job_id: JobId::from("job-42"),
            }
        );
        assert_eq!(
            connector.calls()[1],
            Call::CreateJob(CreateJobRequest {
                contract_address: "addr1".to_string(),
                amount: 100,
            })
        );
        assert_eq!(renderer.last().map(|r| r.panel), Some(Panel::Success));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input_makes_no_request() {
        let connector = wallet_connector();
        let (view, renderer) = view(&connector, PaymentViewConfig::default());
        view.init().await.expect("address loaded");

        let cases = [
            ("", "50", ErrorCode::EmptyDestination),
            ("   ", "50", ErrorCode::EmptyDestination),
            ("addr1", "0", ErrorCode::InvalidAmount),
            ("addr1", "-5", ErrorCode::InvalidAmount),
            ("addr1", "1.5", ErrorCode::InvalidAmount),
            ("addr1", "abc", ErrorCode::InvalidAmount),
            ("addr1", "", ErrorCode::InvalidAmount),
        ];

        for (destination, amount, expected) in cases {
            let err = view
                .submit(Some(destination), amount)
                .await
                .expect_err("invalid input");
            assert!(err.is_validation());
            assert_eq!(err.code(), expected);

            match view.state() {
                ViewState::Error { code, address, .. } => {
                    assert_eq!(code, expected);
                    assert_eq!(address.as_deref(), Some("wallet-address"));
                }
                other => panic!("Expected error state, got {other:?}"),
            }
        }

        assert_eq!(connector.calls(), vec![Call::GetAddress(None)]);
        assert_eq!(
            renderer.last().map(|r| r.message),
            Some("Error: Invalid amount ``: must be a positive integer".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_job_failure_skips_polling() {
        let connector = wallet_connector()
            .create_job_replies([Reply::Status(500, "Failed to create job")])
            .status_replies([Reply::Ok(JobStatus::Completed)]);
        let (view, renderer) = view(&connector, PaymentViewConfig::default());
        view.init().await.expect("address loaded");

        let result = view.submit(Some("addr1"), "100").await;

        assert!(matches!(result, Err(Error::Submission { status: 500, .. })));
        assert_eq!(connector.status_calls(), 0);
        assert_eq!(
            renderer.state_names(),
            vec!["loading", "wallet_ready", "submitting", "error"]
        );

        let rendered = renderer.last().expect("rendered");
        assert_eq!(rendered.panel, Panel::Error);
        assert!(rendered.button.enabled);
        assert_eq!(rendered.button.label, "Submit");
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_failure_on_first_poll() {
        let connector = wallet_connector()
            .create_job_replies([Reply::Ok("job-1".to_string())])
            .status_replies([Reply::Status(500, "Failed to get job status")]);
        let (view, renderer) = view(&connector, PaymentViewConfig::default());
        view.init().await.expect("address loaded");

        let result = view.submit(Some("addr1"), "100").await;

        assert!(matches!(result, Err(Error::Poll { status: 500, .. })));
        assert_eq!(connector.status_calls(), 1);
        assert_eq!(
            renderer.state_names(),
            vec!["loading", "wallet_ready", "submitting", "polling", "error"]
        );

        sleep(Duration::from_secs(30)).await;
        assert_eq!(connector.status_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_failure_after_pending() {
        let connector = wallet_connector()
            .create_job_replies([Reply::Ok("job-1".to_string())])
            .status_replies([
                Reply::Ok(JobStatus::Pending),
                Reply::Timeout,
                Reply::Ok(JobStatus::Completed),
            ]);
        let (view, _) = view(&connector, PaymentViewConfig::default());
        view.init().await.expect("address loaded");

        let result = view.submit(Some("addr1"), "100").await;

        assert!(matches!(result, Err(Error::Http(_))));
        assert_eq!(connector.status_calls(), 2);
        assert!(matches!(
            view.state(),
            ViewState::Error {
                code: ErrorCode::Transport,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubmit_after_success() {
        let connector = wallet_connector()
            .create_job_replies([Reply::Ok("job-1".to_string()), Reply::Ok("job-2".to_string())])
            .status_replies([Reply::Ok(JobStatus::Completed)]);
        let (view, _) = view(&connector, PaymentViewConfig::default());
        view.init().await.expect("address loaded");

        view.submit(Some("addr1"), "100").await.expect("first job");
        view.submit(Some("addr1"), "200").await.expect("second job");

        assert!(matches!(
            view.state(),
            ViewState::Success { job_id, .. } if job_id.as_str() == "job-2"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_submission_supersedes_running_one() {
        let connector = wallet_connector()
            .create_job_replies([Reply::Ok("job-1".to_string()), Reply::Ok("job-2".to_string())])
            .status_replies([
                Reply::Ok(JobStatus::Pending),
                Reply::Ok(JobStatus::Pending),
                Reply::Ok(JobStatus::Completed),
            ]);
        let (view, renderer) = view(&connector, PaymentViewConfig::default());
        let view = Arc::new(view);
        view.init().await.expect("address loaded");

        let first = {
            let view = view.clone();
            tokio::spawn(async move { view.submit(Some("addr1"), "100").await })
        };

        sleep(Duration::from_millis(3000)).await;
        assert_eq!(connector.status_calls(), 2);

        let second = view
            .submit(Some("addr2"), "200")
            .await
            .expect("second job completes");
        let first = first.await.expect("task joined").expect("cancelled, not failed");

        assert_eq!(first, PollOutcome::Cancelled { attempts: 2 });
        assert_eq!(second, PollOutcome::Completed { attempts: 1 });
        assert!(matches!(
            view.state(),
            ViewState::Success { job_id, .. } if job_id.as_str() == "job-2"
        ));
        assert!(!renderer.state_names().contains(&"error"));

        sleep(Duration::from_secs(60)).await;
        assert_eq!(connector.status_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_polling() {
        let connector = wallet_connector()
            .create_job_replies([Reply::Ok("job-1".to_string())])
            .status_replies([Reply::Ok(JobStatus::Pending)]);
        let (view, renderer) = view(&connector, PaymentViewConfig::default());
        let view = Arc::new(view);
        view.init().await.expect("address loaded");

        let running = {
            let view = view.clone();
            tokio::spawn(async move { view.submit(Some("addr1"), "100").await })
        };

        sleep(Duration::from_millis(5000)).await;
        let frames = renderer.states().len();
        view.cancel();

        let outcome = running.await.expect("task joined").expect("cancelled");
        assert_eq!(outcome, PollOutcome::Cancelled { attempts: 3 });

        sleep(Duration::from_secs(60)).await;
        assert_eq!(connector.status_calls(), 3);
        assert_eq!(renderer.states().len(), frames);
        assert_eq!(view.state().name(), "polling");

        view.reset().expect("reset");
        assert_eq!(view.state(), ViewState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_workflow() {
        let connector = wallet_connector()
            .create_job_replies([Reply::Ok("job-1".to_string())])
            .status_replies([Reply::Ok(JobStatus::Pending)]);
        let (view, _) = view(&connector, PaymentViewConfig::default());
        let view = Arc::new(view);
        view.init().await.expect("address loaded");

        let running = {
            let view = view.clone();
            tokio::spawn(async move { view.submit(Some("addr1"), "100").await })
        };

        sleep(Duration::from_millis(1000)).await;
        view.shutdown();

        let outcome = running.await.expect("task joined").expect("cancelled");
        assert!(matches!(outcome, PollOutcome::Cancelled { .. }));
        assert_eq!(connector.status_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_transition_rendered_once() {
        let connector = wallet_connector()
            .create_job_replies([Reply::Ok("job-42".to_string())])
            .status_replies([
                Reply::Ok(JobStatus::Pending),
                Reply::Ok(JobStatus::Unknown("Proving".to_string())),
                Reply::Ok(JobStatus::Completed),
            ]);
        let (view, renderer) = view(&connector, PaymentViewConfig::default());
        let mut changes = view.subscribe();

        view.init().await.expect("address loaded");
        view.submit(Some("addr1"), "100").await.expect("job completes");

        let states = renderer.states();
        assert_eq!(states.len(), 7);
        assert!(matches!(
            states[5],
            ViewState::Polling { attempt: 2, .. }
        ));
        assert_eq!(states.last(), Some(&view.state()));
        assert!(changes.has_changed().expect("view alive"));
        assert_eq!(*changes.borrow_and_update(), view.state());
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_destination_follows_store() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = EscrowStore::in_work_dir(dir.path());
        store.save("0xabc");

        let connector = wallet_connector()
            .create_job_replies([Reply::Ok("job-1".to_string())])
            .status_replies([Reply::Ok(JobStatus::Completed)]);
        let (view, _) = view(&connector, PaymentViewConfig::default());
        view.watch_store(&store);
        view.init().await.expect("address loaded");

        view.submit(None, "10").await.expect("job completes");
        assert_eq!(
            connector.calls()[1],
            Call::CreateJob(CreateJobRequest {
                contract_address: "0xabc".to_string(),
                amount: 10,
            })
        );

        store.save("0xdef");
        sleep(Duration::from_millis(1)).await;
        assert_eq!(view.default_destination(), Some("0xdef".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_default_destination_is_rejected() {
        let connector = wallet_connector();
        let (view, _) = view(&connector, PaymentViewConfig::default());
        view.init().await.expect("address loaded");

        let result = view.submit(None, "10").await;

        assert!(matches!(result, Err(Error::EmptyDestination)));
        assert_eq!(connector.create_job_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_during_init_keeps_loading_address() {
        let connector = wallet_connector().latency(Duration::from_millis(500));
        let (view, _) = view(&connector, PaymentViewConfig::default());
        let view = Arc::new(view);

        let loading = {
            let view = view.clone();
            tokio::spawn(async move { view.init().await })
        };

        sleep(Duration::from_millis(100)).await;
        assert_eq!(view.state(), ViewState::Loading);

        let rejected = view.submit(Some("addr1"), "100").await;
        assert!(matches!(
            rejected,
            Err(Error::InvalidTransition { state: "loading", event: "submit" })
        ));

        let address = loading
            .await
            .expect("task joined")
            .expect("address loaded");
        assert_eq!(address, "wallet-address");
        assert_eq!(
            view.state(),
            ViewState::WalletReady {
                address: "wallet-address".to_string()
            }
        );
        assert_eq!(connector.create_job_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input_keeps_running_poll() {
        let connector = wallet_connector()
            .create_job_replies([Reply::Ok("job-1".to_string())])
            .status_replies([
                Reply::Ok(JobStatus::Pending),
                Reply::Ok(JobStatus::Pending),
                Reply::Ok(JobStatus::Completed),
            ]);
        let (view, _) = view(&connector, PaymentViewConfig::default());
        let view = Arc::new(view);
        view.init().await.expect("address loaded");

        let running = {
            let view = view.clone();
            tokio::spawn(async move { view.submit(Some("addr1"), "100").await })
        };

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(view.state().name(), "polling");

        let err = view
            .submit(Some("addr2"), "1O0")
            .await
            .expect_err("invalid amount");
        assert_eq!(err.code(), ErrorCode::InvalidAmount);
        assert_eq!(view.state().name(), "polling");

        let outcome = running.await.expect("task joined").expect("job completes");
        assert_eq!(outcome, PollOutcome::Completed { attempts: 3 });
        assert!(matches!(
            view.state(),
            ViewState::Success { job_id, .. } if job_id.as_str() == "job-1"
        ));
        assert_eq!(connector.create_job_calls(), 1);
    }
}
