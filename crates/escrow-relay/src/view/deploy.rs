//! Escrow deployment view
//!
//! Deploys escrow contracts through a relay, remembers the last one in the
//! [`EscrowStore`] and keeps the relay wallet balance fresh.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::watch;

use crate::connector::RelayConnector;
use crate::error::Error;
use crate::store::EscrowStore;
use crate::timer::{TaskHandle, TaskSlot};
use crate::types::{parse_amount, DeployEscrowRequest};

/// Banner shown when the balance cannot be fetched
pub const BALANCE_FAILED_MESSAGE: &str = "Failed to fetch balance. Make sure the API is running.";
/// Banner shown when the deploy amount is rejected
pub const INVALID_AMOUNT_MESSAGE: &str = "Please enter a valid amount";
/// Banner shown when the deployment fails
pub const DEPLOY_FAILED_MESSAGE: &str = "Failed to deploy escrow. Check console for details.";

/// Deploy view configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployViewConfig {
    /// Balance refresh period
    pub balance_refresh: Duration,
    /// Time an error banner stays visible
    pub banner_timeout: Duration,
}

impl Default for DeployViewConfig {
    fn default() -> Self {
        Self {
            balance_refresh: Duration::from_millis(5000),
            banner_timeout: Duration::from_millis(5000),
        }
    }
}

/// Relay wallet balance as shown
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BalanceDisplay {
    /// Not fetched yet
    #[default]
    Unknown,
    /// Last fetched balance
    Value(String),
    /// Last fetch failed
    Error,
}

impl fmt::Display for BalanceDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "-"),
            Self::Value(balance) => write!(f, "{balance}"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// State of the deploy view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeployState {
    /// Relay wallet balance
    pub balance: BalanceDisplay,
    /// Last deployed escrow contract
    pub contract: Option<String>,
    /// A deployment is running
    pub deploying: bool,
    /// Visible error banner
    pub banner: Option<String>,
}

#[derive(Debug)]
struct Inner {
    connector: Arc<dyn RelayConnector + Send + Sync>,
    store: EscrowStore,
    config: DeployViewConfig,
    state: watch::Sender<DeployState>,
    banner_timer: TaskSlot,
}

/// Escrow deployment view
#[derive(Debug)]
pub struct DeployView {
    inner: Arc<Inner>,
    refresh: TaskSlot,
}

/// Resets `deploying` however the deployment ends
struct DeployingGuard<'a> {
    state: &'a watch::Sender<DeployState>,
}

impl Drop for DeployingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|state| state.deploying = false);
    }
}

impl Inner {
    fn show_banner(self: &Arc<Self>, message: &str) {
        self.state
            .send_modify(|state| state.banner = Some(message.to_string()));

        let inner: Weak<Inner> = Arc::downgrade(self);
        self.banner_timer
            .replace(TaskHandle::after(self.config.banner_timeout, async move {
                if let Some(inner) = inner.upgrade() {
                    inner.state.send_modify(|state| state.banner = None);
                }
            }));
    }

    fn clear_banner(&self) {
        self.banner_timer.clear();
        self.state.send_if_modified(|state| state.banner.take().is_some());
    }

    async fn refresh_balance(self: &Arc<Self>) -> Result<String, Error> {
        match self.connector.balance().await {
            Ok(response) => {
                tracing::debug!("Relay balance: {}", response.balance);
                self.state.send_modify(|state| {
                    state.balance = BalanceDisplay::Value(response.balance.clone())
                });
                self.clear_banner();
                Ok(response.balance)
            }
            Err(err) => {
                tracing::warn!("Could not fetch relay balance: {}", err);
                self.state
                    .send_modify(|state| state.balance = BalanceDisplay::Error);
                self.show_banner(BALANCE_FAILED_MESSAGE);
                Err(err)
            }
        }
    }
}

impl DeployView {
    /// Create new [`DeployView`]
    pub fn new(
        connector: Arc<dyn RelayConnector + Send + Sync>,
        config: DeployViewConfig,
        store: EscrowStore,
    ) -> Self {
        let (state, _) = watch::channel(DeployState::default());

        Self {
            inner: Arc::new(Inner {
                connector,
                store,
                config,
                state,
                banner_timer: TaskSlot::new(),
            }),
            refresh: TaskSlot::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> DeployState {
        self.inner.state.borrow().clone()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<DeployState> {
        self.inner.state.subscribe()
    }

    /// Show the stored contract, fetch the balance and keep refreshing it
    ///
    /// Restarting replaces the previous refresh task.
    pub async fn start(&self) {
        if let Some(contract) = self.inner.store.get() {
            self.inner
                .state
                .send_modify(|state| state.contract = Some(contract));
        }

        // Failure is already shown in the banner
        let _ = self.inner.refresh_balance().await;

        let inner = Arc::downgrade(&self.inner);
        self.refresh
            .replace(TaskHandle::every(self.inner.config.balance_refresh, move || {
                let inner = inner.clone();
                async move {
                    if let Some(inner) = inner.upgrade() {
                        // Failure is already shown in the banner
                        let _ = inner.refresh_balance().await;
                    }
                }
            }));
    }

    /// Stop refreshing the balance
    pub fn stop(&self) {
        self.refresh.clear();
    }

    /// Fetch the relay wallet balance
    pub async fn refresh_balance(&self) -> Result<String, Error> {
        self.inner.refresh_balance().await
    }

    /// Deploy an escrow contract holding `amount`
    pub async fn deploy(&self, amount: &str) -> Result<String, Error> {
        let amount = match parse_amount(amount) {
            Ok(amount) => amount,
            Err(err) => {
                self.inner.show_banner(INVALID_AMOUNT_MESSAGE);
                return Err(err);
            }
        };

        let mut started = false;
        self.inner.state.send_if_modified(|state| {
            if state.deploying {
                return false;
            }
            state.deploying = true;
            started = true;
            true
        });

        if !started {
            return Err(Error::DeployInProgress);
        }

        let _deploying = DeployingGuard {
            state: &self.inner.state,
        };

        tracing::info!("Deploying escrow for {}", amount);

        let contract = match self
            .inner
            .connector
            .deploy_escrow(DeployEscrowRequest { amount })
            .await
        {
            Ok(response) => response.contract_address,
            Err(err) => {
                tracing::error!("Could not deploy escrow: {}", err);
                self.inner.show_banner(DEPLOY_FAILED_MESSAGE);
                return Err(err);
            }
        };

        tracing::info!("Escrow deployed at {}", contract);

        self.inner.store.save(&contract);
        self.inner
            .state
            .send_modify(|state| state.contract = Some(contract.clone()));
        self.inner.clear_banner();

        // Contract is deployed either way; a balance failure is already shown in the banner
        let _ = self.inner.refresh_balance().await;

        Ok(contract)
    }
}
