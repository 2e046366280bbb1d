use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use config::{Config, ConfigError, File};
use escrow_http_client::HttpClient;
use escrow_relay::view::{DeployViewConfig, PaymentViewConfig, ViewLabels};
use escrow_relay::{Backoff, HttpRelayClient, PollPolicy};
use serde::{Deserialize, Serialize};
use url::Url;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Payment relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relay {
    pub url: String,
    /// Escrow contract whose deposit address is shown
    pub contract: Option<String>,
    pub timeout_secs: Option<u64>,
    pub proxy: Option<String>,
    /// Only hosts matching this pattern go through the proxy
    pub proxy_hosts: Option<String>,
    pub accept_invalid_certs: bool,
}

impl Default for Relay {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".to_string(),
            contract: None,
            timeout_secs: None,
            proxy: None,
            proxy_hosts: None,
            accept_invalid_certs: false,
        }
    }
}

/// Escrow deployment relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deploy {
    pub url: String,
    pub balance_refresh_ms: u64,
    pub banner_timeout_ms: u64,
}

impl Default for Deploy {
    fn default() -> Self {
        let view = DeployViewConfig::default();

        Self {
            url: "http://localhost:4000".to_string(),
            balance_refresh_ms: view.balance_refresh.as_millis() as u64,
            banner_timeout_ms: view.banner_timeout.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    #[default]
    Fixed,
    Exponential,
}

impl FromStr for BackoffKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(BackoffKind::Fixed),
            "exponential" => Ok(BackoffKind::Exponential),
            _ => Err(format!("Unknown backoff: {s}")),
        }
    }
}

/// Job status polling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Poll {
    pub interval_ms: u64,
    pub backoff: BackoffKind,
    pub backoff_factor: u32,
    pub max_interval_ms: u64,
    pub max_attempts: u32,
    pub deadline_secs: Option<u64>,
}

impl Default for Poll {
    fn default() -> Self {
        let policy = PollPolicy::default();

        Self {
            interval_ms: policy.interval.as_millis() as u64,
            backoff: BackoffKind::Fixed,
            backoff_factor: 2,
            max_interval_ms: 30_000,
            max_attempts: policy.max_attempts,
            deadline_secs: None,
        }
    }
}

/// Payment view texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub submit: String,
    pub creating_job: String,
    pub waiting: String,
    pub error_prefix: String,
    pub success: String,
}

impl Default for Labels {
    fn default() -> Self {
        ViewLabels::default().into()
    }
}

impl From<ViewLabels> for Labels {
    fn from(labels: ViewLabels) -> Self {
        Self {
            submit: labels.submit,
            creating_job: labels.creating_job,
            waiting: labels.waiting,
            error_prefix: labels.error_prefix,
            success: labels.success,
        }
    }
}

impl From<Labels> for ViewLabels {
    fn from(labels: Labels) -> Self {
        Self {
            submit: labels.submit,
            creating_job: labels.creating_job,
            waiting: labels.waiting,
            error_prefix: labels.error_prefix,
            success: labels.success,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub relay: Relay,
    pub deploy: Deploy,
    pub poll: Poll,
    pub labels: Labels,
}

impl Settings {
    /// Defaults, overridden by the config file
    ///
    /// An explicitly given file must exist; the file in the work directory is optional.
    pub fn new(work_dir: &Path, config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let default_settings = Self::default();

        let (path, required): (PathBuf, bool) = match config_file {
            Some(path) => (path.to_path_buf(), true),
            None => (work_dir.join(CONFIG_FILE_NAME), false),
        };

        let config: Config = Config::builder()
            // use defaults
            .add_source(Config::try_from(&default_settings)?)
            // override with file contents
            .add_source(File::from(path).required(required))
            .build()?;

        config.try_deserialize()
    }

    pub fn payment_view_config(&self) -> PaymentViewConfig {
        PaymentViewConfig {
            contract: self.relay.contract.clone(),
            poll: self.poll.policy(),
            labels: self.labels.clone().into(),
        }
    }

    pub fn deploy_view_config(&self) -> DeployViewConfig {
        DeployViewConfig {
            balance_refresh: Duration::from_millis(self.deploy.balance_refresh_ms),
            banner_timeout: Duration::from_millis(self.deploy.banner_timeout_ms),
        }
    }
}

impl Poll {
    pub fn policy(&self) -> PollPolicy {
        let backoff = match self.backoff {
            BackoffKind::Fixed => Backoff::Fixed,
            BackoffKind::Exponential => Backoff::Exponential {
                factor: self.backoff_factor,
                max_interval: Duration::from_millis(self.max_interval_ms),
            },
        };

        PollPolicy {
            interval: Duration::from_millis(self.interval_ms),
            backoff,
            max_attempts: self.max_attempts,
            deadline: self.deadline_secs.map(Duration::from_secs),
        }
    }
}

impl Relay {
    /// Connector for this relay
    pub fn client(&self) -> Result<HttpRelayClient> {
        relay_client(
            &self.url,
            self.timeout_secs,
            self.proxy.as_deref(),
            self.proxy_hosts.as_deref(),
            self.accept_invalid_certs,
        )
    }
}

impl Deploy {
    /// Connector for this relay, sharing the transport settings of `relay`
    pub fn client(&self, relay: &Relay) -> Result<HttpRelayClient> {
        relay_client(
            &self.url,
            relay.timeout_secs,
            relay.proxy.as_deref(),
            relay.proxy_hosts.as_deref(),
            relay.accept_invalid_certs,
        )
    }
}

fn relay_client(
    url: &str,
    timeout_secs: Option<u64>,
    proxy: Option<&str>,
    proxy_hosts: Option<&str>,
    accept_invalid_certs: bool,
) -> Result<HttpRelayClient> {
    let base_url = Url::from_str(url)?;

    let mut builder = HttpClient::builder().danger_accept_invalid_certs(accept_invalid_certs);

    if let Some(timeout) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(timeout));
    }

    if let Some(proxy) = proxy {
        let proxy = Url::from_str(proxy)?;
        builder = match proxy_hosts {
            Some(pattern) => builder.proxy_with_matcher(proxy, pattern)?,
            None => builder.proxy(proxy),
        };
    }

    Ok(HttpRelayClient::with_client(base_url, builder.build()?))
}
