//! Environment variables
//!
//! Every setting of the config file can be overridden with an `ESCROW_*`
//! variable; these take precedence over the file.

use std::env;

use anyhow::{anyhow, Result};

use crate::config::{BackoffKind, Deploy, Poll, Relay, Settings};

pub const ENV_RELAY_URL: &str = "ESCROW_RELAY_URL";
pub const ENV_RELAY_CONTRACT: &str = "ESCROW_RELAY_CONTRACT";
pub const ENV_RELAY_TIMEOUT_SECS: &str = "ESCROW_RELAY_TIMEOUT_SECS";
pub const ENV_RELAY_PROXY: &str = "ESCROW_RELAY_PROXY";
pub const ENV_RELAY_PROXY_HOSTS: &str = "ESCROW_RELAY_PROXY_HOSTS";
pub const ENV_RELAY_ACCEPT_INVALID_CERTS: &str = "ESCROW_RELAY_ACCEPT_INVALID_CERTS";

pub const ENV_DEPLOY_URL: &str = "ESCROW_DEPLOY_URL";
pub const ENV_DEPLOY_BALANCE_REFRESH_MS: &str = "ESCROW_DEPLOY_BALANCE_REFRESH_MS";
pub const ENV_DEPLOY_BANNER_TIMEOUT_MS: &str = "ESCROW_DEPLOY_BANNER_TIMEOUT_MS";

pub const ENV_POLL_INTERVAL_MS: &str = "ESCROW_POLL_INTERVAL_MS";
pub const ENV_POLL_BACKOFF: &str = "ESCROW_POLL_BACKOFF";
pub const ENV_POLL_BACKOFF_FACTOR: &str = "ESCROW_POLL_BACKOFF_FACTOR";
pub const ENV_POLL_MAX_INTERVAL_MS: &str = "ESCROW_POLL_MAX_INTERVAL_MS";
pub const ENV_POLL_MAX_ATTEMPTS: &str = "ESCROW_POLL_MAX_ATTEMPTS";
pub const ENV_POLL_DEADLINE_SECS: &str = "ESCROW_POLL_DEADLINE_SECS";

impl Settings {
    pub fn from_env(mut self) -> Result<Self> {
        self.relay = self.relay.from_env();
        self.deploy = self.deploy.from_env();
        self.poll = self.poll.from_env()?;

        Ok(self)
    }
}

impl Relay {
    pub fn from_env(mut self) -> Self {
        if let Ok(url) = env::var(ENV_RELAY_URL) {
            self.url = url;
        }

        if let Ok(contract) = env::var(ENV_RELAY_CONTRACT) {
            self.contract = Some(contract);
        }

        if let Ok(timeout_str) = env::var(ENV_RELAY_TIMEOUT_SECS) {
            if let Ok(timeout) = timeout_str.parse() {
                self.timeout_secs = Some(timeout);
            }
        }

        if let Ok(proxy) = env::var(ENV_RELAY_PROXY) {
            self.proxy = Some(proxy);
        }

        if let Ok(pattern) = env::var(ENV_RELAY_PROXY_HOSTS) {
            self.proxy_hosts = Some(pattern);
        }

        if let Ok(accept_str) = env::var(ENV_RELAY_ACCEPT_INVALID_CERTS) {
            if let Ok(accept) = accept_str.parse() {
                self.accept_invalid_certs = accept;
            }
        }

        self
    }
}

impl Deploy {
    pub fn from_env(mut self) -> Self {
        if let Ok(url) = env::var(ENV_DEPLOY_URL) {
            self.url = url;
        }

        if let Ok(refresh_str) = env::var(ENV_DEPLOY_BALANCE_REFRESH_MS) {
            if let Ok(refresh) = refresh_str.parse() {
                self.balance_refresh_ms = refresh;
            }
        }

        if let Ok(timeout_str) = env::var(ENV_DEPLOY_BANNER_TIMEOUT_MS) {
            if let Ok(timeout) = timeout_str.parse() {
                self.banner_timeout_ms = timeout;
            }
        }

        self
    }
}

impl Poll {
    pub fn from_env(mut self) -> Result<Self> {
        if let Ok(interval_str) = env::var(ENV_POLL_INTERVAL_MS) {
            if let Ok(interval) = interval_str.parse() {
                self.interval_ms = interval;
            }
        }

        if let Ok(backoff) = env::var(ENV_POLL_BACKOFF) {
            self.backoff = backoff.parse::<BackoffKind>().map_err(|err| anyhow!(err))?;
        }

        if let Ok(factor_str) = env::var(ENV_POLL_BACKOFF_FACTOR) {
            if let Ok(factor) = factor_str.parse() {
                self.backoff_factor = factor;
            }
        }

        if let Ok(max_interval_str) = env::var(ENV_POLL_MAX_INTERVAL_MS) {
            if let Ok(max_interval) = max_interval_str.parse() {
                self.max_interval_ms = max_interval;
            }
        }

        if let Ok(attempts_str) = env::var(ENV_POLL_MAX_ATTEMPTS) {
            if let Ok(attempts) = attempts_str.parse() {
                self.max_attempts = attempts;
            }
        }

        if let Ok(deadline_str) = env::var(ENV_POLL_DEADLINE_SECS) {
            if let Ok(deadline) = deadline_str.parse() {
                self.deadline_secs = Some(deadline);
            }
        }

        Ok(self)
    }
}
