use alloy_primitives::Address;
use config::ContractConfig;
use serde::{Deserialize, Serialize};
use snapshot::RetryPolicy;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use validation::DEFAULT_SEPARATOR;

pub use config::UnitConvention;

/// Top-level controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// RPC endpoint url
    pub rpc_url: String,

    /// Token contract address
    pub token_address: Address,

    /// Compiled contract artifact to check the bindings against at startup
    #[serde(default)]
    pub abi_path: Option<PathBuf>,

    /// Seconds between snapshot refreshes
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Separator for address lists (airdrop recipients)
    #[serde(default = "default_list_separator")]
    pub list_separator: String,

    #[serde(default)]
    pub units: UnitConvention,

    #[serde(default)]
    pub retry: RetryConfig,

    /// Prometheus exporter port; no exporter when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

/// Retry schedule for snapshot reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub attempts: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            attempts: policy.attempts,
            base_delay_ms: policy.base_delay_ms,
            max_delay_ms: policy.max_delay.as_millis() as u64,
        }
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self {
            attempts: config.attempts,
            base_delay_ms: config.base_delay_ms,
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

const fn default_poll_interval_secs() -> u64 {
    15
}

fn default_list_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        self.contract().validate()?;

        if self.poll_interval_secs == 0 {
            eyre::bail!("poll_interval_secs must be at least 1");
        }
        if self.list_separator.is_empty() {
            eyre::bail!("list_separator must not be empty");
        }

        Ok(())
    }

    pub const fn contract(&self) -> ContractConfig {
        ContractConfig {
            token: self.token_address,
            units: self.units,
        }
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
