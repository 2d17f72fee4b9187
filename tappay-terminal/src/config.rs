//! Terminal configuration.
//!
//! Values come from `TAPPAY_*` environment variables (a `.env` file is
//! loaded first), with command-line flags taking precedence.

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use tappay_flow::{
    default_catalog, network, Address, FlowConfig, NetworkConfig, TerminalProfile,
    DEFAULT_NETWORK,
};
use url::Url;

pub const ENV_MERCHANT_ADDRESS: &str = "TAPPAY_MERCHANT_ADDRESS";
pub const ENV_MERCHANT_NAME: &str = "TAPPAY_MERCHANT_NAME";
pub const ENV_ORIGIN: &str = "TAPPAY_ORIGIN";
pub const ENV_NETWORK: &str = "TAPPAY_NETWORK";
pub const ENV_AGENT_MODE: &str = "TAPPAY_AGENT_MODE";
pub const ENV_DEMO_DELAY_MS: &str = "TAPPAY_DEMO_DELAY_MS";

pub const DEFAULT_MERCHANT_NAME: &str = "Tap Merchant";
pub const DEFAULT_ORIGIN: &str = "https://tappay.local/terminal";
const DEFAULT_DEMO_DELAY_MS: u64 = 1500;

/// Flags overriding the environment.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// Merchant wallet receiving payments.
    #[arg(long, global = true)]
    pub merchant: Option<String>,
    /// Merchant display name.
    #[arg(long, global = true)]
    pub merchant_name: Option<String>,
    /// Terminal URL written into tags.
    #[arg(long, global = true)]
    pub origin: Option<String>,
    /// Network key to start on.
    #[arg(long, global = true)]
    pub network: Option<String>,
    /// Run the agent-payment variant.
    #[arg(long, global = true)]
    pub agent_mode: bool,
    /// Delay before the simulated demo tag arrives.
    #[arg(long, global = true)]
    pub demo_delay_ms: Option<u64>,
}

impl ConfigArgs {
    /// The flag value standing in for environment variable `key`.
    pub fn lookup(&self, key: &str) -> Option<String> {
        match key {
            ENV_MERCHANT_ADDRESS => self.merchant.clone(),
            ENV_MERCHANT_NAME => self.merchant_name.clone(),
            ENV_ORIGIN => self.origin.clone(),
            ENV_NETWORK => self.network.clone(),
            ENV_AGENT_MODE => self.agent_mode.then(|| "true".to_string()),
            ENV_DEMO_DELAY_MS => self.demo_delay_ms.map(|ms| ms.to_string()),
            _ => None,
        }
    }

    /// Flag first, then the process environment.
    pub fn resolve(&self, key: &str) -> Option<String> {
        self.lookup(key).or_else(|| env::var(key).ok())
    }
}

/// Terminal configuration.
#[derive(Clone, Debug)]
pub struct TerminalConfig {
    /// Merchant wallet receiving payments.
    pub merchant_address: Address,
    /// Merchant display name.
    pub merchant_name: String,
    /// Terminal URL written into tags.
    pub origin: Url,
    /// Network the terminal starts on.
    pub network_key: String,
    /// Agent-payment variant.
    pub agent_mode: bool,
    /// Delay before the simulated demo tag arrives.
    pub demo_delay: Duration,
}

impl TerminalConfig {
    /// Load configuration from flags and environment variables.
    pub fn load(args: &ConfigArgs) -> Result<Self> {
        Self::from_lookup(|key| args.resolve(key))
    }

    /// Load configuration through `lookup`, which maps variable names to values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let merchant_address: Address = lookup(ENV_MERCHANT_ADDRESS)
            .with_context(|| format!("{} must be set", ENV_MERCHANT_ADDRESS))?
            .trim()
            .parse()
            .with_context(|| format!("{} is not a wallet address", ENV_MERCHANT_ADDRESS))?;

        let merchant_name =
            lookup(ENV_MERCHANT_NAME).unwrap_or_else(|| DEFAULT_MERCHANT_NAME.to_string());

        let origin = lookup(ENV_ORIGIN).unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        let origin = Url::parse(&origin)
            .with_context(|| format!("{} is not a valid URL: {}", ENV_ORIGIN, origin))?;

        let network_key = lookup(ENV_NETWORK).unwrap_or_else(|| DEFAULT_NETWORK.to_string());
        if network(&network_key).is_none() {
            bail!("{} names unknown network {}", ENV_NETWORK, network_key);
        }

        let agent_mode = match lookup(ENV_AGENT_MODE) {
            Some(value) => parse_flag(&value)
                .with_context(|| format!("{} must be true or false", ENV_AGENT_MODE))?,
            None => false,
        };

        let demo_delay_ms: u64 = lookup(ENV_DEMO_DELAY_MS)
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_DEMO_DELAY_MS);

        Ok(Self {
            merchant_address,
            merchant_name,
            origin,
            network_key,
            agent_mode,
            demo_delay: Duration::from_millis(demo_delay_ms),
        })
    }

    /// The starting network's registry entry.
    pub fn network(&self) -> Result<&'static NetworkConfig> {
        network(&self.network_key).with_context(|| format!("unknown network {}", self.network_key))
    }

    /// Defaults applied to intents read at this terminal.
    pub fn profile(&self) -> TerminalProfile {
        TerminalProfile::new(
            self.origin.clone(),
            self.merchant_address.clone(),
            self.network_key.clone(),
        )
    }

    /// Controller settings.
    pub fn flow_config(&self) -> FlowConfig {
        let config = FlowConfig::new(
            self.merchant_name.clone(),
            self.merchant_address.clone(),
            self.origin.clone(),
        )
        .network(self.network_key.clone());

        if self.agent_mode {
            config.agent_mode(default_catalog())
        } else {
            config
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
