//! Payment intents and the terminal defaults used to resolve them

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Address, DecodeError, DEFAULT_PROTOCOL};

/// Terminal-side defaults applied to intents that omit optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalProfile {
    /// The terminal's own origin and path; encoded URLs are built on it
    pub origin: Url,
    /// Merchant address used when a tag names none
    pub merchant_address: Address,
    /// Network key used when a tag names none
    pub network_key: String,
}

impl TerminalProfile {
    /// Create a new profile
    pub fn new(origin: Url, merchant_address: Address, network_key: impl Into<String>) -> Self {
        Self {
            origin,
            merchant_address,
            network_key: network_key.into(),
        }
    }
}

/// Decoded customer/merchant/network information carried by a tag or URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    /// The paying customer's wallet
    pub customer_wallet: Address,
    /// Destination of the transfer
    pub merchant_address: Address,
    /// Payment protocol label
    pub protocol: String,
    /// Key into the terminal's network registry
    pub network_key: String,
    /// Priced service offering, agent-payment terminals only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    /// Merchant order reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl PaymentIntent {
    /// Start building an intent for `customer_wallet`
    pub fn builder(customer_wallet: Address) -> PaymentIntentBuilder {
        PaymentIntentBuilder::new(customer_wallet)
    }
}

/// Builder for [`PaymentIntent`]; absent fields resolve against a
/// [`TerminalProfile`].
#[derive(Debug, Clone)]
pub struct PaymentIntentBuilder {
    customer_wallet: Address,
    merchant_address: Option<Address>,
    protocol: Option<String>,
    network_key: Option<String>,
    agent_id: Option<String>,
    order_id: Option<String>,
}

impl PaymentIntentBuilder {
    /// Create a builder with the only required field
    pub fn new(customer_wallet: Address) -> Self {
        Self {
            customer_wallet,
            merchant_address: None,
            protocol: None,
            network_key: None,
            agent_id: None,
            order_id: None,
        }
    }

    /// Set the merchant address
    pub fn merchant(mut self, address: Address) -> Self {
        self.merchant_address = Some(address);
        self
    }

    /// Set the protocol label
    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Set the network key
    pub fn network(mut self, key: impl Into<String>) -> Self {
        self.network_key = Some(key.into());
        self
    }

    /// Set the agent offering id
    pub fn agent_id(mut self, id: impl Into<String>) -> Self {
        self.agent_id = Some(id.into());
        self
    }

    /// Set the order id
    pub fn order_id(mut self, id: impl Into<String>) -> Self {
        self.order_id = Some(id.into());
        self
    }

    /// Resolve absent fields against `profile`
    pub fn build(self, profile: &TerminalProfile) -> PaymentIntent {
        PaymentIntent {
            customer_wallet: self.customer_wallet,
            merchant_address: self
                .merchant_address
                .unwrap_or_else(|| profile.merchant_address.clone()),
            protocol: self.protocol.unwrap_or_else(|| DEFAULT_PROTOCOL.to_string()),
            network_key: self
                .network_key
                .unwrap_or_else(|| profile.network_key.clone()),
            agent_id: self.agent_id,
            order_id: self.order_id,
        }
    }
}

/// Intent fields as read off the wire, before validation and defaults.
#[derive(Debug, Default)]
pub(crate) struct RawIntent {
    pub wallet: Option<String>,
    pub merchant: Option<String>,
    pub protocol: Option<String>,
    pub network: Option<String>,
    pub agent_id: Option<String>,
    pub order_id: Option<String>,
}

impl RawIntent {
    /// Validate addresses and fill defaults. A missing wallet is reported
    /// before anything else, so callers never see a partial intent.
    pub fn resolve(self, profile: &TerminalProfile) -> Result<PaymentIntent, DecodeError> {
        let wallet: Address = self.wallet.ok_or(DecodeError::MissingWallet)?.parse()?;

        let mut builder = PaymentIntent::builder(wallet);
        if let Some(merchant) = self.merchant {
            builder = builder.merchant(merchant.parse()?);
        }
        if let Some(protocol) = self.protocol {
            builder = builder.protocol(protocol);
        }
        if let Some(network) = self.network {
            builder = builder.network(network);
        }
        if let Some(agent_id) = self.agent_id {
            builder = builder.agent_id(agent_id);
        }
        if let Some(order_id) = self.order_id {
            builder = builder.order_id(order_id);
        }

        Ok(builder.build(profile))
    }
}
