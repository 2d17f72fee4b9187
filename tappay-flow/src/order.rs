//! Merchant order entered at the terminal

use serde::{Deserialize, Serialize};
use tappay_codec::Address;

/// Terminal-local order details, edited by the operator during payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantOrder {
    /// Merchant display name
    pub name: String,
    /// Transfer destination
    pub address: Address,
    /// Ticker of the network's native currency
    pub currency: String,
    /// Decimal amount as typed; may be empty while editing
    pub amount: String,
    /// Free-text order reference
    pub order_id: Option<String>,
}

impl MerchantOrder {
    /// Create an empty order
    pub fn new(name: impl Into<String>, address: Address, currency: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address,
            currency: currency.into(),
            amount: String::new(),
            order_id: None,
        }
    }

    /// Whether an amount has been typed
    pub fn has_amount(&self) -> bool {
        !self.amount.trim().is_empty()
    }
}
