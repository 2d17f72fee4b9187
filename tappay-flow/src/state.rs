//! Flow states and the records they carry
//!
//! The controller holds exactly one [`FlowState`]; each variant carries
//! only the data that is meaningful at that step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tappay_codec::{Address, PaymentIntent};

use crate::MerchantOrder;

/// Payload-free name of a flow step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    /// Choosing an agent offering
    AgentSelect,
    /// Waiting for a tag
    Scan,
    /// Entering payment details
    Payment,
    /// Transfer outstanding at the wallet
    Confirm,
    /// Transfer confirmed
    Success,
}

impl FlowStep {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStep::AgentSelect => "agent_select",
            FlowStep::Scan => "scan",
            FlowStep::Payment => "payment",
            FlowStep::Confirm => "confirm",
            FlowStep::Success => "success",
        }
    }
}

impl std::fmt::Display for FlowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intent and order held while paying
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub intent: PaymentIntent,
    pub order: MerchantOrder,
    /// Message from the last failed transfer, if any
    pub last_error: Option<String>,
}

/// Everything kept after a confirmed transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub intent: PaymentIntent,
    pub order: MerchantOrder,
    pub outcome: TransactionOutcome,
}

/// Current state of the payment flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    AgentSelect,
    Scan,
    Payment(Checkout),
    Confirm(Checkout),
    Success(Receipt),
}

impl FlowState {
    /// The step this state belongs to
    pub fn step(&self) -> FlowStep {
        match self {
            FlowState::AgentSelect => FlowStep::AgentSelect,
            FlowState::Scan => FlowStep::Scan,
            FlowState::Payment(_) => FlowStep::Payment,
            FlowState::Confirm(_) => FlowStep::Confirm,
            FlowState::Success(_) => FlowStep::Success,
        }
    }

    /// The intent being paid, if any
    pub fn intent(&self) -> Option<&PaymentIntent> {
        match self {
            FlowState::Payment(c) | FlowState::Confirm(c) => Some(&c.intent),
            FlowState::Success(r) => Some(&r.intent),
            _ => None,
        }
    }

    /// The merchant order, if any
    pub fn order(&self) -> Option<&MerchantOrder> {
        match self {
            FlowState::Payment(c) | FlowState::Confirm(c) => Some(&c.order),
            FlowState::Success(r) => Some(&r.order),
            _ => None,
        }
    }

    /// The transaction outcome once confirmed
    pub fn outcome(&self) -> Option<&TransactionOutcome> {
        match self {
            FlowState::Success(r) => Some(&r.outcome),
            _ => None,
        }
    }
}

/// On-chain status of a submitted transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

/// Result of one completed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutcome {
    pub transaction_hash: String,
    pub status: TxStatus,
    pub timestamp: DateTime<Utc>,
    /// Explorer page for the transaction
    pub explorer_url: String,
}

/// How the customer's tag relates to the connected wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No wallet connected
    Disconnected,
    /// A wallet is connected and there is no customer to compare with
    Connected(Address),
    /// The connected wallet is the customer's
    Matches,
    /// A different wallet is connected
    Different(Address),
}
