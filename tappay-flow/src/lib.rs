//! # Tap-to-pay flow
//!
//! The merchant-terminal side of an NFC payment: a customer presents a tag
//! naming their wallet, the operator enters an amount, and the customer's
//! wallet sends the network's native currency to the merchant.
//!
//! [`PaymentFlow`] drives the whole exchange. Tag hardware and the wallet
//! are reached through the [`TagSource`] and [`Wallet`] traits so the flow
//! runs the same against real devices, the in-memory doubles in `sim`
//! (feature `simulation`), or anything else.
//!
//! ## Modules
//!
//! - `network`: supported chains and their wallet parameters
//! - `amount`: decimal amounts to smallest-unit integers
//! - `agent`: priced offerings for agent mode
//! - `state`: flow states and transaction outcomes
//! - `controller`: the state machine

pub mod agent;
pub mod amount;
pub mod controller;
pub mod error;
pub mod network;
mod order;
pub mod state;
pub mod tag;
pub mod wallet;

#[cfg(any(test, feature = "simulation"))]
pub mod sim;

pub use agent::{default_catalog, find_offering, AgentOffering};
pub use amount::{format_amount, parse_amount, to_smallest_unit};
pub use controller::{FlowConfig, FlowMode, PaymentFlow};
pub use error::{
    FlowError, FlowResult, HardwareError, NetworkSwitchError, TransferError, ValidationError,
    WalletError, WriteError,
};
pub use network::{
    network, network_by_chain_id, ChainParameters, NativeCurrency, NetworkConfig,
    DEFAULT_NETWORK, NATIVE_DECIMALS, NETWORKS,
};
pub use order::MerchantOrder;
pub use state::{
    Checkout, ConnectionStatus, FlowState, FlowStep, Receipt, TransactionOutcome, TxStatus,
};
pub use tag::{TagReadEvent, TagReadStream, TagSource};
pub use wallet::{TransferRequest, Wallet};

/// Codec types the flow API exposes
pub use tappay_codec::{Address, EncodedTag, PaymentIntent, TagRecord, TerminalProfile};
