//! External wallet capability
//!
//! Signing, broadcasting and chain management all happen in the wallet;
//! the flow only asks.

use async_trait::async_trait;
use tappay_codec::Address;

use crate::network::ChainParameters;
use crate::WalletError;

/// Native-currency transfer handed to the wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Active account paying
    pub from: Address,
    /// Merchant receiving
    pub to: Address,
    /// Value in the smallest unit
    pub value: u128,
    /// Target chain
    pub chain_id: u64,
}

/// A connected signing wallet
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Currently connected account
    async fn active_account(&self) -> Option<Address>;

    /// Chain the wallet is currently on
    async fn active_chain(&self) -> Option<u64>;

    /// Ask the wallet to switch chains
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;

    /// Ask the wallet to add (and select) a chain it does not know
    async fn add_chain(&self, params: &ChainParameters) -> Result<(), WalletError>;

    /// Submit a native transfer; returns the transaction hash
    async fn send_transfer(&self, request: &TransferRequest) -> Result<String, WalletError>;
}
