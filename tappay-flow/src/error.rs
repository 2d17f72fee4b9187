//! Error types for the payment flow

use tappay_codec::DecodeError;
use thiserror::Error;

use crate::state::FlowStep;

/// Result type for flow operations
pub type FlowResult<T> = Result<T, FlowError>;

/// Bad operator input or an action taken at the wrong step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No amount was entered
    #[error("Enter an amount")]
    MissingAmount,

    /// The amount is not a plain decimal number
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The amount is zero, or rounds down to zero
    #[error("Amount must be greater than 0")]
    NonPositiveAmount,

    /// The amount does not fit the smallest-unit range
    #[error("Amount too large")]
    AmountOverflow,

    /// No wallet is connected
    #[error("Connect a wallet first")]
    WalletNotConnected,

    /// Operator-entered address failed validation
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// No agent offering with this id
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// The action is not available at the current step
    #[error("Not available while {actual} (needs {expected})")]
    WrongStep {
        expected: FlowStep,
        actual: FlowStep,
    },
}

/// Failures from the tag reader/writer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HardwareError {
    /// No NFC hardware, or the platform does not expose it
    #[error("NFC hardware unavailable")]
    Unavailable,

    /// A read was started but failed
    #[error("Tag read failed: {0}")]
    Read(String),

    /// A write was started but failed
    #[error("Tag write failed: {0}")]
    Write(String),
}

/// Errors reported by the external wallet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// No account is connected
    #[error("Wallet not connected")]
    NotConnected,

    /// The wallet does not know the chain
    #[error("Wallet does not recognise chain {0}")]
    UnrecognizedChain(u64),

    /// The user rejected the request
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Any other provider failure
    #[error("Wallet provider error: {0}")]
    Provider(String),
}

/// Writing an intent to a tag failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// There is no writable tag hardware
    #[error("NFC hardware unavailable")]
    NoHardware,

    /// The customer address failed validation
    #[error("Invalid customer address: {0}")]
    InvalidAddress(String),

    /// The device reported a write failure
    #[error("Tag write failed: {0}")]
    DeviceWriteFailed(String),
}

impl From<HardwareError> for WriteError {
    fn from(e: HardwareError) -> Self {
        match e {
            HardwareError::Unavailable => WriteError::NoHardware,
            HardwareError::Read(msg) | HardwareError::Write(msg) => WriteError::DeviceWriteFailed(msg),
        }
    }
}

/// The external transfer did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The wallet returned an error
    #[error("Transaction failed: {0}")]
    Wallet(#[from] WalletError),

    /// A result arrived while no transfer was outstanding
    #[error("No transfer is pending")]
    NoPendingTransfer,
}

/// Switching networks failed; the selection is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkSwitchError {
    /// Not in the network registry
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    /// The wallet refused or failed the switch/add request
    #[error("Network switch failed: {0}")]
    Wallet(#[from] WalletError),
}

/// Any error surfaced by the flow controller.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Hardware(#[from] HardwareError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    NetworkSwitch(#[from] NetworkSwitchError),

    /// Configuration names a network missing from the registry
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
}
