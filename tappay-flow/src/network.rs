//! Static network registry
//!
//! A fixed table of the chains the terminal can take payments on. Every
//! entry uses an 18-decimal native currency.

use serde::Serialize;

/// Decimal exponent of every registered native currency
pub const NATIVE_DECIMALS: u8 = 18;

/// Network selected when configuration names none
pub const DEFAULT_NETWORK: &str = "sepolia";

/// Chain details for one registry entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Registry key used in tags and URLs
    pub key: &'static str,
    /// EVM chain id
    pub chain_id: u64,
    /// Display name
    pub name: &'static str,
    /// Native currency ticker
    pub currency_symbol: &'static str,
    /// Native currency display name
    pub currency_name: &'static str,
    /// Public RPC endpoints
    pub rpc_urls: &'static [&'static str],
    /// Block explorer base URL, without trailing slash
    pub explorer_url: &'static str,
    /// Whether this is a test network
    pub is_testnet: bool,
}

/// Every network the terminal knows about
pub static NETWORKS: &[NetworkConfig] = &[
    NetworkConfig {
        key: "sepolia",
        chain_id: 11_155_111,
        name: "Sepolia",
        currency_symbol: "ETH",
        currency_name: "Sepolia Ether",
        rpc_urls: &["https://ethereum-sepolia-rpc.publicnode.com", "https://rpc.sepolia.org"],
        explorer_url: "https://sepolia.etherscan.io",
        is_testnet: true,
    },
    NetworkConfig {
        key: "base-sepolia",
        chain_id: 84_532,
        name: "Base Sepolia",
        currency_symbol: "ETH",
        currency_name: "Sepolia Ether",
        rpc_urls: &["https://sepolia.base.org"],
        explorer_url: "https://sepolia.basescan.org",
        is_testnet: true,
    },
    NetworkConfig {
        key: "polygon-amoy",
        chain_id: 80_002,
        name: "Polygon Amoy",
        currency_symbol: "POL",
        currency_name: "POL",
        rpc_urls: &["https://rpc-amoy.polygon.technology"],
        explorer_url: "https://amoy.polygonscan.com",
        is_testnet: true,
    },
    NetworkConfig {
        key: "ethereum",
        chain_id: 1,
        name: "Ethereum",
        currency_symbol: "ETH",
        currency_name: "Ether",
        rpc_urls: &["https://ethereum-rpc.publicnode.com"],
        explorer_url: "https://etherscan.io",
        is_testnet: false,
    },
];

/// Look up a network by registry key
pub fn network(key: &str) -> Option<&'static NetworkConfig> {
    NETWORKS.iter().find(|n| n.key == key)
}

/// Look up a network by chain id
pub fn network_by_chain_id(chain_id: u64) -> Option<&'static NetworkConfig> {
    NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

impl NetworkConfig {
    /// Number of decimals of the native currency
    pub fn decimals(&self) -> u8 {
        NATIVE_DECIMALS
    }

    /// Explorer page for a transaction hash
    pub fn tx_url(&self, hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, hash)
    }

    /// Parameters for a wallet add-chain request
    pub fn chain_parameters(&self) -> ChainParameters {
        ChainParameters {
            chain_id: format!("0x{:x}", self.chain_id),
            chain_name: self.name.to_string(),
            native_currency: NativeCurrency {
                name: self.currency_name.to_string(),
                symbol: self.currency_symbol.to_string(),
                decimals: NATIVE_DECIMALS,
            },
            rpc_urls: self.rpc_urls.iter().map(|s| s.to_string()).collect(),
            block_explorer_urls: vec![self.explorer_url.to_string()],
        }
    }
}

impl std::fmt::Display for NetworkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}

/// Add-chain request body, using the wallet RPC field names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainParameters {
    /// Chain id as a 0x-prefixed hex string
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

/// Native currency descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}
