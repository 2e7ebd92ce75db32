//! Static chain metadata.
//!
//! Chains are identified by CAIP-2 strings (`eip155:<chain id>` for EVM
//! chains, `solana:<genesis hash prefix>` for Solana clusters), which is how
//! the universal wallet reports a user's origin chain.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Virtual-machine family of a chain. Decides which balance checks apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VmFamily {
    /// Ethereum-compatible chains.
    Evm,
    /// Solana clusters.
    Solana,
}

/// Chains known to the fee engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chain {
    /// Push Chain mainnet.
    PushMainnet,
    /// Push Chain Donut testnet.
    PushTestnetDonut,
    /// Push Chain local devnet.
    PushLocalnet,
    /// Ethereum mainnet.
    EthereumMainnet,
    /// Ethereum Sepolia testnet.
    EthereumSepolia,
    /// Arbitrum Sepolia testnet.
    ArbitrumSepolia,
    /// Base Sepolia testnet.
    BaseSepolia,
    /// BNB Smart Chain testnet.
    BnbTestnet,
    /// Solana mainnet-beta.
    SolanaMainnet,
    /// Solana testnet.
    SolanaTestnet,
    /// Solana devnet.
    SolanaDevnet,
}

/// Static metadata for a [`Chain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainMetadata {
    /// CAIP-2 identifier.
    pub caip2: &'static str,
    /// Human-readable name used in user-facing messages.
    pub name: &'static str,
    /// VM family.
    pub vm: VmFamily,
    /// Public RPC endpoint used when no override is configured.
    pub default_rpc: &'static str,
    /// Symbol of the chain's native asset.
    pub native_symbol: &'static str,
    /// Decimals of the chain's native asset.
    pub native_decimals: u8,
}

impl Chain {
    /// Every known chain.
    pub const ALL: [Self; 11] = [
        Self::PushMainnet,
        Self::PushTestnetDonut,
        Self::PushLocalnet,
        Self::EthereumMainnet,
        Self::EthereumSepolia,
        Self::ArbitrumSepolia,
        Self::BaseSepolia,
        Self::BnbTestnet,
        Self::SolanaMainnet,
        Self::SolanaTestnet,
        Self::SolanaDevnet,
    ];

    /// Metadata for this chain.
    #[must_use]
    pub const fn metadata(self) -> ChainMetadata {
        match self {
            Self::PushMainnet => ChainMetadata {
                caip2: "eip155:9",
                name: "Push Chain",
                vm: VmFamily::Evm,
                default_rpc: "https://evm.rpc.push.org",
                native_symbol: "PC",
                native_decimals: 18,
            },
            Self::PushTestnetDonut => ChainMetadata {
                caip2: "eip155:42101",
                name: "Push Chain Donut",
                vm: VmFamily::Evm,
                default_rpc: "https://evm.rpc-testnet-donut-node1.push.org",
                native_symbol: "PC",
                native_decimals: 18,
            },
            Self::PushLocalnet => ChainMetadata {
                caip2: "eip155:9001",
                name: "Push Chain Localnet",
                vm: VmFamily::Evm,
                default_rpc: "http://localhost:8545",
                native_symbol: "PC",
                native_decimals: 18,
            },
            Self::EthereumMainnet => ChainMetadata {
                caip2: "eip155:1",
                name: "Ethereum",
                vm: VmFamily::Evm,
                default_rpc: "https://eth.llamarpc.com",
                native_symbol: "ETH",
                native_decimals: 18,
            },
            Self::EthereumSepolia => ChainMetadata {
                caip2: "eip155:11155111",
                name: "Ethereum Sepolia",
                vm: VmFamily::Evm,
                default_rpc: "https://sepolia.gateway.tenderly.co",
                native_symbol: "ETH",
                native_decimals: 18,
            },
            Self::ArbitrumSepolia => ChainMetadata {
                caip2: "eip155:421614",
                name: "Arbitrum Sepolia",
                vm: VmFamily::Evm,
                default_rpc: "https://sepolia-rollup.arbitrum.io/rpc",
                native_symbol: "ETH",
                native_decimals: 18,
            },
            Self::BaseSepolia => ChainMetadata {
                caip2: "eip155:84532",
                name: "Base Sepolia",
                vm: VmFamily::Evm,
                default_rpc: "https://sepolia.base.org",
                native_symbol: "ETH",
                native_decimals: 18,
            },
            Self::BnbTestnet => ChainMetadata {
                caip2: "eip155:97",
                name: "BNB Testnet",
                vm: VmFamily::Evm,
                default_rpc: "https://bsc-testnet-rpc.publicnode.com",
                native_symbol: "BNB",
                native_decimals: 18,
            },
            Self::SolanaMainnet => ChainMetadata {
                caip2: "solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp",
                name: "Solana",
                vm: VmFamily::Solana,
                default_rpc: "https://api.mainnet-beta.solana.com",
                native_symbol: "SOL",
                native_decimals: 9,
            },
            Self::SolanaTestnet => ChainMetadata {
                caip2: "solana:4uhcVJyU9pJkvQyS88uRDiswHXSCkY3z",
                name: "Solana Testnet",
                vm: VmFamily::Solana,
                default_rpc: "https://api.testnet.solana.com",
                native_symbol: "SOL",
                native_decimals: 9,
            },
            Self::SolanaDevnet => ChainMetadata {
                caip2: "solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1",
                name: "Solana Devnet",
                vm: VmFamily::Solana,
                default_rpc: "https://api.devnet.solana.com",
                native_symbol: "SOL",
                native_decimals: 9,
            },
        }
    }

    /// Look a chain up by its CAIP-2 identifier.
    #[must_use]
    pub fn from_caip2(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL.into_iter().find(|chain| chain.metadata().caip2 == id)
    }

    /// CAIP-2 identifier.
    #[must_use]
    pub const fn caip2(self) -> &'static str {
        self.metadata().caip2
    }

    /// VM family.
    #[must_use]
    pub const fn vm(self) -> VmFamily {
        self.metadata().vm
    }

    /// Whether this is one of the Push Chain networks (the settlement chain).
    #[must_use]
    pub const fn is_push(self) -> bool {
        matches!(
            self,
            Self::PushMainnet | Self::PushTestnetDonut | Self::PushLocalnet
        )
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.metadata().name)
    }
}

impl FromStr for Chain {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_caip2(s).ok_or_else(|| crate::Error::Config(format!("unknown chain: {s}")))
    }
}

/// Whether the identifier names a Push Chain network.
///
/// Unset identifiers count as Push Chain: a wallet with no origin account is
/// operating natively on the settlement chain.
#[must_use]
pub fn is_push_chain_id(id: Option<&str>) -> bool {
    match id.map(str::trim) {
        None | Some("") => true,
        Some(id) => Chain::from_caip2(id).is_some_and(Chain::is_push),
    }
}
