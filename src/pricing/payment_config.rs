//! Payment configuration per origin chain.
//!
//! A user pays the platform fee in the native asset of the chain their wallet
//! lives on. This table says which price feed prices that asset, how it is
//! denominated, and which moveable token the wallet must expose to move it.

use crate::chain::{is_push_chain_id, Chain};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key into the wallet's moveable-token registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenAccessor {
    /// Native ether (or the chain's EVM native asset).
    Eth,
    /// Native SOL.
    Sol,
    /// Tether USD.
    Usdt,
    /// Wrapped ether.
    Weth,
}

impl TokenAccessor {
    /// Registry key as the wallet spells it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eth => "ETH",
            Self::Sol => "SOL",
            Self::Usdt => "USDT",
            Self::Weth => "WETH",
        }
    }
}

impl fmt::Display for TokenAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the fee is priced and denominated on a given chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentConfig {
    /// Price-feed id of the payment asset.
    pub price_feed_id: &'static str,
    /// Display symbol.
    pub symbol: &'static str,
    /// Decimal precision of the asset's base unit.
    pub decimals: u8,
    /// Moveable token to request from the wallet; `None` for Push Chain.
    pub token_accessor: Option<TokenAccessor>,
}

/// Config used on Push Chain and for any unrecognised chain.
pub const PUSH_PAYMENT_CONFIG: PaymentConfig = PaymentConfig {
    price_feed_id: "push-protocol",
    symbol: "PC",
    decimals: 18,
    token_accessor: None,
};

const ETH_PAYMENT_CONFIG: PaymentConfig = PaymentConfig {
    price_feed_id: "ethereum",
    symbol: "ETH",
    decimals: 18,
    token_accessor: Some(TokenAccessor::Eth),
};

const BNB_PAYMENT_CONFIG: PaymentConfig = PaymentConfig {
    price_feed_id: "binancecoin",
    symbol: "BNB",
    decimals: 18,
    token_accessor: Some(TokenAccessor::Eth),
};

const SOL_PAYMENT_CONFIG: PaymentConfig = PaymentConfig {
    price_feed_id: "solana",
    symbol: "SOL",
    decimals: 9,
    token_accessor: Some(TokenAccessor::Sol),
};

/// Static payment config for a known chain.
#[must_use]
pub const fn payment_config_for(chain: Chain) -> &'static PaymentConfig {
    match chain {
        Chain::PushMainnet | Chain::PushTestnetDonut | Chain::PushLocalnet => {
            &PUSH_PAYMENT_CONFIG
        }
        Chain::EthereumMainnet
        | Chain::EthereumSepolia
        | Chain::ArbitrumSepolia
        | Chain::BaseSepolia => &ETH_PAYMENT_CONFIG,
        Chain::BnbTestnet => &BNB_PAYMENT_CONFIG,
        Chain::SolanaMainnet | Chain::SolanaTestnet | Chain::SolanaDevnet => &SOL_PAYMENT_CONFIG,
    }
}

/// Resolve the payment config for an origin chain identifier.
///
/// Push Chain ids, unset ids and unknown ids all resolve to
/// [`PUSH_PAYMENT_CONFIG`].
#[must_use]
pub fn payment_config(chain_id: Option<&str>) -> &'static PaymentConfig {
    if is_push_chain_id(chain_id) {
        return &PUSH_PAYMENT_CONFIG;
    }
    chain_id
        .and_then(Chain::from_caip2)
        .map_or(&PUSH_PAYMENT_CONFIG, payment_config_for)
}
