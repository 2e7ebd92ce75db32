//! Error types for pushcampus-fees.

use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while quoting or preflighting the platform fee.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing treasury, bad fee amount, bad RPC URL).
    #[error("configuration error: {0}")]
    Config(String),

    /// Price feed request or payload failure.
    #[error("price feed error: {0}")]
    PriceFeed(String),

    /// USD to token conversion failure.
    #[error("pricing error: {0}")]
    Pricing(String),

    /// The wallet has no moveable token for the required asset.
    #[error("token resolution error: {0}")]
    TokenResolution(String),

    /// Chain RPC failure.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// Malformed chain address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Malformed decimal amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
