//! # pushcampus-fees
//!
//! Platform fee engine for the PushCampus membership marketplace.
//!
//! Creating a group costs a fixed USD subscription fee, settled on Push
//! Chain. This crate:
//! - Prices the fee in the payer's asset using a cached USD price feed
//! - Builds the transaction parameters (native PC value, or funds moved from
//!   the payer's origin chain)
//! - Preflights the payer's balances on Push Chain and on EVM or Solana
//!   origin chains
//!
//! ## Example
//!
//! ```rust,no_run
//! use pushcampus_fees::{FeeConfig, FeeEngine, QuoteRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = FeeConfig::default();
//!     config.fee.treasury_address = Some("0x742d35Cc6634C0532925a3b844Bc9e7595916Da2".into());
//!
//!     let engine = FeeEngine::from_config(&config)?;
//!     let quote = engine.quoter().resolve(QuoteRequest::default()).await?;
//!     println!("{}", quote.display_amount);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod address;
pub mod chain;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod preflight;
pub mod pricing;
pub mod rpc;
pub mod units;

pub use chain::{Chain, VmFamily};
pub use config::{FailMode, FeeConfig};
pub use engine::FeeEngine;
pub use error::{Error, Result};
pub use preflight::{BalanceRequest, BalanceValidator, BalanceVerdict};
pub use pricing::{
    payment_config, FeeQuote, FeeQuoter, PaymentConfig, PriceOracle, Pricing, QuoteRequest,
    StaticTokenRegistry, TokenRegistry, Transfer,
};
