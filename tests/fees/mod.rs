//! End-to-end fee flows against in-memory chains and price feed.
//!
//! ```text
//! TestHarness
//!     ├── TestPriceFeed   (USD prices, request counter)
//!     ├── TestEvmChain    (Push Chain settlement)
//!     ├── TestOrigins     (EVM and Solana origin chains)
//!     └── ManualClock     (cache expiry)
//! ```

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod fee_flow;
mod harness;
