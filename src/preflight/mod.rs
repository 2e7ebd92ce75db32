//! Balance preflight for the platform fee.
//!
//! Before the user signs anything, check that they can actually pay:
//!
//! ```text
//! FeeQuote
//!    │
//!    ├── Transfer::Native ──▶ settlement check (Push Chain)
//!    │                          balance >= value + gas_price * gas
//!    │
//!    └── Transfer::Funds  ──▶ origin check, by VM family
//!                               Evm:    native or ERC-20 balance + gas buffer
//!                               Solana: lamports >= amount + fee buffer
//! ```
//!
//! The checks are advisory. When an RPC call fails the verdict follows the
//! configured [`FailMode`](crate::config::FailMode), which defaults to open.

mod validator;

pub use validator::{BalanceRequest, BalanceValidator};

use serde::{Deserialize, Serialize};

/// Outcome of a balance preflight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BalanceVerdict {
    /// The payer can cover the fee (or the check was inconclusive and the
    /// validator fails open).
    Sufficient,
    /// The payer cannot cover the fee.
    Insufficient {
        /// Human-readable shortfall message.
        reason: String,
    },
}

impl BalanceVerdict {
    /// Returns true if the payment may proceed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Sufficient)
    }

    /// The shortfall message, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Sufficient => None,
            Self::Insufficient { reason } => Some(reason),
        }
    }
}
