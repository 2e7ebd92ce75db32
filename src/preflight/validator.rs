//! Settlement and origin chain balance checks.

use super::BalanceVerdict;
use crate::address::{check_solana_address, parse_evm_address};
use crate::chain::{Chain, VmFamily};
use crate::config::{FailMode, PreflightConfig};
use crate::error::{Error, Result};
use crate::pricing::quote::{FeeQuote, MoveableToken, Transfer};
use crate::rpc::{EvmRpc, OriginRpcs};
use crate::units::format_units;
use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Inputs to [`BalanceValidator::validate`].
#[derive(Debug, Clone, Copy)]
pub struct BalanceRequest<'a> {
    /// The quote being paid.
    pub quote: &'a FeeQuote,
    /// The payer's account on Push Chain.
    pub push_account: Address,
    /// CAIP-2 id of the payer's origin chain.
    pub origin_chain: Option<&'a str>,
    /// The payer's address on the origin chain.
    pub origin_address: Option<&'a str>,
}

/// Read-only balance preflight for fee payments.
pub struct BalanceValidator {
    settlement: Arc<dyn EvmRpc>,
    push_chain: Chain,
    origins: Arc<dyn OriginRpcs>,
    config: PreflightConfig,
}

impl BalanceValidator {
    /// Create a validator.
    ///
    /// * `settlement` - RPC client for the Push Chain network in `push_chain`
    /// * `origins` - RPC clients for origin chains
    #[must_use]
    pub fn new(
        settlement: Arc<dyn EvmRpc>,
        push_chain: Chain,
        origins: Arc<dyn OriginRpcs>,
        config: PreflightConfig,
    ) -> Self {
        info!(
            "Balance validator initialized (chain={}, fail_mode={:?})",
            push_chain, config.fail_mode
        );
        Self {
            settlement,
            push_chain,
            origins,
            config,
        }
    }

    /// Check that the payer can cover `request.quote`.
    ///
    /// The settlement check runs first and short-circuits; the origin check
    /// only runs for quotes that move funds from the origin chain. RPC
    /// failures resolve according to the configured fail mode.
    pub async fn validate(&self, request: &BalanceRequest<'_>) -> BalanceVerdict {
        match self.try_validate(request).await {
            Ok(verdict) => verdict,
            Err(e) => self.inconclusive(&e),
        }
    }

    /// Check that `account` holds at least `amount` PC on the settlement
    /// chain. Used by the join and renewal flows, which pay a fixed native
    /// amount without a quote.
    pub async fn check_native_balance(&self, account: Address, amount: U256) -> BalanceVerdict {
        let meta = self.push_chain.metadata();
        match self.settlement.balance(account).await {
            Ok(balance) if balance < amount => insufficient(
                meta.native_symbol,
                meta.native_decimals,
                meta.name,
                amount,
                balance,
            ),
            Ok(_) => BalanceVerdict::Sufficient,
            Err(e) => self.inconclusive(&e),
        }
    }

    async fn try_validate(&self, request: &BalanceRequest<'_>) -> Result<BalanceVerdict> {
        let quote = request.quote;

        if let Some(value) = quote.native_value() {
            let verdict = self
                .check_settlement(request.push_account, quote, value)
                .await?;
            if !verdict.is_ok() {
                return Ok(verdict);
            }
        }

        if let Transfer::Funds { amount, token } = &quote.params.transfer {
            return self.check_origin(request, *amount, token).await;
        }

        Ok(BalanceVerdict::Sufficient)
    }

    async fn check_settlement(
        &self,
        account: Address,
        quote: &FeeQuote,
        value: U256,
    ) -> Result<BalanceVerdict> {
        let balance = self.settlement.balance(account).await?;
        let gas_price = self.settlement.gas_price().await?;
        let gas = match self
            .settlement
            .estimate_transfer_gas(account, quote.params.to, value)
            .await
        {
            Ok(gas) => gas,
            Err(e) => {
                debug!(
                    "Gas estimation failed, assuming {} units: {e}",
                    self.config.fallback_gas_units
                );
                self.config.fallback_gas_units
            }
        };

        let required = value.saturating_add(gas_cost(gas_price, gas));
        debug!("Settlement check: balance={balance}, required={required}");

        if balance < required {
            return Ok(insufficient(
                &quote.symbol,
                quote.decimals,
                self.push_chain.metadata().name,
                required,
                balance,
            ));
        }
        Ok(BalanceVerdict::Sufficient)
    }

    async fn check_origin(
        &self,
        request: &BalanceRequest<'_>,
        amount: U256,
        token: &MoveableToken,
    ) -> Result<BalanceVerdict> {
        let Some(chain) = request.origin_chain.and_then(Chain::from_caip2) else {
            debug!(
                "Origin chain {:?} has no metadata; skipping origin check",
                request.origin_chain
            );
            return Ok(BalanceVerdict::Sufficient);
        };
        let origin_address = request
            .origin_address
            .ok_or_else(|| Error::InvalidAddress(format!("no origin address for {chain}")))?;

        match chain.vm() {
            VmFamily::Evm => self.check_evm_origin(chain, origin_address, amount, token).await,
            VmFamily::Solana => {
                self.check_solana_origin(chain, origin_address, amount, token)
                    .await
            }
        }
    }

    async fn check_evm_origin(
        &self,
        chain: Chain,
        origin_address: &str,
        amount: U256,
        token: &MoveableToken,
    ) -> Result<BalanceVerdict> {
        let meta = chain.metadata();
        let account = parse_evm_address(origin_address)?;
        let rpc = self.origins.evm(chain)?;

        let native = rpc.balance(account).await?;
        let gas_price = rpc.gas_price().await?;
        let gas_buffer = gas_cost(gas_price, self.config.origin_gas_buffer_units);

        if token.is_native() {
            let required = amount.saturating_add(gas_buffer);
            if native < required {
                return Ok(insufficient(
                    meta.native_symbol,
                    meta.native_decimals,
                    meta.name,
                    required,
                    native,
                ));
            }
            return Ok(BalanceVerdict::Sufficient);
        }

        let token_address = parse_evm_address(&token.address)?;
        let token_balance = rpc.erc20_balance(token_address, account).await?;
        if token_balance < amount {
            return Ok(insufficient(
                &token.symbol,
                token.decimals,
                meta.name,
                amount,
                token_balance,
            ));
        }
        if native < gas_buffer {
            return Ok(insufficient(
                meta.native_symbol,
                meta.native_decimals,
                meta.name,
                gas_buffer,
                native,
            ));
        }
        Ok(BalanceVerdict::Sufficient)
    }

    async fn check_solana_origin(
        &self,
        chain: Chain,
        origin_address: &str,
        amount: U256,
        token: &MoveableToken,
    ) -> Result<BalanceVerdict> {
        if !token.is_native() {
            // SPL token balances are not checked yet.
            debug!("Skipping SPL balance check for {} on {chain}", token.symbol);
            return Ok(BalanceVerdict::Sufficient);
        }

        let meta = chain.metadata();
        let account = check_solana_address(origin_address)?;
        let rpc = self.origins.solana(chain)?;
        let lamports = U256::from(rpc.balance(account).await?);
        let required = amount.saturating_add(U256::from(self.config.solana_fee_buffer_lamports));

        if lamports < required {
            return Ok(insufficient(
                meta.native_symbol,
                meta.native_decimals,
                meta.name,
                required,
                lamports,
            ));
        }
        Ok(BalanceVerdict::Sufficient)
    }

    fn inconclusive(&self, error: &Error) -> BalanceVerdict {
        match self.config.fail_mode {
            FailMode::Open => {
                warn!("Balance check inconclusive, allowing payment: {error}");
                BalanceVerdict::Sufficient
            }
            FailMode::Closed => {
                warn!("Balance check inconclusive, blocking payment: {error}");
                BalanceVerdict::Insufficient {
                    reason: format!("Unable to verify balance: {error}"),
                }
            }
        }
    }
}

fn gas_cost(gas_price: u128, gas: u64) -> U256 {
    U256::from(gas_price).saturating_mul(U256::from(gas))
}

fn insufficient(
    symbol: &str,
    decimals: u8,
    chain_name: &str,
    required: U256,
    available: U256,
) -> BalanceVerdict {
    let short = required.saturating_sub(available);
    BalanceVerdict::Insufficient {
        reason: format!(
            "Insufficient {symbol} balance on {chain_name}: need {} {symbol}, have {} {symbol} (short by {} {symbol})",
            format_units(required, decimals, decimals),
            format_units(available, decimals, decimals),
            format_units(short, decimals, decimals),
        ),
    }
}
