//! Conversion between human-readable decimal amounts and integer base units.
//!
//! Amounts on every chain this crate talks to are integers scaled by a fixed
//! number of decimals (wei for EVM chains, lamports for Solana). These helpers
//! keep the conversion exact: no floating point is involved once a decimal
//! string exists.

use crate::error::{Error, Result};
use alloy::primitives::U256;

/// Decimal places used by the Push Chain native token.
pub const NATIVE_TOKEN_DECIMALS: u8 = 18;

/// Largest decimal precision kept when converting a USD figure into tokens.
pub const MAX_CONVERSION_PRECISION: u8 = 8;

/// Largest number of fraction digits shown in quote display strings.
pub const MAX_DISPLAY_PRECISION: u8 = 6;

/// `10^decimals` as a `U256`.
#[must_use]
pub fn ten_pow(decimals: u8) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

/// Parse a decimal string (e.g. `"1980.5"`) into base units.
///
/// Fraction digits beyond `decimals` are rejected rather than truncated.
///
/// # Errors
///
/// Returns [`Error::InvalidAmount`] for empty, signed, non-numeric or
/// over-precise input, or when the result overflows `U256`.
pub fn parse_units(value: &str, decimals: u8) -> Result<U256> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidAmount("empty amount".to_string()));
    }

    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(Error::InvalidAmount(format!("not a number: {value}")));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(Error::InvalidAmount(format!("not a number: {value}")));
    }
    if fraction.len() > usize::from(decimals) {
        return Err(Error::InvalidAmount(format!(
            "{value} has more than {decimals} fraction digits"
        )));
    }

    let mut digits = String::with_capacity(whole.len() + usize::from(decimals));
    digits.push_str(whole);
    digits.push_str(fraction);
    for _ in fraction.len()..usize::from(decimals) {
        digits.push('0');
    }
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 10)
        .map_err(|e| Error::InvalidAmount(format!("{value} out of range: {e}")))
}

/// Render base units as a decimal string with at most `precision` fraction
/// digits.
///
/// Extra digits are truncated and trailing zeros are removed, so
/// `1980 * 10^18` renders as `"1980"`.
#[must_use]
pub fn format_units(amount: U256, decimals: u8, precision: u8) -> String {
    let scale = ten_pow(decimals);
    let whole = amount / scale;
    let fraction = amount % scale;

    let precision = usize::from(precision.min(decimals));
    if precision == 0 || fraction.is_zero() {
        return whole.to_string();
    }

    let padded = format!("{:0>width$}", fraction.to_string(), width = usize::from(decimals));
    let shown = padded[..precision].trim_end_matches('0');
    if shown.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{shown}")
    }
}

/// Convert a USD figure into token base units at the given USD price.
///
/// The token quantity is rounded to `min(decimals, 8)` fraction digits before
/// scaling, so the result never claims more precision than the price feed
/// provides.
///
/// # Errors
///
/// Returns [`Error::Pricing`] when the price is not a finite positive number
/// or the USD figure is negative or not finite.
pub fn usd_to_token_units(usd: f64, price: f64, decimals: u8) -> Result<U256> {
    if !price.is_finite() || price <= 0.0 {
        return Err(Error::Pricing(format!("price must be positive, got {price}")));
    }
    if !usd.is_finite() || usd < 0.0 {
        return Err(Error::Pricing(format!("invalid USD amount {usd}")));
    }

    let precision = usize::from(decimals.min(MAX_CONVERSION_PRECISION));
    let token_amount = format!("{:.precision$}", usd / price);
    parse_units(&token_amount, decimals).map_err(|e| Error::Pricing(e.to_string()))
}
