//! Price labels shown next to groups and the subscription checkout.

use crate::pricing::quote::FeeQuote;
use crate::units::{format_units, parse_units, NATIVE_TOKEN_DECIMALS};
use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Symbol of the Push Chain native token.
pub const NATIVE_TOKEN_SYMBOL: &str = "PC";

/// How often a group bills its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCadence {
    /// No charge.
    Free,
    /// Charged every month.
    #[default]
    Monthly,
}

/// Parse a human-readable PC amount into base units. Blank input is zero.
///
/// # Errors
///
/// Returns an error if the amount is not a valid decimal.
pub fn parse_native_amount(value: &str) -> crate::Result<U256> {
    if value.trim().is_empty() {
        return Ok(U256::ZERO);
    }
    parse_units(value, NATIVE_TOKEN_DECIMALS)
}

/// Format PC base units with up to `max_fraction_digits` digits, e.g.
/// `"12.5 PC"`.
#[must_use]
pub fn format_native_amount(amount: U256, max_fraction_digits: u8) -> String {
    format!(
        "{} {NATIVE_TOKEN_SYMBOL}",
        group_thousands(&format_units(amount, NATIVE_TOKEN_DECIMALS, max_fraction_digits))
    )
}

/// Label for a group's membership price.
///
/// With a positive `usd_rate` the price is shown in dollars, otherwise in PC.
/// Free groups and missing prices read "Free" (or "Join for free" without
/// cadence).
#[must_use]
pub fn group_price_label(
    price: Option<f64>,
    cadence: BillingCadence,
    include_cadence: bool,
    usd_rate: Option<f64>,
) -> String {
    let price = match price {
        Some(price) if price > 0.0 && price.is_finite() && cadence != BillingCadence::Free => {
            price
        }
        _ => {
            return if include_cadence {
                "Free".to_string()
            } else {
                "Join for free".to_string()
            };
        }
    };

    let amount = match usd_rate {
        Some(rate) if rate > 0.0 && rate.is_finite() => format_usd(price * rate),
        _ => format!("{} {NATIVE_TOKEN_SYMBOL}", format_decimal(price, 4)),
    };

    if include_cadence {
        format!("{amount}/month")
    } else {
        amount
    }
}

/// Label for the platform subscription: the quote's display amount when one
/// is available, otherwise the configured USD price.
#[must_use]
pub fn subscription_label(quote: Option<&FeeQuote>, usd_amount: &str) -> String {
    match quote {
        Some(quote) => format!("{}/month", quote.display_amount),
        None => format!("${usd_amount} USD"),
    }
}

fn format_usd(value: f64) -> String {
    format!("${}", format_decimal(value, 2))
}

/// Round to at most `max_fraction_digits`, drop trailing zeros, group
/// thousands with commas.
fn format_decimal(value: f64, max_fraction_digits: usize) -> String {
    let fixed = format!("{value:.max_fraction_digits$}");
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    group_thousands(trimmed)
}

fn group_thousands(value: &str) -> String {
    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (value, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match fraction {
        Some(fraction) => format!("{grouped}.{fraction}"),
        None => grouped,
    }
}
