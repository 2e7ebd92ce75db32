//! Address parsing for the chains the fee engine talks to.
//!
//! EVM addresses (treasury, Push Chain accounts, EVM origin accounts) are
//! validated strictly. Solana addresses are only checked for shape, since the
//! RPC node is the authority on whether a key exists.

use crate::error::{Error, Result};
use alloy::primitives::Address;

/// Length of a base58-encoded Solana public key, lower and upper bound.
const SOLANA_ADDRESS_LEN: std::ops::RangeInclusive<usize> = 32..=44;

/// Parse an EVM address string (`0x` + 40 hex characters).
///
/// # Errors
///
/// Returns [`Error::InvalidAddress`] if the address format is invalid.
pub fn parse_evm_address(address: &str) -> Result<Address> {
    let address = address.trim();
    if !address.starts_with("0x") && !address.starts_with("0X") {
        return Err(Error::InvalidAddress(format!(
            "must start with '0x', got: {address}"
        )));
    }

    if address.len() != 42 {
        return Err(Error::InvalidAddress(format!(
            "expected 42 characters, got {}",
            address.len()
        )));
    }

    let bytes = hex::decode(&address[2..])
        .map_err(|e| Error::InvalidAddress(format!("{address} is not hex: {e}")))?;

    Ok(Address::from_slice(&bytes))
}

/// Whether `address` is a well-formed EVM address.
#[must_use]
pub fn is_valid_evm_address(address: &str) -> bool {
    parse_evm_address(address).is_ok()
}

/// Check that `address` looks like a base58 Solana public key.
///
/// # Errors
///
/// Returns [`Error::InvalidAddress`] on wrong length or non-base58 characters.
pub fn check_solana_address(address: &str) -> Result<&str> {
    let address = address.trim();
    if !SOLANA_ADDRESS_LEN.contains(&address.len()) {
        return Err(Error::InvalidAddress(format!(
            "Solana address must be 32-44 characters, got {}",
            address.len()
        )));
    }
    // Base58 excludes 0, O, I and l.
    let is_base58 = address
        .chars()
        .all(|c| c.is_ascii_alphanumeric() && !matches!(c, '0' | 'O' | 'I' | 'l'));
    if !is_base58 {
        return Err(Error::InvalidAddress(format!(
            "Solana address contains non-base58 characters: {address}"
        )));
    }
    Ok(address)
}
