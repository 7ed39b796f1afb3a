//! Ronin addresses are shown to people as `ronin:<hex>` and used on the wire
//! as `0x<hex>`. Only the prefix differs, so the conversion is reversible.

use std::str::FromStr;

use alloy::primitives::Address;

use crate::error::TransferError;

pub const RONIN_PREFIX: &str = "ronin:";
pub const NATIVE_PREFIX: &str = "0x";

/// `ronin:abc` -> `0xabc`. Anything without the human prefix is returned as is.
pub fn to_native(address: &str) -> String {
    match address.strip_prefix(RONIN_PREFIX) {
        Some(rest) => format!("{NATIVE_PREFIX}{rest}"),
        None => address.to_string(),
    }
}

/// `0xabc` -> `ronin:abc`, for log and report output.
pub fn to_display(address: &str) -> String {
    match address.strip_prefix(NATIVE_PREFIX) {
        Some(rest) => format!("{RONIN_PREFIX}{rest}"),
        None => address.to_string(),
    }
}

/// Parses either form into a chain address.
pub fn parse_address(address: &str) -> Result<Address, TransferError> {
    Address::from_str(&to_native(address))
        .map_err(|_| TransferError::InvalidAddress(address.to_string()))
}
