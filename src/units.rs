//! Conversion between a token's smallest unit and its display scale.
//!
//! Raw amounts are arbitrary-precision integers. Display amounts are decimal
//! strings scaled by `10^decimals`. Conversion is done on digit strings, so
//! no floating point is involved at any step.

use std::fmt;

use alloy_primitives::U256;
use chrono::{TimeZone, Utc};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Serialize, Serializer};

use crate::error::{ExecutionError, Result};

/// Render a raw integer amount at display scale.
///
/// Output is canonical: no leading zeros in the integer part, no trailing
/// zeros in the fractional part, and no point when the fraction is empty.
pub fn to_display(raw: &BigUint, decimals: u8) -> String {
    let digits = raw.to_str_radix(10);
    let scale = decimals as usize;

    if scale == 0 {
        return digits;
    }

    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
    } else {
        digits
    };

    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// Parse a display-scale decimal string into the raw integer amount.
///
/// Rejects signs, exponents, separators and any non-zero digit beyond
/// `decimals` fractional places.
pub fn to_raw(display: &str, decimals: u8) -> Result<BigUint> {
    let value = display.trim();

    if value.starts_with('-') {
        return Err(ExecutionError::InvalidAmount(format!(
            "negative amount: {}",
            display
        )));
    }

    let (int_part, frac_part) = match value.split_once('.') {
        Some((i, f)) => (i, f),
        None => (value, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(ExecutionError::InvalidAmount(format!(
            "not a number: {:?}",
            display
        )));
    }

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(ExecutionError::InvalidAmount(format!(
            "not a number: {:?}",
            display
        )));
    }

    let scale = decimals as usize;
    let frac_part = if frac_part.len() > scale {
        let (kept, dropped) = frac_part.split_at(scale);
        if dropped.bytes().any(|b| b != b'0') {
            return Err(ExecutionError::InvalidAmount(format!(
                "{} has more than {} fractional digits",
                display, decimals
            )));
        }
        kept
    } else {
        frac_part
    };

    let digits = format!("{}{}{}", int_part, frac_part, "0".repeat(scale - frac_part.len()));

    BigUint::parse_bytes(digits.as_bytes(), 10).ok_or_else(|| {
        ExecutionError::InvalidAmount(format!("not a number: {:?}", display))
    })
}

/// Narrow a raw amount into the contract's `uint256`.
pub fn to_wire(raw: &BigUint) -> Result<U256> {
    let bytes = raw.to_bytes_be();
    if bytes.len() > 32 {
        return Err(ExecutionError::InvalidAmount(format!(
            "{} exceeds representable range",
            raw
        )));
    }
    Ok(U256::from_be_slice(&bytes))
}

/// Widen a `uint256` wire amount.
pub fn from_wire(value: U256) -> BigUint {
    if value.is_zero() {
        return BigUint::zero();
    }
    BigUint::from_bytes_be(&value.to_be_bytes::<32>())
}

/// Parse a display amount straight into its wire form.
pub fn display_to_wire(display: &str, decimals: u8) -> Result<U256> {
    to_wire(&to_raw(display, decimals)?)
}

/// Render a ledger timestamp (seconds) as a UTC date string.
pub fn timestamp_to_human(secs: u64) -> String {
    match i64::try_from(secs).ok().and_then(|s| Utc.timestamp_opt(s, 0).single()) {
        Some(dt) => dt.format("%d %b %Y, %H:%M:%S UTC").to_string(),
        None => format!("<invalid timestamp {}>", secs),
    }
}

/// A token amount already converted to display scale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayAmount(String);

impl DisplayAmount {
    /// Convert a wire amount using the token's decimals.
    pub fn from_wire(value: U256, decimals: u8) -> Self {
        Self(to_display(&from_wire(value), decimals))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover the raw amount. Never fails for values built by this type.
    pub fn to_raw(&self, decimals: u8) -> Result<BigUint> {
        to_raw(&self.0, decimals)
    }
}

impl fmt::Display for DisplayAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for DisplayAmount {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for DisplayAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
