//! Decimal amount <-> base unit conversion by string scaling.

use alloy_primitives::U256;
use core_logic::ConfigError;
use std::str::FromStr;

/// Decimals used for the chain's native currency.
pub const NATIVE_DECIMALS: u8 = 18;

/// Scales a human decimal amount by `10^decimals`, returning base units as
/// a decimal integer string with leading zeros stripped (`"0"` for zero).
///
/// A fractional part longer than `decimals` is rejected, never truncated.
pub fn normalize(amount: &str, decimals: u8) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidAmount {
        value: amount.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty"));
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("no digits"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid("only digits and a single '.' are allowed"));
    }
    if fraction.len() > decimals as usize {
        return Err(ConfigError::AmountPrecision {
            value: amount.to_string(),
            decimals,
            fraction_digits: fraction.len(),
        });
    }

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(fraction);
    for _ in fraction.len()..decimals as usize {
        digits.push('0');
    }

    let stripped = digits.trim_start_matches('0');
    if stripped.is_empty() {
        Ok("0".to_string())
    } else {
        Ok(stripped.to_string())
    }
}

/// [`normalize`] followed by conversion to `U256`.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<U256, ConfigError> {
    let normalized = normalize(amount, decimals)?;
    U256::from_str(&normalized).map_err(|_| ConfigError::InvalidAmount {
        value: amount.to_string(),
        reason: "does not fit in 256 bits".to_string(),
    })
}

/// Renders base units as a decimal string, trimming trailing fractional zeros.
pub fn format_base_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };

    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}
