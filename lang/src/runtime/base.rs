//! Integer <-> digit conversions in arbitrary bases

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use super::error::RuntimeError;

/// Big-endian digits of `value` in `base`. Negative values give the digits
/// of `|value|`, each negated.
pub fn to_base_digits(value: &BigInt, base: &BigInt) -> Result<Vec<BigInt>, RuntimeError> {
    if *base < BigInt::from(2) {
        return Err(RuntimeError::domain(format!("base must be at least 2, got {base}")));
    }

    let mut n = value.abs();
    let mut digits = Vec::new();
    while n >= *base {
        digits.push(&n % base);
        n /= base;
    }
    digits.push(n);
    digits.reverse();

    if value.is_negative() {
        for digit in &mut digits {
            *digit = -&*digit;
        }
    }
    Ok(digits)
}

/// Horner's method over big-endian `digits`
pub fn from_base_digits(digits: &[BigInt], base: &BigInt) -> BigInt {
    digits
        .iter()
        .fold(BigInt::zero(), |acc, digit| acc * base + digit)
}

/// Decode `value` with each character worth its position in `alphabet`
pub fn from_base_alphabet(value: &str, alphabet: &str) -> Result<BigInt, RuntimeError> {
    let symbols: Vec<char> = alphabet.chars().collect();
    if symbols.is_empty() {
        return Err(RuntimeError::domain("alphabet must not be empty"));
    }
    let base = BigInt::from(symbols.len());

    let mut result = BigInt::zero();
    for c in value.chars() {
        let Some(position) = symbols.iter().position(|&s| s == c) else {
            return Err(RuntimeError::domain(format!(
                "'{c}' is not in the alphabet \"{alphabet}\""
            )));
        };
        result = result * &base + BigInt::from(position);
    }
    Ok(result)
}

/// Inverse of [`from_base_alphabet`] for non-negative values
pub fn to_base_alphabet(value: &BigInt, alphabet: &str) -> Result<String, RuntimeError> {
    let symbols: Vec<char> = alphabet.chars().collect();
    if value.is_negative() {
        return Err(RuntimeError::domain(format!(
            "cannot encode negative value {value}"
        )));
    }
    match symbols.len() {
        0 => Err(RuntimeError::domain("alphabet must not be empty")),
        1 if value.is_zero() => Ok(symbols[0].to_string()),
        1 => Err(RuntimeError::domain(format!(
            "a one-symbol alphabet can only encode 0, got {value}"
        ))),
        len => to_base_digits(value, &BigInt::from(len))?
            .iter()
            .map(|digit| {
                digit
                    .to_usize()
                    .and_then(|index| symbols.get(index).copied())
                    .ok_or_else(|| RuntimeError::domain(format!("digit {digit} out of range")))
            })
            .collect(),
    }
}
