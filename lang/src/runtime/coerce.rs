//! Scalar/sequence classification and number <-> digit conversions

use im_rc::Vector;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::context::Context;
use super::error::RuntimeError;
use super::lazy::LazySequence;
use super::value::Value;

/// Fractional digits kept when a fraction has no terminating expansion
pub const MAX_FRACTION_DIGITS: usize = 16;

/// How a number becomes a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberType {
    /// `-12.5` becomes `["-", 1, 2, ".", 5]`
    Digits,
    /// `n` becomes `range_start ..< trunc(n) + range_end_offset`
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Scalar,
    List,
}

/// Sequence view of a value. Text and lists pass through unchanged.
///
/// `number_type` overrides `ctx.flags.number_as_range` when given.
pub fn iterable(
    value: &Value,
    number_type: Option<NumberType>,
    ctx: &Context,
) -> Result<Value, RuntimeError> {
    match value {
        Value::Number(n) => {
            let as_range = match number_type {
                Some(NumberType::Range) => true,
                Some(NumberType::Digits) => false,
                None => ctx.flags.number_as_range,
            };
            if as_range {
                let start = BigInt::from(ctx.flags.range_start);
                let end = n.trunc().to_integer() + BigInt::from(ctx.flags.range_end_offset);
                Ok(Value::lazy(LazySequence::range(start, end)))
            } else {
                Ok(Value::from(digits(n)))
            }
        }
        Value::Text(_) | Value::List(_) => Ok(value.clone()),
        Value::Function(_) => Err(RuntimeError::type_mismatch(format!(
            "cannot iterate over {}",
            value.type_name()
        ))),
    }
}

/// Decimal digits of `n` as numbers, with `-` and `.` kept as text
pub fn digits(n: &BigRational) -> Vector<Value> {
    decimal_text(n)
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => Value::int(i64::from(d)),
            None => Value::text(c.to_string()),
        })
        .collect()
}

/// Exact decimal rendering, truncated after [`MAX_FRACTION_DIGITS`] for
/// fractions whose expansion does not terminate
pub fn decimal_text(n: &BigRational) -> String {
    let magnitude = n.abs();
    let numer = magnitude.numer();
    let denom = magnitude.denom();

    let whole = numer / denom;
    let mut remainder = numer % denom;

    let mut fraction = String::new();
    let limit = if terminates(denom) {
        usize::MAX
    } else {
        MAX_FRACTION_DIGITS
    };
    let ten = BigInt::from(10);
    while !remainder.is_zero() && fraction.len() < limit {
        remainder *= &ten;
        fraction.push_str(&(&remainder / denom).to_string());
        remainder %= denom;
    }
    let fraction = fraction.trim_end_matches('0');

    let mut text = String::new();
    if n.is_negative() && !(whole.is_zero() && fraction.is_empty()) {
        text.push('-');
    }
    text.push_str(&whole.to_string());
    if !fraction.is_empty() {
        text.push('.');
        text.push_str(fraction);
    }
    text
}

/// A reduced fraction terminates iff its denominator has no prime factors but 2 and 5
fn terminates(denom: &BigInt) -> bool {
    let mut d = denom.clone();
    for factor in [2u32, 5] {
        let factor = BigInt::from(factor);
        while (&d % &factor).is_zero() {
            d /= &factor;
        }
    }
    d.is_one()
}

/// Exact value of a decimal literal such as `-12.5`, `.5` or `5.`
pub fn parse_decimal(text: &str) -> Option<BigRational> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let mantissa: BigInt = format!("0{whole}{fraction}").parse().ok()?;
    let scale = num_traits::pow(BigInt::from(10), fraction.len());
    let value = BigRational::new(mantissa, scale);
    Some(if negative { -value } else { value })
}

/// Inverse of [`digits`]
pub fn number_from_digits(items: &Vector<Value>) -> Result<BigRational, RuntimeError> {
    let mut text = String::with_capacity(items.len());
    let ten = BigInt::from(10);
    for item in items {
        match (item, item.as_integer()) {
            (_, Some(d)) if !d.is_negative() && d < ten => text.push_str(&d.to_string()),
            (Value::Text(s), _) if s.as_str() == "-" || s.as_str() == "." => text.push_str(s),
            (other, _) => {
                return Err(RuntimeError::type_mismatch(format!(
                    "{other} is not a decimal digit"
                )));
            }
        }
    }
    parse_decimal(&text).ok_or_else(|| RuntimeError::domain(format!("\"{text}\" is not a number")))
}

/// Reverse the decimal digits of `|n|`, keeping the sign: `-120` gives `-21`
pub fn reverse_number(n: &BigRational) -> Result<BigRational, RuntimeError> {
    let reversed: String = decimal_text(&n.abs()).chars().rev().collect();
    let magnitude = parse_decimal(&reversed)
        .ok_or_else(|| RuntimeError::domain(format!("cannot reverse {n}")))?;
    Ok(if n.is_negative() { -magnitude } else { magnitude })
}

/// Numbers, text and functions are scalars
pub fn primitive_type(value: &Value) -> PrimitiveType {
    match value {
        Value::List(_) => PrimitiveType::List,
        Value::Number(_) | Value::Text(_) | Value::Function(_) => PrimitiveType::Scalar,
    }
}

/// Wrap a scalar in a one-element list
pub fn wrapify(value: &Value) -> Value {
    match primitive_type(value) {
        PrimitiveType::Scalar => Value::list([value.clone()]),
        PrimitiveType::List => value.clone(),
    }
}

/// Unwrap a one-element list; realizes at most two elements of a lazy list
pub fn scalarify(value: &Value, ctx: &mut Context) -> Result<Value, RuntimeError> {
    let Value::List(sequence) = value else {
        return Ok(value.clone());
    };
    let Some(first) = sequence.get(0, ctx)? else {
        return Ok(value.clone());
    };
    if sequence.get(1, ctx)?.is_some() {
        return Ok(value.clone());
    }
    Ok(first)
}
