use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use super::{Expr, Grammar, InfixOp, Parser, PrefixOp, SpannedExpr};
use crate::error::GlyphError;
use crate::lexer::Lexer;
use crate::runtime::{RuntimeError, Sequence, Value};

/// Tokenize, parse and evaluate one input line
pub fn read_literal(source: &str, grammar: Grammar) -> Result<Value, GlyphError> {
    let tokens = Lexer::new(source).tokenize()?;
    let expr = Parser::new(tokens, grammar).parse()?;
    Ok(evaluate(&expr)?)
}

/// Fold a parsed expression into a value. Booleans become 1 and 0.
pub fn evaluate(expr: &SpannedExpr) -> Result<Value, RuntimeError> {
    match &expr.node {
        Expr::Number(n) => Ok(Value::Number(n.clone())),
        Expr::String(s) => Ok(Value::text(s.as_str())),
        Expr::Boolean(b) => Ok(Value::int(i64::from(*b))),
        Expr::List(elements) => elements
            .iter()
            .map(evaluate)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::list),
        Expr::Prefix { op, right } => match (op, evaluate(right)?) {
            (PrefixOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
            (PrefixOp::Plus, Value::Number(n)) => Ok(Value::Number(n)),
            (op, value) => Err(RuntimeError::type_mismatch(format!(
                "bad operand type for unary {op}: {}",
                value.type_name()
            ))),
        },
        Expr::Infix { left, op, right } => binary(*op, evaluate(left)?, evaluate(right)?),
    }
}

fn binary(op: InfixOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (op, &left, &right) {
        (_, Value::Number(a), Value::Number(b)) => arithmetic(op, a, b).map(Value::Number),

        (InfixOp::Add, Value::Text(a), Value::Text(b)) => Ok(Value::text(format!("{a}{b}"))),
        (
            InfixOp::Add,
            Value::List(Sequence::Materialized(a)),
            Value::List(Sequence::Materialized(b)),
        ) => {
            let mut joined = a.clone();
            joined.append(b.clone());
            Ok(Value::from(joined))
        }

        (InfixOp::Mul, Value::Text(s), Value::Number(n))
        | (InfixOp::Mul, Value::Number(n), Value::Text(s)) => {
            Ok(Value::text(s.repeat(repetitions(n, s.len())?)))
        }
        (InfixOp::Mul, Value::List(Sequence::Materialized(items)), Value::Number(n))
        | (InfixOp::Mul, Value::Number(n), Value::List(Sequence::Materialized(items))) => {
            let count = repetitions(n, items.len())?;
            Ok(Value::list(
                std::iter::repeat_n(items, count).flat_map(|items| items.iter().cloned()),
            ))
        }

        _ => Err(RuntimeError::type_mismatch(format!(
            "unsupported operand types for {op}: {} and {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn arithmetic(op: InfixOp, a: &BigRational, b: &BigRational) -> Result<BigRational, RuntimeError> {
    match op {
        InfixOp::Add => Ok(a + b),
        InfixOp::Sub => Ok(a - b),
        InfixOp::Mul => Ok(a * b),
        InfixOp::Div | InfixOp::Mod if b.is_zero() => Err(RuntimeError::domain("division by zero")),
        InfixOp::Div => Ok(a / b),
        // Result takes the sign of the divisor
        InfixOp::Mod => Ok(a - b * (a / b).floor()),
    }
}

/// Longest text (in bytes) or list a repetition may build
const MAX_REPEAT_LEN: usize = 1 << 24;

/// Repeat count for a sequence of `unit_len` items; negative counts repeat zero times
fn repetitions(n: &BigRational, unit_len: usize) -> Result<usize, RuntimeError> {
    if !n.is_integer() {
        return Err(RuntimeError::type_mismatch(format!(
            "cannot repeat a sequence {n} times"
        )));
    }
    if n.is_negative() || unit_len == 0 {
        return Ok(0);
    }
    n.to_integer()
        .to_usize()
        .filter(|count| {
            count
                .checked_mul(unit_len)
                .is_some_and(|total| total <= MAX_REPEAT_LEN)
        })
        .ok_or_else(|| RuntimeError::domain(format!("repeat count {n} is too large")))
}
