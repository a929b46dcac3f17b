use im_rc::Vector;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use std::fmt;
use std::rc::Rc;

use super::context::Context;
use super::dispatch::Callable;
use super::error::RuntimeError;
use super::lazy::LazySequence;

/// Runtime value
#[derive(Clone, Debug)]
pub enum Value {
    /// Exact rational, integers included
    Number(BigRational),

    /// UTF-8 text
    Text(Rc<String>),

    /// Materialized or lazy sequence
    List(Sequence),

    /// First-class callable (primitive, closure or named function)
    Function(Callable),
}

/// Sequence storage: either fully realized or produced on demand
#[derive(Clone, Debug)]
pub enum Sequence {
    /// Fixed-length, random-access, persistent
    Materialized(Vector<Value>),

    /// Pull-based, possibly unbounded
    Lazy(LazySequence),
}

impl Value {
    pub fn int(n: i64) -> Self {
        Value::Number(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn number(n: BigRational) -> Self {
        Value::Number(n)
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(Rc::new(s.into()))
    }

    pub fn list(values: impl IntoIterator<Item = Value>) -> Self {
        Value::List(Sequence::Materialized(values.into_iter().collect()))
    }

    pub fn empty_list() -> Self {
        Value::List(Sequence::Materialized(Vector::new()))
    }

    pub fn lazy(sequence: LazySequence) -> Self {
        Value::List(Sequence::Lazy(sequence))
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::Text(_) => "Text",
            Value::List(Sequence::Materialized(_)) => "List",
            Value::List(Sequence::Lazy(_)) => "LazyList",
            Value::Function(_) => "Function",
        }
    }

    pub fn as_number(&self) -> Option<&BigRational> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// The value as an integer, if it is a whole number
    pub fn as_integer(&self) -> Option<BigInt> {
        match self {
            Value::Number(n) if n.is_integer() => Some(n.to_integer()),
            _ => None,
        }
    }

    /// Zero, empty text and empty sequences are falsy; everything else is truthy.
    /// A lazy sequence realizes at most its first element.
    pub fn is_truthy(&self, ctx: &mut Context) -> Result<bool, RuntimeError> {
        Ok(match self {
            Value::Number(n) => !n.is_zero(),
            Value::Text(s) => !s.is_empty(),
            Value::List(sequence) => sequence.get(0, ctx)?.is_some(),
            Value::Function(_) => true,
        })
    }

    /// Element-wise equality that forces lazy sequences.
    /// Does not terminate when both sides are unbounded and agree forever.
    pub fn structurally_equals(&self, other: &Value, ctx: &mut Context) -> Result<bool, RuntimeError> {
        match (self, other) {
            (Value::List(a), Value::List(b)) => {
                let mut index = 0;
                loop {
                    match (a.get(index, ctx)?, b.get(index, ctx)?) {
                        (None, None) => return Ok(true),
                        (Some(x), Some(y)) => {
                            if !x.structurally_equals(&y, ctx)? {
                                return Ok(false);
                            }
                        }
                        _ => return Ok(false),
                    }
                    index += 1;
                }
            }
            _ => Ok(self == other),
        }
    }

    /// Rendering used when a value is spliced into text: text is unquoted.
    pub fn to_plain_string(&self) -> String {
        match self {
            Value::Text(s) => s.to_string(),
            other => other.to_string(),
        }
    }
}

impl Sequence {
    /// Element at `index`, realizing a lazy sequence up to that point
    pub fn get(&self, index: usize, ctx: &mut Context) -> Result<Option<Value>, RuntimeError> {
        match self {
            Sequence::Materialized(values) => Ok(values.get(index).cloned()),
            Sequence::Lazy(lazy) => lazy.get(index, ctx),
        }
    }

    /// Length; forces a lazy sequence completely
    pub fn len(&self, ctx: &mut Context) -> Result<usize, RuntimeError> {
        match self {
            Sequence::Materialized(values) => Ok(values.len()),
            Sequence::Lazy(lazy) => lazy.len(ctx),
        }
    }

    pub fn is_empty(&self, ctx: &mut Context) -> Result<bool, RuntimeError> {
        Ok(self.get(0, ctx)?.is_none())
    }

    /// Membership test, realizing a lazy sequence only until a match is found
    pub fn contains(&self, needle: &Value, ctx: &mut Context) -> Result<bool, RuntimeError> {
        match self {
            Sequence::Materialized(values) => {
                for item in values {
                    if item.structurally_equals(needle, ctx)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Sequence::Lazy(lazy) => lazy.contains(needle, ctx),
        }
    }

    /// All elements as a persistent vector
    pub fn force(&self, ctx: &mut Context) -> Result<Vector<Value>, RuntimeError> {
        match self {
            Sequence::Materialized(values) => Ok(values.clone()),
            Sequence::Lazy(lazy) => lazy.force(ctx),
        }
    }

    /// Independent copy; a lazy copy shares the realized prefix and generator
    pub fn duplicate(&self) -> Sequence {
        match self {
            Sequence::Materialized(values) => Sequence::Materialized(values.clone()),
            Sequence::Lazy(lazy) => Sequence::Lazy(lazy.duplicate()),
        }
    }

    pub fn cursor(&self) -> SequenceCursor {
        SequenceCursor {
            sequence: self.duplicate(),
            index: 0,
        }
    }
}

/// Forward iterator over a sequence; pulling needs the execution context
#[derive(Debug, Clone)]
pub struct SequenceCursor {
    sequence: Sequence,
    index: usize,
}

impl SequenceCursor {
    pub fn next(&mut self, ctx: &mut Context) -> Result<Option<Value>, RuntimeError> {
        let item = self.sequence.get(self.index, ctx)?;
        if item.is_some() {
            self.index += 1;
        }
        Ok(item)
    }
}

/// Shallow equality. Lazy sequences and functions compare by identity since
/// comparing their contents would need the execution context.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::List(Sequence::Materialized(a)), Value::List(Sequence::Materialized(b))) => {
                a == b
            }
            (Value::List(Sequence::Lazy(a)), Value::List(Sequence::Lazy(b))) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::int(n)
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::Number(BigRational::from_integer(n))
    }
}

impl From<BigRational> for Value {
    fn from(n: BigRational) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::text(s)
    }
}

impl From<Vector<Value>> for Value {
    fn from(values: Vector<Value>) -> Self {
        Value::List(Sequence::Materialized(values))
    }
}

impl From<Callable> for Value {
    fn from(callable: Callable) -> Self {
        Value::Function(callable)
    }
}

fn write_items<'a>(f: &mut fmt::Formatter<'_>, items: impl Iterator<Item = &'a Value>) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "\"{s}\""),
            Value::List(Sequence::Materialized(values)) => {
                write!(f, "[")?;
                write_items(f, values.iter())?;
                write!(f, "]")
            }
            // Only the realized prefix is shown; rendering never pulls
            Value::List(Sequence::Lazy(lazy)) => {
                let realized = lazy.realized();
                write!(f, "[")?;
                write_items(f, realized.iter())?;
                if !lazy.is_exhausted() {
                    if !realized.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "...")?;
                }
                write!(f, "]")
            }
            Value::Function(callable) => write!(f, "{callable}"),
        }
    }
}
