//! Pull-based lazy sequences.
//!
//! A [`LazySequence`] is a handle onto a shared buffer holding the realized
//! prefix and a single [`Generator`]. Duplicated handles share both, so an
//! element is produced at most once no matter how many copies read it.

use im_rc::Vector;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::context::Context;
use super::dispatch::{Callable, apply};
use super::error::{ErrorKind, RuntimeError};
use super::value::{Sequence, Value};

type NativeGenerator = Box<dyn FnMut(&mut Context) -> Result<Option<Value>, RuntimeError>>;

/// Producer variants backing a lazy sequence
pub enum Generator {
    /// Integers in `current..end`
    Range { current: BigInt, end: BigInt },

    /// initial, step(initial), ... until a value repeats its predecessor
    FixedPoint {
        step: Callable,
        initial: Option<Value>,
        previous: Option<Value>,
    },

    /// Left fold over each prefix of length 2..=len
    Scan {
        combiner: Callable,
        vector: Vector<Value>,
        accumulator: Option<Value>,
        index: usize,
    },

    /// initial, step(initial), ... while the predicate holds
    CollectUntilFalse {
        step: Callable,
        predicate: Callable,
        current: Value,
        started: bool,
    },

    /// Rows across all sources, padding exhausted ones with 0
    Zip { sources: Vec<Sequence>, index: usize },

    /// Host-supplied producer
    Native(NativeGenerator),
}

impl Generator {
    fn next(&mut self, ctx: &mut Context) -> Result<Option<Value>, RuntimeError> {
        match self {
            Generator::Range { current, end } => {
                if *current >= *end {
                    return Ok(None);
                }
                let value = Value::Number(BigRational::from_integer(current.clone()));
                *current += BigInt::one();
                Ok(Some(value))
            }

            Generator::FixedPoint {
                step,
                initial,
                previous,
            } => {
                if let Some(first) = initial.take() {
                    *previous = Some(deep_copy(&first));
                    return Ok(Some(first));
                }
                let Some(last) = previous.clone() else {
                    return Ok(None);
                };
                let next = apply(step, vec![deep_copy(&last)], ctx)?;
                // `last` is a snapshot taken before `next` escaped to the caller
                if next.structurally_equals(&last, ctx)? {
                    *previous = None;
                    return Ok(None);
                }
                *previous = Some(deep_copy(&next));
                Ok(Some(next))
            }

            Generator::Scan {
                combiner,
                vector,
                accumulator,
                index,
            } => {
                if *index >= vector.len() {
                    return Ok(None);
                }
                let (Some(left), Some(right)) = (
                    accumulator.clone().or_else(|| vector.front().cloned()),
                    vector.get(*index).cloned(),
                ) else {
                    return Ok(None);
                };
                let folded = apply(combiner, vec![left, right], ctx)?;
                *accumulator = Some(folded.clone());
                *index += 1;
                Ok(Some(folded))
            }

            Generator::CollectUntilFalse {
                step,
                predicate,
                current,
                started,
            } => {
                let candidate = if *started {
                    apply(step, vec![current.clone()], ctx)?
                } else {
                    current.clone()
                };
                let verdict = apply(predicate, vec![candidate.clone()], ctx)?;
                let keep = verdict.is_truthy(ctx)?;
                // State moves only after the predicate has answered
                *current = candidate.clone();
                *started = true;
                Ok(keep.then_some(candidate))
            }

            Generator::Zip { sources, index } => {
                let mut row = Vec::with_capacity(sources.len());
                let mut exhausted = 0;
                for source in sources.iter() {
                    match source.get(*index, ctx)? {
                        Some(item) => row.push(item),
                        None => {
                            row.push(Value::int(0));
                            exhausted += 1;
                        }
                    }
                }
                if exhausted == sources.len() {
                    return Ok(None);
                }
                *index += 1;
                Ok(Some(Value::list(row)))
            }

            Generator::Native(produce) => produce(ctx),
        }
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generator::Range { current, end } => write!(f, "Range({current}..{end})"),
            Generator::FixedPoint { step, .. } => write!(f, "FixedPoint({step})"),
            Generator::Scan { combiner, index, .. } => write!(f, "Scan({combiner}, at {index})"),
            Generator::CollectUntilFalse { step, .. } => write!(f, "CollectUntilFalse({step})"),
            Generator::Zip { sources, index } => write!(f, "Zip({} sources, at {index})", sources.len()),
            Generator::Native(_) => write!(f, "Native"),
        }
    }
}

enum State {
    Ready(Generator),
    /// Generator is checked out while it produces an element
    Running,
    Done,
}

struct Buffer {
    realized: Vec<Value>,
    state: State,
}

/// Restartable, duplicable lazy sequence
#[derive(Clone)]
pub struct LazySequence {
    buffer: Rc<RefCell<Buffer>>,
    cursor: usize,
}

impl LazySequence {
    pub fn new(generator: Generator) -> Self {
        Self {
            buffer: Rc::new(RefCell::new(Buffer {
                realized: Vec::new(),
                state: State::Ready(generator),
            })),
            cursor: 0,
        }
    }

    pub fn from_fn(
        produce: impl FnMut(&mut Context) -> Result<Option<Value>, RuntimeError> + 'static,
    ) -> Self {
        Self::new(Generator::Native(Box::new(produce)))
    }

    /// Integers in `start..end`
    pub fn range(start: BigInt, end: BigInt) -> Self {
        Self::new(Generator::Range {
            current: start,
            end,
        })
    }

    /// Realize elements until `len` exist; false if the generator ran out first
    fn realize_to(&self, len: usize, ctx: &mut Context) -> Result<bool, RuntimeError> {
        loop {
            let mut generator = {
                let mut buffer = self.buffer.borrow_mut();
                if buffer.realized.len() >= len {
                    return Ok(true);
                }
                match std::mem::replace(&mut buffer.state, State::Running) {
                    State::Ready(generator) => generator,
                    State::Running => {
                        return Err(RuntimeError::new(
                            ErrorKind::Reentrant,
                            "lazy sequence pulled while producing its own next element",
                        ));
                    }
                    State::Done => {
                        buffer.state = State::Done;
                        return Ok(false);
                    }
                }
            };

            // No borrow is held here so the generator may read other handles
            let produced = generator.next(ctx);

            let mut buffer = self.buffer.borrow_mut();
            match produced {
                Ok(Some(value)) => {
                    buffer.realized.push(value);
                    buffer.state = State::Ready(generator);
                }
                Ok(None) => {
                    buffer.state = State::Done;
                    return Ok(buffer.realized.len() >= len);
                }
                Err(err) => {
                    buffer.state = State::Ready(generator);
                    return Err(err);
                }
            }
        }
    }

    pub fn get(&self, index: usize, ctx: &mut Context) -> Result<Option<Value>, RuntimeError> {
        if !self.realize_to(index.saturating_add(1), ctx)? {
            return Ok(None);
        }
        Ok(self.buffer.borrow().realized.get(index).cloned())
    }

    /// Forces every element. Does not return for unbounded sequences.
    pub fn len(&self, ctx: &mut Context) -> Result<usize, RuntimeError> {
        self.realize_to(usize::MAX, ctx)?;
        Ok(self.buffer.borrow().realized.len())
    }

    pub fn force(&self, ctx: &mut Context) -> Result<Vector<Value>, RuntimeError> {
        self.realize_to(usize::MAX, ctx)?;
        Ok(self.buffer.borrow().realized.iter().cloned().collect())
    }

    pub fn contains(&self, needle: &Value, ctx: &mut Context) -> Result<bool, RuntimeError> {
        let mut index = 0;
        while let Some(item) = self.get(index, ctx)? {
            if item.structurally_equals(needle, ctx)? {
                return Ok(true);
            }
            index += 1;
        }
        Ok(false)
    }

    /// Next element from this handle's own cursor
    pub fn next(&mut self, ctx: &mut Context) -> Result<Option<Value>, RuntimeError> {
        let item = self.get(self.cursor, ctx)?;
        if item.is_some() {
            self.cursor += 1;
        }
        Ok(item)
    }

    /// New handle over the same buffer with its own cursor; realizes nothing
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    pub fn realized_len(&self) -> usize {
        self.buffer.borrow().realized.len()
    }

    pub fn realized(&self) -> Vec<Value> {
        self.buffer.borrow().realized.clone()
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.buffer.borrow().state, State::Done)
    }

    pub fn ptr_eq(&self, other: &LazySequence) -> bool {
        Rc::ptr_eq(&self.buffer, &other.buffer)
    }
}

impl fmt::Debug for LazySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buffer = self.buffer.borrow();
        let state = match &buffer.state {
            State::Ready(generator) => format!("{generator:?}"),
            State::Running => "Running".to_string(),
            State::Done => "Done".to_string(),
        };
        f.debug_struct("LazySequence")
            .field("realized", &self.realized_len())
            .field("cursor", &self.cursor)
            .field("state", &state)
            .finish()
    }
}

/// Repeatedly apply `step` from `initial`, stopping before the first value equal to its predecessor
pub fn fixed_point(step: &Callable, initial: Value) -> LazySequence {
    LazySequence::new(Generator::FixedPoint {
        step: step.clone(),
        initial: Some(initial),
        previous: None,
    })
}

/// Cumulative reduction: element i is the fold of the first i + 1 items
pub fn scanl(combiner: &Callable, vector: Vector<Value>) -> LazySequence {
    LazySequence::new(Generator::Scan {
        combiner: combiner.clone(),
        vector,
        accumulator: None,
        index: 1,
    })
}

/// initial, step(initial), ... for as long as `predicate` holds
pub fn collect_until_false(step: &Callable, predicate: &Callable, initial: Value) -> LazySequence {
    LazySequence::new(Generator::CollectUntilFalse {
        step: step.clone(),
        predicate: predicate.clone(),
        current: initial,
        started: false,
    })
}

/// Zip that pads shorter sources with 0 and ends when every source is exhausted
pub fn zip_fill(sources: Vec<Sequence>) -> LazySequence {
    LazySequence::new(Generator::Zip { sources, index: 0 })
}

/// Left fold of `vector` by `combiner`; 0 when empty
pub fn fold_left(
    combiner: &Callable,
    vector: &Vector<Value>,
    ctx: &mut Context,
) -> Result<Value, RuntimeError> {
    let mut items = vector.iter();
    let Some(first) = items.next() else {
        return Ok(Value::int(0));
    };
    let mut working = first.clone();
    for item in items {
        working = apply(combiner, vec![working, item.clone()], ctx)?;
    }
    Ok(working)
}

/// Snapshot that can be iterated or mutated without touching the original
pub fn deep_copy(value: &Value) -> Value {
    match value {
        Value::List(sequence) => Value::List(sequence.duplicate()),
        scalar => scalar.clone(),
    }
}
