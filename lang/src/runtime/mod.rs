//! Runtime support: values, dispatch, lazy sequences, coercion and input

pub mod base;
pub mod codec;
pub mod coerce;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod input;
pub mod lazy;
pub mod mold;
pub mod text;
pub mod value;


pub use context::{Context, Flags, InputSource};
pub use dispatch::{Callable, CallableKind, CallableTag, apply, apply_value};
pub use error::{ErrorKind, RuntimeError};
pub use input::{LineReader, NoInput, ScriptedReader, TerminalReader, next_input, pop};
pub use lazy::{Generator, LazySequence};
pub use value::{Sequence, Value};
