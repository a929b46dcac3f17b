//! Runtime-support layer for a terse, stack-based language: uniform callable
//! dispatch, lazy sequences, exact-number coercions, reshaping, implicit
//! input and base conversion.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;

pub use error::GlyphError;
pub use parser::{Grammar, read_literal};
pub use runtime::{Callable, Context, Flags, RuntimeError, Value, apply};
