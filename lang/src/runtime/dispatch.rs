//! Uniform invocation of primitives, closures and named functions

use std::fmt;
use std::rc::Rc;
use tracing::trace;

use super::context::Context;
use super::error::RuntimeError;
use super::value::Value;

pub type PrimitiveBody = dyn Fn(&[Value], &mut Context) -> Result<Value, RuntimeError>;

/// `(args, itself, arity, ctx)` to the resulting stack
pub type ClosureBody =
    dyn Fn(Vec<Value>, &Callable, usize, &mut Context) -> Result<Vec<Value>, RuntimeError>;

/// `(args, itself, ctx)` to the resulting stack
pub type FunctionBody = dyn Fn(Vec<Value>, &Callable, &mut Context) -> Result<Vec<Value>, RuntimeError>;

/// Calling convention, fixed when the callable is created
pub enum CallableKind {
    Primitive {
        name: String,
        arity: (usize, usize),
        body: Box<PrimitiveBody>,
    },
    Closure {
        body: Box<ClosureBody>,
    },
    Named {
        name: String,
        body: Box<FunctionBody>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableTag {
    Primitive,
    Closure,
    Named,
}

impl CallableTag {
    pub fn name(self) -> &'static str {
        match self {
            CallableTag::Primitive => "primitive",
            CallableTag::Closure => "closure",
            CallableTag::Named => "function",
        }
    }
}

/// Shared handle to an invocable unit
#[derive(Clone)]
pub struct Callable(Rc<CallableKind>);

impl Callable {
    pub fn primitive(
        name: impl Into<String>,
        arity: (usize, usize),
        body: impl Fn(&[Value], &mut Context) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        Callable(Rc::new(CallableKind::Primitive {
            name: name.into(),
            arity,
            body: Box::new(body),
        }))
    }

    pub fn closure(
        body: impl Fn(Vec<Value>, &Callable, usize, &mut Context) -> Result<Vec<Value>, RuntimeError>
        + 'static,
    ) -> Self {
        Callable(Rc::new(CallableKind::Closure {
            body: Box::new(body),
        }))
    }

    pub fn named(
        name: impl Into<String>,
        body: impl Fn(Vec<Value>, &Callable, &mut Context) -> Result<Vec<Value>, RuntimeError> + 'static,
    ) -> Self {
        Callable(Rc::new(CallableKind::Named {
            name: name.into(),
            body: Box::new(body),
        }))
    }

    pub fn tag(&self) -> CallableTag {
        match &*self.0 {
            CallableKind::Primitive { .. } => CallableTag::Primitive,
            CallableKind::Closure { .. } => CallableTag::Closure,
            CallableKind::Named { .. } => CallableTag::Named,
        }
    }

    pub fn name(&self) -> &str {
        match &*self.0 {
            CallableKind::Primitive { name, .. } | CallableKind::Named { name, .. } => name,
            CallableKind::Closure { .. } => "λ",
        }
    }

    pub fn kind(&self) -> &CallableKind {
        &self.0
    }

    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({} {})", self.tag().name(), self.name())
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            CallableKind::Primitive { name, .. } => write!(f, "<primitive {name}>"),
            CallableKind::Closure { .. } => write!(f, "<closure>"),
            CallableKind::Named { name, .. } => write!(f, "<function {name}>"),
        }
    }
}

fn top_of_stack(mut stack: Vec<Value>) -> Value {
    stack.pop().unwrap_or_else(Value::empty_list)
}

/// Invoke `callable` with `args`, reducing the result to a single value.
///
/// Closures and named functions return a stack whose last element is the
/// result; an empty stack yields the empty list. Primitives have their
/// argument count checked against the declared range before the body runs.
pub fn apply(callable: &Callable, args: Vec<Value>, ctx: &mut Context) -> Result<Value, RuntimeError> {
    trace!(
        tag = callable.tag().name(),
        name = callable.name(),
        argc = args.len(),
        "dispatch"
    );

    match callable.kind() {
        CallableKind::Closure { body } => {
            let arity = args.len();
            body(args, callable, arity, ctx).map(top_of_stack)
        }
        CallableKind::Named { body, .. } => body(args, callable, ctx).map(top_of_stack),
        CallableKind::Primitive { name, arity, body } => {
            let (min_arity, max_arity) = *arity;
            if args.len() < min_arity || args.len() > max_arity {
                return Err(RuntimeError::arity(format!(
                    "{} expects {} argument(s), got {}",
                    name,
                    if min_arity == max_arity {
                        min_arity.to_string()
                    } else {
                        format!("{}-{}", min_arity, max_arity)
                    },
                    args.len()
                )));
            }
            body(&args, ctx)
        }
    }
}

/// Apply a value as a function; anything but a function is unsupported
pub fn apply_value(callee: &Value, args: Vec<Value>, ctx: &mut Context) -> Result<Value, RuntimeError> {
    match callee {
        Value::Function(callable) => apply(callable, args, ctx),
        other => Err(RuntimeError::unsupported_callable(format!(
            "Cannot call {}",
            other.type_name()
        ))),
    }
}
