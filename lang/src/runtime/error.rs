use std::fmt;

/// Category of a runtime failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// mold ran out of content while filling a shape leaf
    MalformedShape,
    /// Callee is not a callable value
    UnsupportedCallable,
    /// Primitive called with an argument count outside its declared range
    Arity,
    /// Operand of the wrong type
    Type,
    /// Operand outside the domain of an operation (base < 2, division by zero, ...)
    Domain,
    /// Compressed token with no codec able to decode it
    Codec,
    /// Lazy sequence pulled from inside its own generator
    Reentrant,
    /// Raised by a user-supplied callable
    User,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::MalformedShape => "malformed shape",
            ErrorKind::UnsupportedCallable => "unsupported callable",
            ErrorKind::Arity => "arity mismatch",
            ErrorKind::Type => "type mismatch",
            ErrorKind::Domain => "domain error",
            ErrorKind::Codec => "codec error",
            ErrorKind::Reentrant => "re-entrant sequence",
            ErrorKind::User => "error",
        }
    }
}

/// Runtime error with a category and message
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn malformed_shape(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedShape, message)
    }

    pub fn unsupported_callable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedCallable, message)
    }

    pub fn arity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Arity, message)
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, message)
    }

    pub fn domain(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Domain, message)
    }

    pub fn codec(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Codec, message)
    }

    pub fn user(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::User, message)
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.message)
    }
}

impl std::error::Error for RuntimeError {}
