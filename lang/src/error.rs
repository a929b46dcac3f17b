use crate::lexer::LexError;
use crate::parser::ParseError;
use crate::runtime::RuntimeError;
use std::fmt;

/// Unified error type for reading and evaluating literals
#[derive(Debug)]
pub enum GlyphError {
    Lex(LexError),
    Parse(ParseError),
    Runtime(RuntimeError),
}

impl From<LexError> for GlyphError {
    fn from(err: LexError) -> Self {
        GlyphError::Lex(err)
    }
}

impl From<ParseError> for GlyphError {
    fn from(err: ParseError) -> Self {
        GlyphError::Parse(err)
    }
}

impl From<RuntimeError> for GlyphError {
    fn from(err: RuntimeError) -> Self {
        GlyphError::Runtime(err)
    }
}

impl fmt::Display for GlyphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlyphError::Lex(err) => write!(
                f,
                "Lexical error at line {}, column {}: {}",
                err.line, err.column, err.message
            ),
            GlyphError::Parse(err) => write!(
                f,
                "Parse error at line {}, column {}: {}",
                err.span.line, err.span.column, err.message
            ),
            GlyphError::Runtime(err) => write!(f, "Runtime error: {err}"),
        }
    }
}

impl std::error::Error for GlyphError {}

impl GlyphError {
    /// Message followed by the offending line of `source` and a caret under the error position
    pub fn render_line(&self, source: &str) -> String {
        let (line, column) = match self {
            GlyphError::Lex(err) => (err.line, err.column),
            GlyphError::Parse(err) => (err.span.line, err.span.column),
            GlyphError::Runtime(_) => return self.to_string(),
        };
        let text = source
            .lines()
            .nth((line as usize).saturating_sub(1))
            .unwrap_or_default();
        let pad = " ".repeat((column as usize).saturating_sub(1));
        format!("{self}\n  {text}\n  {pad}^")
    }
}
