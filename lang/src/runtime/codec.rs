//! Decoding of string-like literal tokens

use super::error::RuntimeError;
use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    PlainString,
    CompressedString,
    CompressedNumber,
}

/// String-like token handed over by the source lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalToken {
    pub kind: TokenKind,
    pub value: String,
}

impl LexicalToken {
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Decoder for compressed literals
pub trait Codec {
    fn decompress_string(&self, encoded: &str) -> Result<String, RuntimeError>;
    fn decompress_number(&self, encoded: &str) -> Result<Value, RuntimeError>;
}

/// Codec used when none is configured: every compressed token is rejected
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableCodec;

impl Codec for UnavailableCodec {
    fn decompress_string(&self, encoded: &str) -> Result<String, RuntimeError> {
        Err(RuntimeError::codec(format!(
            "no codec available to decompress string \"{encoded}\""
        )))
    }

    fn decompress_number(&self, encoded: &str) -> Result<Value, RuntimeError> {
        Err(RuntimeError::codec(format!(
            "no codec available to decompress number \"{encoded}\""
        )))
    }
}

/// Literal value of `token`, decompressing through `codec` where needed
pub fn uncompress(token: &LexicalToken, codec: &dyn Codec) -> Result<Value, RuntimeError> {
    match token.kind {
        TokenKind::PlainString => Ok(Value::text(token.value.as_str())),
        TokenKind::CompressedString => codec.decompress_string(&token.value).map(Value::text),
        TokenKind::CompressedNumber => codec.decompress_number(&token.value),
    }
}
