pub mod ast;
mod eval;


pub use ast::*;
pub use eval::{evaluate, read_literal};

use crate::lexer::{Span, Token, TokenKind};
use crate::runtime::coerce::parse_decimal;

/// Which expressions the parser accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// Numbers, strings, booleans, lists and tuples; a sign only directly before a number
    Literal,
    /// Literals combined with `+ - * / %`, unary signs and grouping
    Arithmetic,
}

/// Deepest nesting of lists, groups and operands accepted in one expression
pub const MAX_NESTING: usize = 256;

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    grammar: Grammar,
    depth: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}:{}",
            self.message, self.span.line, self.span.column
        )
    }
}

// Precedence levels for Pratt parsing (higher = binds tighter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    None = 0,
    Sum = 1,     // + -
    Product = 2, // * / %
    Prefix = 3,  // - + (unary)
}

const START_SPAN: Span = Span {
    start: 0,
    end: 0,
    line: 1,
    column: 1,
};

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Eof => kind.to_string(),
        other => format!("'{other}'"),
    }
}

fn join(from: Span, to: Span) -> Span {
    Span {
        start: from.start,
        end: to.end,
        line: from.line,
        column: from.column,
    }
}

impl Parser {
    pub fn new(tokens: Vec<Token>, grammar: Grammar) -> Self {
        Self {
            tokens,
            position: 0,
            grammar,
            depth: 0,
        }
    }

    /// Parse a single expression spanning the whole input
    pub fn parse(&mut self) -> Result<SpannedExpr, ParseError> {
        let expr = self.parse_expression()?;
        if let Some(token) = self.peek()
            && token.kind != TokenKind::Eof
        {
            return Err(ParseError::new(
                format!("Unexpected {} after expression", describe(&token.kind)),
                token.span,
            ));
        }
        Ok(expr)
    }

    pub fn parse_expression(&mut self) -> Result<SpannedExpr, ParseError> {
        self.parse_precedence(Precedence::None)
    }

    fn parse_precedence(&mut self, min_precedence: Precedence) -> Result<SpannedExpr, ParseError> {
        if self.depth >= MAX_NESTING {
            let span = self.peek().map(|t| t.span).unwrap_or(START_SPAN);
            return Err(ParseError::new(
                format!("Expression nested deeper than {MAX_NESTING} levels"),
                span,
            ));
        }
        self.depth += 1;
        let result = self.parse_operand_chain(min_precedence);
        self.depth -= 1;
        result
    }

    fn parse_operand_chain(&mut self, min_precedence: Precedence) -> Result<SpannedExpr, ParseError> {
        let mut left = self.parse_prefix()?;

        while let Some(op) = self.peek().and_then(|t| self.get_infix_op(&t.kind)) {
            let precedence = Self::infix_precedence(op);
            if precedence <= min_precedence {
                break;
            }

            left = self.parse_infix(left, op, precedence)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<SpannedExpr, ParseError> {
        let token = self.bump()?;

        match token.kind {
            TokenKind::Number(text) => Self::number(&text, token.span),
            TokenKind::String(s) => Ok(Spanned::new(Expr::String(s), token.span)),
            TokenKind::True => Ok(Spanned::new(Expr::Boolean(true), token.span)),
            TokenKind::False => Ok(Spanned::new(Expr::Boolean(false), token.span)),

            kind @ (TokenKind::Minus | TokenKind::Plus) => {
                let op = if kind == TokenKind::Minus {
                    PrefixOp::Neg
                } else {
                    PrefixOp::Plus
                };
                if self.grammar == Grammar::Literal
                    && !matches!(self.peek().map(|t| &t.kind), Some(TokenKind::Number(_)))
                {
                    return Err(ParseError::new(
                        format!("Expected a number after unary {op}"),
                        token.span,
                    ));
                }
                let right = self.parse_precedence(Precedence::Prefix)?;
                let span = join(token.span, right.span);
                Ok(Spanned::new(
                    Expr::Prefix {
                        op,
                        right: Box::new(right),
                    },
                    span,
                ))
            }

            TokenKind::LeftBracket => self.parse_list(token.span),
            TokenKind::LeftParen => self.parse_tuple_or_group(token.span),

            kind => Err(ParseError::new(
                format!("Unexpected {}", describe(&kind)),
                token.span,
            )),
        }
    }

    fn parse_infix(
        &mut self,
        left: SpannedExpr,
        op: InfixOp,
        precedence: Precedence,
    ) -> Result<SpannedExpr, ParseError> {
        self.bump()?;
        let right = self.parse_precedence(precedence)?;
        let span = join(left.span, right.span);
        Ok(Spanned::new(
            Expr::Infix {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        ))
    }

    fn infix_precedence(op: InfixOp) -> Precedence {
        match op {
            InfixOp::Add | InfixOp::Sub => Precedence::Sum,
            InfixOp::Mul | InfixOp::Div | InfixOp::Mod => Precedence::Product,
        }
    }

    fn get_infix_op(&self, kind: &TokenKind) -> Option<InfixOp> {
        if self.grammar == Grammar::Literal {
            return None;
        }
        match kind {
            TokenKind::Plus => Some(InfixOp::Add),
            TokenKind::Minus => Some(InfixOp::Sub),
            TokenKind::Star => Some(InfixOp::Mul),
            TokenKind::Slash => Some(InfixOp::Div),
            TokenKind::Percent => Some(InfixOp::Mod),
            _ => None,
        }
    }

    fn number(text: &str, span: Span) -> Result<SpannedExpr, ParseError> {
        let value = parse_decimal(text)
            .ok_or_else(|| ParseError::new(format!("Invalid number literal: {text}"), span))?;
        Ok(Spanned::new(Expr::Number(value), span))
    }

    /// Comma-separated expressions up to `close`, allowing a trailing comma
    fn parse_elements(&mut self, close: TokenKind) -> Result<(Vec<SpannedExpr>, Span), ParseError> {
        let mut elements = Vec::new();

        while !self.check(&close) && !self.is_at_end() {
            elements.push(self.parse_expression()?);

            if !self.check(&close) {
                self.expect(TokenKind::Comma)?;
            }
        }

        let end_token = self.expect(close)?;
        Ok((elements, end_token.span))
    }

    fn parse_list(&mut self, start_span: Span) -> Result<SpannedExpr, ParseError> {
        let (elements, end_span) = self.parse_elements(TokenKind::RightBracket)?;
        Ok(Spanned::new(Expr::List(elements), join(start_span, end_span)))
    }

    /// `()` and `(a, ...)` are tuples, read as lists; `(a)` is grouping
    fn parse_tuple_or_group(&mut self, start_span: Span) -> Result<SpannedExpr, ParseError> {
        if self.check(&TokenKind::RightParen) {
            let end_span = self.bump()?.span;
            return Ok(Spanned::new(Expr::List(Vec::new()), join(start_span, end_span)));
        }

        let first = self.parse_expression()?;
        if self.check(&TokenKind::RightParen) {
            let end_span = self.bump()?.span;
            return Ok(Spanned::new(first.node, join(start_span, end_span)));
        }

        self.expect(TokenKind::Comma)?;
        let (mut rest, end_span) = self.parse_elements(TokenKind::RightParen)?;
        rest.insert(0, first);
        Ok(Spanned::new(Expr::List(rest), join(start_span, end_span)))
    }

    // Helper methods

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Consume the next token; running off the end is an error
    fn bump(&mut self) -> Result<Token, ParseError> {
        match self.tokens.get(self.position) {
            Some(token) if token.kind != TokenKind::Eof => {
                self.position += 1;
                Ok(token.clone())
            }
            other => Err(ParseError::new(
                "Unexpected end of input",
                other
                    .or(self.tokens.last())
                    .map(|t| t.span)
                    .unwrap_or(START_SPAN),
            )),
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek().map(|t| &t.kind == kind).unwrap_or(false)
    }

    fn is_at_end(&self) -> bool {
        self.peek()
            .map(|t| t.kind == TokenKind::Eof)
            .unwrap_or(true)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(&kind) {
            return self.bump();
        }
        let token = self.peek();
        let span = token.map(|t| t.span).unwrap_or(START_SPAN);
        let found = describe(token.map(|t| &t.kind).unwrap_or(&TokenKind::Eof));
        Err(ParseError::new(
            format!("Expected {}, got {found}", describe(&kind)),
            span,
        ))
    }
}
