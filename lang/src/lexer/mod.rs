mod token;


pub use token::{Span, Token, TokenKind};

use std::str::Chars;

pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    position: usize,
    line: u32,
    column: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}:{}", self.message, self.line, self.column)
    }
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let start_position = self.position;
        let start_line = self.line;
        let start_column = self.column;

        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some(c) => match c {
                '(' => self.single(TokenKind::LeftParen),
                ')' => self.single(TokenKind::RightParen),
                '[' => self.single(TokenKind::LeftBracket),
                ']' => self.single(TokenKind::RightBracket),
                ',' => self.single(TokenKind::Comma),
                '+' => self.single(TokenKind::Plus),
                '-' => self.single(TokenKind::Minus),
                '*' => self.single(TokenKind::Star),
                '/' => self.single(TokenKind::Slash),
                '%' => self.single(TokenKind::Percent),

                '"' | '\'' => self.string(c)?,

                c if c.is_ascii_digit() => self.number(),
                '.' if self.peek_next().is_some_and(|c| c.is_ascii_digit()) => self.number(),

                c if c.is_ascii_alphabetic() => self.keyword()?,

                c => {
                    return Err(LexError {
                        message: format!("Unexpected character: '{c}'"),
                        line: start_line,
                        column: start_column,
                    });
                }
            },
        };

        let span = Span {
            start: start_position,
            end: self.position,
            line: start_line,
            column: start_column,
        };

        Ok(Token { kind, span })
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.chars.clone();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn keyword(&mut self) -> Result<TokenKind, LexError> {
        let start = self.position;
        let start_line = self.line;
        let start_column = self.column;

        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        match &self.source[start..self.position] {
            "True" => Ok(TokenKind::True),
            "False" => Ok(TokenKind::False),
            text => Err(LexError {
                message: format!("Unknown name: {text}"),
                line: start_line,
                column: start_column,
            }),
        }
    }

    fn digits(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn number(&mut self) -> TokenKind {
        let start = self.position;

        self.digits();
        if self.peek() == Some('.') {
            self.advance();
            self.digits();
        }

        let text = &self.source[start..self.position];
        TokenKind::Number(text.chars().filter(|&c| c != '_').collect())
    }

    fn string(&mut self, quote: char) -> Result<TokenKind, LexError> {
        let start_line = self.line;
        let start_column = self.column;

        self.advance();

        let mut value = String::new();

        loop {
            match self.peek() {
                None => {
                    return Err(LexError {
                        message: "Unterminated string literal".to_string(),
                        line: start_line,
                        column: start_column,
                    });
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.peek() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some(c @ ('\\' | '"' | '\'')) => c,
                        Some(c) => {
                            return Err(LexError {
                                message: format!("Invalid escape sequence: \\{c}"),
                                line: self.line,
                                column: self.column,
                            });
                        }
                        None => {
                            return Err(LexError {
                                message: "Unterminated string literal".to_string(),
                                line: start_line,
                                column: start_column,
                            });
                        }
                    };
                    self.advance();
                    value.push(escaped);
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }

        Ok(TokenKind::String(value))
    }
}
