use crate::ast::{Token, TokenKind};
use crate::error::SyntaxError;

/// Converts expression source text into a positioned token stream.
///
/// Lexical problems (an unexpected character, an unterminated string, a
/// bad escape) come back as `Err(SyntaxError)` rather than panicking, so
/// the parser can record them and keep going.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if self.current_char() == Some('\n') {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<TokenKind, SyntaxError> {
        let (line, column) = (self.line, self.column);
        let mut result = String::new();
        self.advance(); // consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(TokenKind::String(result));
                }
                '\\' => {
                    self.advance();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        Some('\\') => result.push('\\'),
                        Some(other) => {
                            return Err(SyntaxError::new(
                                format!("invalid escape sequence '\\{}'", other),
                                self.line,
                                self.column.saturating_sub(1),
                            ));
                        }
                        None => {
                            return Err(SyntaxError::new(
                                "unterminated string literal",
                                line,
                                column,
                            ));
                        }
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(SyntaxError::new(
            "unterminated string literal",
            line,
            column,
        ))
    }

    /// Integral text that fits a 32-bit range lexes as an integer; larger
    /// integral text and anything with a fraction lexes as a float. This
    /// split is what the numeric widening rules build on.
    fn read_number(&mut self) -> TokenKind {
        let mut number = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if is_float {
            TokenKind::Float(number.parse::<f64>().unwrap_or(f64::NAN))
        } else if let Ok(n) = number.parse::<i32>() {
            TokenKind::Integer(i64::from(n))
        } else {
            TokenKind::Float(number.parse::<f64>().unwrap_or(f64::NAN))
        }
    }

    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.skip_whitespace();

        let (line, column) = (self.line, self.column);
        let kind = match self.current_char() {
            None => TokenKind::Eof,
            Some('$') => {
                self.advance();
                TokenKind::Dollar
            }
            Some('@') => {
                self.advance();
                TokenKind::At
            }
            Some('.') => {
                self.advance();
                TokenKind::Dot
            }
            Some(',') => {
                self.advance();
                TokenKind::Comma
            }
            Some('+') => {
                self.advance();
                TokenKind::Plus
            }
            Some('-') => {
                self.advance();
                TokenKind::Minus
            }
            Some('*') => {
                self.advance();
                TokenKind::Star
            }
            Some('/') => {
                self.advance();
                TokenKind::Slash
            }
            Some('%') => {
                self.advance();
                TokenKind::Percent
            }
            Some('?') => {
                self.advance();
                TokenKind::Question
            }
            Some(':') => {
                self.advance();
                TokenKind::Colon
            }
            Some('=') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    TokenKind::EqEq
                } else {
                    self.advance();
                    return Err(SyntaxError::new(
                        "unexpected '=' (did you mean '==')",
                        line,
                        column,
                    ));
                }
            }
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    TokenKind::NotEq
                } else {
                    self.advance();
                    return Err(SyntaxError::new(
                        "unexpected '!' (did you mean '!=' or 'not')",
                        line,
                        column,
                    ));
                }
            }
            Some('>') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    TokenKind::GtEq
                } else {
                    self.advance();
                    TokenKind::Gt
                }
            }
            Some('<') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    TokenKind::LtEq
                } else {
                    self.advance();
                    TokenKind::Lt
                }
            }
            Some('&') => {
                if self.peek_char(1) == Some('&') {
                    self.advance();
                    self.advance();
                    TokenKind::And
                } else {
                    self.advance();
                    return Err(SyntaxError::new(
                        "unexpected '&' (did you mean '&&' or 'and')",
                        line,
                        column,
                    ));
                }
            }
            Some('|') => {
                if self.peek_char(1) == Some('|') {
                    self.advance();
                    self.advance();
                    TokenKind::Or
                } else {
                    self.advance();
                    return Err(SyntaxError::new(
                        "unexpected '|' (did you mean '||' or 'or')",
                        line,
                        column,
                    ));
                }
            }
            Some('(') => {
                self.advance();
                TokenKind::LParen
            }
            Some(')') => {
                self.advance();
                TokenKind::RParen
            }
            Some('[') => {
                self.advance();
                TokenKind::LBracket
            }
            Some(']') => {
                self.advance();
                TokenKind::RBracket
            }
            Some('"') => self.read_string('"')?,
            Some('\'') => self.read_string('\'')?,
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();
                match ident.as_str() {
                    "and" => TokenKind::And,
                    "or" => TokenKind::Or,
                    "not" => TokenKind::Not,
                    "true" => TokenKind::Boolean(true),
                    "false" => TokenKind::Boolean(false),
                    "null" => TokenKind::Null,
                    _ => TokenKind::Identifier(ident),
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) => {
                self.advance();
                return Err(SyntaxError::new(
                    format!("unexpected character '{}'", ch),
                    line,
                    column,
                ));
            }
        };

        Ok(Token::new(kind, line, column))
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("and or not true false null");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::And);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Or);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Not);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Boolean(true));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Boolean(false));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Null);
}

#[test]
fn test_filter_tokens() {
    let mut lexer = Lexer::new("$.orders[?(@.total > 5)]");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Dollar);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Dot);
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::Identifier("orders".to_string())
    );
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::LBracket);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Question);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::LParen);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::At);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Dot);
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::Identifier("total".to_string())
    );
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Gt);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Integer(5));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::RParen);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::RBracket);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
}

#[test]
fn test_wide_integral_literal_lexes_as_float() {
    let mut lexer = Lexer::new("2147483647 2147483648 20000000000");
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::Integer(2147483647)
    );
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::Float(2147483648.0)
    );
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::Float(20000000000.0)
    );
}

#[test]
fn test_positions() {
    let mut lexer = Lexer::new("5 >> 3");
    let five = lexer.next_token().unwrap();
    assert_eq!((five.line, five.column), (1, 0));
    let first_gt = lexer.next_token().unwrap();
    assert_eq!((first_gt.kind, first_gt.column), (TokenKind::Gt, 2));
    let second_gt = lexer.next_token().unwrap();
    assert_eq!((second_gt.kind, second_gt.column), (TokenKind::Gt, 3));
}
