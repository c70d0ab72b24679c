use crate::ast::{AttributeScope, BinOp, Expr, Function, Root, Token, TokenKind, UnaryOp};
use crate::error::SyntaxError;
use crate::lexer::Lexer;
use std::mem;

/// Grammar-driven recursive construction of the AST from the token stream.
///
/// Precedence, low to high: ternary, or, and, equality, relational,
/// additive, multiplicative, unary, postfix index/filter/call. Ternary is
/// right-associative; equality and relational are single-shot.
///
/// The parser never throws on malformed input. Problems (its own
/// mismatches and any errors the lexer reports) are collected into an
/// error list, one entry per recovery point, and parsing continues on a
/// best-effort basis. The caller decides the policy; compilation treats
/// one or more recorded errors as fatal.
pub struct Parser {
    lexer: Lexer,
    current: Token,
    errors: Vec<SyntaxError>,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        let mut parser = Parser {
            lexer: Lexer::new(input),
            current: Token::new(TokenKind::Eof, 1, 0),
            errors: Vec::new(),
        };
        parser.advance();
        parser
    }

    /// Parse a complete expression; trailing tokens are an error.
    pub fn parse(mut self) -> (Expr, Vec<SyntaxError>) {
        let expr = self.parse_expression();
        if !matches!(self.current.kind, TokenKind::Eof) {
            let message = format!(
                "unexpected token {} after expression",
                self.current.kind.describe()
            );
            self.error(message, self.current.line, self.current.column);
        }
        (expr, self.errors)
    }

    fn advance(&mut self) {
        loop {
            match self.lexer.next_token() {
                Ok(token) => {
                    self.current = token;
                    return;
                }
                Err(e) => self.errors.push(e),
            }
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        mem::discriminant(&self.current.kind) == mem::discriminant(kind)
    }

    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.check(&kind) {
            self.advance();
            true
        } else {
            let message = format!(
                "expected {}, found {}",
                kind.describe(),
                self.current.kind.describe()
            );
            self.error(message, self.current.line, self.current.column);
            false
        }
    }

    fn error(&mut self, message: impl Into<String>, line: u32, column: u32) {
        self.errors.push(SyntaxError::new(message, line, column));
    }

    fn parse_expression(&mut self) -> Expr {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Expr {
        let condition = self.parse_or();

        if self.check(&TokenKind::Question) {
            self.advance();
            let then_branch = self.parse_ternary();
            self.expect(TokenKind::Colon);
            let else_branch = self.parse_ternary();
            Expr::Ternary {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            }
        } else {
            condition
        }
    }

    fn parse_or(&mut self) -> Expr {
        let mut left = self.parse_and();

        while self.check(&TokenKind::Or) {
            self.advance();
            let right = self.parse_and();
            left = Expr::Binary {
                op: BinOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        left
    }

    fn parse_and(&mut self) -> Expr {
        let mut left = self.parse_equality();

        while self.check(&TokenKind::And) {
            self.advance();
            let right = self.parse_equality();
            left = Expr::Binary {
                op: BinOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        left
    }

    fn parse_equality(&mut self) -> Expr {
        let left = self.parse_relational();

        let op = match &self.current.kind {
            TokenKind::EqEq => Some(BinOp::Equal),
            TokenKind::NotEq => Some(BinOp::NotEqual),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let right = self.parse_relational();
            Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            }
        } else {
            left
        }
    }

    fn parse_relational(&mut self) -> Expr {
        let left = self.parse_additive();

        let op = match &self.current.kind {
            TokenKind::Lt => Some(BinOp::LessThan),
            TokenKind::Gt => Some(BinOp::GreaterThan),
            TokenKind::LtEq => Some(BinOp::LessEqual),
            TokenKind::GtEq => Some(BinOp::GreaterEqual),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let right = self.parse_additive();
            Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            }
        } else {
            left
        }
    }

    fn parse_additive(&mut self) -> Expr {
        let mut left = self.parse_multiplicative();

        loop {
            let op = match &self.current.kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Subtract,
                _ => break,
            };

            self.advance();
            let right = self.parse_multiplicative();
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        left
    }

    fn parse_multiplicative(&mut self) -> Expr {
        let mut left = self.parse_unary();

        loop {
            let op = match &self.current.kind {
                TokenKind::Star => BinOp::Multiply,
                TokenKind::Slash => BinOp::Divide,
                TokenKind::Percent => BinOp::Modulo,
                _ => break,
            };

            self.advance();
            let right = self.parse_unary();
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        left
    }

    fn parse_unary(&mut self) -> Expr {
        match &self.current.kind {
            TokenKind::Minus => {
                self.advance();
                Expr::Unary {
                    op: UnaryOp::Minus,
                    operand: Box::new(self.parse_unary()),
                }
            }
            TokenKind::Not => {
                self.advance();
                Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(self.parse_unary()),
                }
            }
            _ => self.parse_postfix(),
        }
    }

    /// Postfix access: dotted members, bracketed keys/indices, filters.
    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();

        loop {
            if self.check(&TokenKind::Dot) {
                self.advance();
                let name = match mem::replace(&mut self.current.kind, TokenKind::Eof) {
                    TokenKind::Identifier(name) => {
                        self.advance();
                        name
                    }
                    other => {
                        let message =
                            format!("expected member name after '.', found {}", other.describe());
                        self.error(message, self.current.line, self.current.column);
                        break;
                    }
                };
                expr = Expr::Access {
                    object: Box::new(expr),
                    key: Box::new(Expr::Key(name)),
                };
            } else if self.check(&TokenKind::LBracket) {
                self.advance();

                if self.check(&TokenKind::Question) {
                    self.advance();
                    self.expect(TokenKind::LParen);
                    let predicate = self.parse_expression();
                    self.expect(TokenKind::RParen);
                    self.expect(TokenKind::RBracket);
                    expr = Expr::Filter {
                        object: Box::new(expr),
                        predicate: Box::new(predicate),
                    };
                } else {
                    let key = self.parse_bracket_key();
                    self.expect(TokenKind::RBracket);
                    expr = Expr::Access {
                        object: Box::new(expr),
                        key: Box::new(key),
                    };
                }
            } else {
                break;
            }
        }
        expr
    }

    /// Inside brackets: a string literal is a member name (the escape
    /// form for reserved-looking names, `headers["empty"]`), an integer
    /// is an index, anything else is a computed key.
    fn parse_bracket_key(&mut self) -> Expr {
        match &self.current.kind {
            TokenKind::String(_) => {
                match mem::replace(&mut self.current.kind, TokenKind::Eof) {
                    TokenKind::String(name) => {
                        self.advance();
                        Expr::Key(name)
                    }
                    _ => unreachable!(),
                }
            }
            _ => self.parse_expression(),
        }
    }

    /// Primary expressions: literals, roots, array literals, grouping,
    /// function calls and the `xpath("...")` escape form.
    ///
    /// On an unexpected token the parser records one error, skips the
    /// token, and retries, so a single bad character run costs a single
    /// error entry.
    fn parse_primary(&mut self) -> Expr {
        loop {
            let (line, column) = (self.current.line, self.current.column);
            match mem::replace(&mut self.current.kind, TokenKind::Eof) {
                // Literals
                TokenKind::Integer(n) => {
                    self.advance();
                    return Expr::Integer(n);
                }
                TokenKind::Float(x) => {
                    self.advance();
                    return Expr::Float(x);
                }
                TokenKind::String(s) => {
                    self.advance();
                    return Expr::String(s);
                }
                TokenKind::Boolean(b) => {
                    self.advance();
                    return Expr::Boolean(b);
                }
                TokenKind::Null => {
                    self.advance();
                    return Expr::Null;
                }

                // References
                TokenKind::Dollar => {
                    self.advance();
                    return Expr::Root(Root::Payload);
                }
                TokenKind::At => {
                    self.advance();
                    return Expr::Current;
                }
                TokenKind::Identifier(name) => {
                    self.advance();
                    return self.parse_named(name, line, column);
                }

                // Grouping
                TokenKind::LParen => {
                    self.advance();
                    let expr = self.parse_expression();
                    self.expect(TokenKind::RParen);
                    return expr;
                }

                // Array literal
                TokenKind::LBracket => {
                    self.advance();
                    return self.parse_array_literal();
                }

                TokenKind::Eof => {
                    self.error("unexpected end of input", line, column);
                    return Expr::Null;
                }

                other => {
                    let message = format!("unexpected token {}", other.describe());
                    self.error(message, line, column);
                    self.advance();
                    // retry from the next token
                }
            }
        }
    }

    /// An identifier opens a root accessor, a function call, or the
    /// xpath escape form; a bare unknown identifier is a syntax error.
    fn parse_named(&mut self, name: String, line: u32, column: u32) -> Expr {
        match name.as_str() {
            "payload" => Expr::Root(Root::Payload),
            "vars" => Expr::Root(Root::Variables),
            "headers" => Expr::Root(Root::Headers),
            "attributes" => self.parse_attribute_root(),
            "xpath" => self.parse_xpath(line, column),
            _ if self.check(&TokenKind::LParen) => self.parse_call(&name, line, column),
            _ => {
                self.error(format!("unknown identifier '{}'", name), line, column);
                Expr::Null
            }
        }
    }

    fn parse_attribute_root(&mut self) -> Expr {
        if !self.expect(TokenKind::Dot) {
            return Expr::Null;
        }

        let (line, column) = (self.current.line, self.current.column);
        match mem::replace(&mut self.current.kind, TokenKind::Eof) {
            TokenKind::Identifier(scope) => {
                self.advance();
                match scope.as_str() {
                    "axis2" => Expr::Root(Root::Attributes(AttributeScope::Axis2)),
                    "synapse" => Expr::Root(Root::Attributes(AttributeScope::Synapse)),
                    other => {
                        self.error(
                            format!("unknown attribute scope '{}'", other),
                            line,
                            column,
                        );
                        Expr::Null
                    }
                }
            }
            other => {
                let message = format!(
                    "expected attribute scope after 'attributes.', found {}",
                    other.describe()
                );
                self.error(message, line, column);
                Expr::Null
            }
        }
    }

    /// `xpath("query")` or `xpath("query", "variable")`. The query must
    /// be a quoted literal: it is analyzed statically for
    /// content-awareness, which a computed query would defeat.
    fn parse_xpath(&mut self, line: u32, column: u32) -> Expr {
        if !self.expect(TokenKind::LParen) {
            return Expr::Null;
        }

        let query = match mem::replace(&mut self.current.kind, TokenKind::Eof) {
            TokenKind::String(q) => {
                self.advance();
                q
            }
            other => {
                let message = format!(
                    "xpath() requires a quoted query, found {}",
                    other.describe()
                );
                self.error(message, line, column);
                return Expr::Null;
            }
        };

        let variable = if self.check(&TokenKind::Comma) {
            self.advance();
            match mem::replace(&mut self.current.kind, TokenKind::Eof) {
                TokenKind::String(v) => {
                    self.advance();
                    Some(v)
                }
                other => {
                    let message = format!(
                        "xpath() requires a quoted variable name, found {}",
                        other.describe()
                    );
                    self.error(message, line, column);
                    return Expr::Null;
                }
            }
        } else {
            None
        };

        self.expect(TokenKind::RParen);
        Expr::Xpath { query, variable }
    }

    fn parse_call(&mut self, name: &str, line: u32, column: u32) -> Expr {
        self.expect(TokenKind::LParen);

        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression());
                if self.check(&TokenKind::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen);

        let Some(function) = Function::from_name(name) else {
            self.error(format!("unknown function '{}'", name), line, column);
            return Expr::Null;
        };

        if !function.accepts_arity(args.len()) {
            self.error(
                format!(
                    "function '{}' does not accept {} argument(s)",
                    function.name(),
                    args.len()
                ),
                line,
                column,
            );
            return Expr::Null;
        }

        Expr::Call { function, args }
    }

    /// An array literal `[e1, e2, ...]`. The caller has already consumed
    /// the opening `[`; this reads comma-separated elements until `]`.
    fn parse_array_literal(&mut self) -> Expr {
        let mut elements = Vec::new();
        if !self.check(&TokenKind::RBracket) {
            loop {
                elements.push(self.parse_expression());
                if self.check(&TokenKind::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RBracket);
        Expr::Array(elements)
    }
}

#[test]
fn test_single_error_for_doubled_operator() {
    let (_, errors) = Parser::new("5 >> 3").parse();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("'>'"));
    assert_eq!(errors[0].column, 3);
}

#[test]
fn test_nested_ternary_binds_to_then_branch() {
    let (expr, errors) = Parser::new("true ? false ? false : true : false").parse();
    assert!(errors.is_empty());
    let Expr::Ternary { then_branch, .. } = expr else {
        panic!("expected ternary, got {:?}", expr);
    };
    assert!(matches!(*then_branch, Expr::Ternary { .. }));
}
