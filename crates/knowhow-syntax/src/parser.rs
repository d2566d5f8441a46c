//! Recursive descent parser for knowing-how logic formulas.
//!
//! Grammar, lowest to highest precedence:
//!
//! ```text
//! formula := implies EOF
//! implies := or [ "implies" implies ]          (right associative)
//! or      := and ( "or" and )*
//! and     := unary ( "and" unary )*
//! unary   := "not" unary | atom
//! atom    := IDENT [ "(" ident ("," ident)* ")" ]
//!          | "(" implies ")"
//!          | "kh" "(" implies "," implies ")"
//! ```

use crate::ast::{Expr, ExprKind};
use crate::lexer::Lexer;
use crate::token::{Span, Token, TokenKind};
use thiserror::Error;

/// Parser error.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected token at {span}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("unrecognized character `{ch}` at {span}")]
    UnknownCharacter { ch: char, span: Span },
}

impl ParseError {
    /// Get the source span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnknownCharacter { span, .. } => *span,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse a formula from source text.
pub fn parse(source: &str) -> ParseResult<Expr> {
    Parser::new(source).parse_formula()
}

/// Parser over a token stream.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a new parser from source text.
    pub fn new(source: &str) -> Self {
        Self {
            tokens: Lexer::new(source).tokenize(),
            pos: 0,
        }
    }

    /// Parse a complete formula, consuming all input.
    pub fn parse_formula(&mut self) -> ParseResult<Expr> {
        let expr = self.parse_implies()?;
        self.expect_eof()?;
        Ok(expr)
    }

    fn parse_implies(&mut self) -> ParseResult<Expr> {
        let left = self.parse_or()?;
        if self.eat(&TokenKind::Implies) {
            let right = self.parse_implies()?;
            let span = left.span.merge(right.span);
            return Ok(Expr::new(
                ExprKind::Implies(Box::new(left), Box::new(right)),
                span,
            ));
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::Or) {
            let right = self.parse_and()?;
            let span = left.span.merge(right.span);
            left = Expr::new(ExprKind::Or(Box::new(left), Box::new(right)), span);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;
        while self.eat(&TokenKind::And) {
            let right = self.parse_unary()?;
            let span = left.span.merge(right.span);
            left = Expr::new(ExprKind::And(Box::new(left), Box::new(right)), span);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if self.check(&TokenKind::Not) {
            let start = self.current_span();
            self.advance();
            let operand = self.parse_unary()?;
            let span = start.merge(operand.span);
            return Ok(Expr::new(ExprKind::Not(Box::new(operand)), span));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> ParseResult<Expr> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                if self.eat(&TokenKind::LParen) {
                    let args = self.parse_args()?;
                    let end = self.current_span();
                    self.expect_rparen()?;
                    // Fluent-style names stay flat: `on(a, b)` is one proposition.
                    let full = format!("{}({})", name, args.join(", "));
                    Ok(Expr::new(ExprKind::Prop(full), token.span.merge(end)))
                } else {
                    Ok(Expr::new(ExprKind::Prop(name), token.span))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_implies()?;
                self.expect_rparen()?;
                Ok(expr)
            }
            TokenKind::Kh => {
                self.advance();
                self.expect(TokenKind::LParen, "`(`")?;
                let init = self.parse_implies()?;
                self.expect(TokenKind::Comma, "`,`")?;
                let goal = self.parse_implies()?;
                let end = self.current_span();
                self.expect_rparen()?;
                Ok(Expr::new(
                    ExprKind::Kh(Box::new(init), Box::new(goal)),
                    token.span.merge(end),
                ))
            }
            TokenKind::Unknown(ch) => Err(ParseError::UnknownCharacter {
                ch,
                span: token.span,
            }),
            _ => Err(self.unexpected("a proposition, `(`, `not`, or `kh`")),
        }
    }

    fn parse_args(&mut self) -> ParseResult<Vec<String>> {
        let mut args = Vec::new();
        loop {
            let token = self.current().clone();
            match token.kind {
                TokenKind::Ident(name) => {
                    self.advance();
                    args.push(name);
                }
                _ => return Err(self.unexpected("an argument name")),
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }

    fn current(&self) -> &Token {
        // tokenize() always ends with EOF, so pos is in range
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    /// Consume the current token if it matches.
    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> ParseResult<()> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_rparen(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::RParen, "`)`")
    }

    fn expect_eof(&mut self) -> ParseResult<()> {
        if self.current().is_eof() {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.current();
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: token.kind.to_string(),
            span: token.span,
        }
    }
}
