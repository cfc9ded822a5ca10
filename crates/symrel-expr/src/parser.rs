//! Expression parser using precedence climbing.
//!
//! Precedence, loosest to tightest: `||`, `&&`, comparisons
//! (non-associative), `+`, unary `!`, primary. Comparisons do not chain:
//! `a == b == c` is a syntax error.

use crate::ast::{BinaryOp, Expr};
use crate::error::ParseError;
use crate::lexer::{Spanned, Token, tokenize};

/// Parse a complete predicate expression.
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(source)?;
    let mut stream = Stream {
        tokens,
        pos: 0,
        end: source.len(),
    };
    let expr = stream.or_expr()?;
    match stream.peek() {
        None => Ok(expr),
        Some(spanned) => Err(ParseError::new(
            format!("unexpected {}", describe(&spanned.token)),
            spanned.offset,
        )),
    }
}

struct Stream {
    tokens: Vec<Spanned>,
    pos: usize,
    end: usize,
}

impl Stream {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Spanned> {
        let spanned = self.tokens.get(self.pos).cloned();
        if spanned.is_some() {
            self.pos += 1;
        }
        spanned
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek().map(|spanned| &spanned.token) == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), ParseError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, what: &str) -> ParseError {
        match self.peek() {
            Some(spanned) => ParseError::new(
                format!("expected {what}, found {}", describe(&spanned.token)),
                spanned.offset,
            ),
            None => ParseError::new(format!("expected {what}, found end of input"), self.end),
        }
    }

    fn or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.and_expr()?;
        while self.eat(&Token::OrOr) {
            let rhs = self.and_expr()?;
            lhs = binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.cmp_expr()?;
        while self.eat(&Token::AndAnd) {
            let rhs = self.cmp_expr()?;
            lhs = binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn cmp_expr(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.add_expr()?;
        let op = match self.peek().map(|spanned| &spanned.token) {
            Some(Token::EqEq) => BinaryOp::Eq,
            Some(Token::NotEq) => BinaryOp::Ne,
            Some(Token::Lt) => BinaryOp::Lt,
            Some(Token::LtEq) => BinaryOp::Le,
            Some(Token::Gt) => BinaryOp::Gt,
            Some(Token::GtEq) => BinaryOp::Ge,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.add_expr()?;
        Ok(binary(op, lhs, rhs))
    }

    fn add_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary_expr()?;
        while self.eat(&Token::Plus) {
            let rhs = self.unary_expr()?;
            lhs = binary(BinaryOp::Add, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary_expr(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Token::Bang) {
            let inner = self.unary_expr()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let Some(spanned) = self.next() else {
            return Err(ParseError::new(
                "expected expression, found end of input",
                self.end,
            ));
        };
        match spanned.token {
            Token::True => Ok(Expr::Bool(true)),
            Token::False => Ok(Expr::Bool(false)),
            Token::Null => Ok(Expr::Null),
            Token::Int(value) => Ok(Expr::Int(value)),
            Token::Str(value) => Ok(Expr::Str(value)),
            Token::Ident(name) => {
                if self.eat(&Token::LParen) {
                    let args = self.call_args()?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            Token::LParen => {
                let inner = self.or_expr()?;
                self.expect(&Token::RParen, "`)`")?;
                Ok(inner)
            }
            other => Err(ParseError::new(
                format!("expected expression, found {}", describe(&other)),
                spanned.offset,
            )),
        }
    }

    fn call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.or_expr()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RParen, "`,` or `)`")?;
            return Ok(args);
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Ident(name) => format!("identifier `{name}`"),
        Token::Str(_) => "string literal".to_string(),
        Token::Int(value) => format!("integer `{value}`"),
        other => format!("`{other:?}`"),
    }
}
