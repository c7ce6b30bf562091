//! Recursive-descent parser producing the expression tree
//!
//! Precedence, lowest first: `or`, `and`, `not`, comparisons,
//! `+ -`, `* / // %`, unary `+ -`, `**`. Exponentiation is
//! right-associative and binds tighter than a unary minus on its left,
//! so `-2 ** 2` is `-(2 ** 2)`.

use super::lexer::{Spanned, Token};
use crate::core::types::EvalValue;

/// Nesting limit for parenthesized and unary sub-expressions
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(EvalValue),
    Name(String),
    Neg(Box<Expr>),
    Pos(Box<Expr>),
    Not(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    /// Chained comparison: `a < b <= c`
    Compare(Box<Expr>, Vec<(CmpOp, Expr)>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

pub fn parse(tokens: &[Spanned]) -> Result<Expr, String> {
    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.or_expr()?;

    match parser.peek() {
        None => Ok(expr),
        Some(extra) => Err(format!(
            "unexpected '{}' at position {}",
            extra.token, extra.pos
        )),
    }
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&'a Token> {
        self.peek().map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<&'a Spanned> {
        let spanned = self.tokens.get(self.pos);
        if spanned.is_some() {
            self.pos += 1;
        }
        spanned
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek_token() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn enter(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err("expression is nested too deeply".to_string());
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn or_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.and_expr()?;
        while self.eat(&Token::Or) {
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.not_expr()?;
        while self.eat(&Token::And) {
            let right = self.not_expr()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr, String> {
        if self.eat(&Token::Not) {
            self.enter()?;
            let inner = self.not_expr()?;
            self.leave();
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, String> {
        let first = self.arith()?;
        let mut chain = Vec::new();
        loop {
            let op = match self.peek_token() {
                Some(Token::Eq) => CmpOp::Eq,
                Some(Token::Ne) => CmpOp::Ne,
                Some(Token::Lt) => CmpOp::Lt,
                Some(Token::Le) => CmpOp::Le,
                Some(Token::Gt) => CmpOp::Gt,
                Some(Token::Ge) => CmpOp::Ge,
                _ => break,
            };
            self.pos += 1;
            chain.push((op, self.arith()?));
        }

        if chain.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare(Box::new(first), chain))
        }
    }

    fn arith(&mut self) -> Result<Expr, String> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, String> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::DoubleSlash) => BinOp::FloorDiv,
                Some(Token::Percent) => BinOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, String> {
        let wrap: fn(Box<Expr>) -> Expr = match self.peek_token() {
            Some(Token::Minus) => Expr::Neg,
            Some(Token::Plus) => Expr::Pos,
            _ => return self.power(),
        };
        self.pos += 1;
        self.enter()?;
        let inner = self.unary()?;
        self.leave();
        Ok(wrap(Box::new(inner)))
    }

    fn power(&mut self) -> Result<Expr, String> {
        let base = self.primary()?;
        if self.eat(&Token::DoubleStar) {
            self.enter()?;
            let exponent = self.unary()?;
            self.leave();
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, String> {
        let Some(spanned) = self.advance() else {
            return Err("unexpected end of expression".to_string());
        };

        match &spanned.token {
            Token::Int(i) => Ok(Expr::Literal(EvalValue::Int(*i))),
            Token::Float(x) => Ok(Expr::Literal(EvalValue::Float(*x))),
            Token::True => Ok(Expr::Literal(EvalValue::Bool(true))),
            Token::False => Ok(Expr::Literal(EvalValue::Bool(false))),
            Token::Ident(name) => {
                if self.eat(&Token::LParen) {
                    let args = self.call_args()?;
                    Ok(Expr::Call(name.clone(), args))
                } else {
                    Ok(Expr::Name(name.clone()))
                }
            }
            Token::LParen => {
                self.enter()?;
                let inner = self.or_expr()?;
                self.leave();
                if !self.eat(&Token::RParen) {
                    return Err(format!("unclosed '(' at position {}", spanned.pos));
                }
                Ok(inner)
            }
            other => Err(format!(
                "unexpected '{}' at position {}",
                other, spanned.pos
            )),
        }
    }

    /// Arguments after an opening parenthesis, consuming the closing one
    fn call_args(&mut self) -> Result<Vec<Expr>, String> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }

        self.enter()?;
        loop {
            args.push(self.or_expr()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            if self.eat(&Token::RParen) {
                break;
            }
            self.leave();
            return Err(match self.peek() {
                Some(s) => format!(
                    "expected ',' or ')' but found '{}' at position {}",
                    s.token, s.pos
                ),
                None => "unclosed function call".to_string(),
            });
        }
        self.leave();
        Ok(args)
    }
}
