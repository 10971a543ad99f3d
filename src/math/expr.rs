//! Expression parser for normalized math text
//!
//! Grammar (`**` binds tighter than unary minus, as in `-x**2 == -(x**2)`):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary | unary)*      juxtaposition multiplies
//! unary   := ('-' | '+') unary | power
//! power   := primary ('**' unary)?
//! primary := number | symbol | '(' expr ')'
//! ```
//!
//! Every letter is its own symbol, so `kx` reads as `k*x`.

use super::normalize::FUNCTION_NAMES;
use super::{MathError, Rational};

const MAX_NESTING: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(Rational),
    Sym(char),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(Rational),
    Sym(char),
    Plus,
    Minus,
    Star,
    Slash,
    Pow,
    LParen,
    RParen,
}

fn tokenize(text: &str) -> Result<Vec<Token>, MathError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => {
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                tokens.push(Token::Num(Rational::parse_decimal(&literal)?));
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect::<String>().to_lowercase();
                if let Some(name) = FUNCTION_NAMES.iter().find(|name| word.starts_with(**name)) {
                    return Err(MathError::UnsupportedFunction(name.to_string()));
                }
                tokens.extend(chars[start..i].iter().map(|c| Token::Sym(*c)));
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::Pow);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' | '[' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' | ']' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            other => {
                return Err(MathError::Parse(format!("unexpected character '{}'", other)));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<Expr, MathError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(MathError::Parse("expression nested too deeply".to_string()));
        }

        let mut lhs = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    lhs = Expr::Add(Box::new(lhs), Box::new(self.term()?));
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    lhs = Expr::Sub(Box::new(lhs), Box::new(self.term()?));
                }
                _ => break,
            }
        }

        self.depth -= 1;
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, MathError> {
        let mut lhs = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    lhs = Expr::Mul(Box::new(lhs), Box::new(self.unary()?));
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    lhs = Expr::Div(Box::new(lhs), Box::new(self.unary()?));
                }
                Some(Token::Num(_)) | Some(Token::Sym(_)) | Some(Token::LParen) => {
                    lhs = Expr::Mul(Box::new(lhs), Box::new(self.unary()?));
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, MathError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.nested(|p| p.unary().map(|e| Expr::Neg(Box::new(e))))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.nested(Parser::unary)
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, MathError> {
        let base = self.primary()?;
        if self.peek() == Some(&Token::Pow) {
            self.pos += 1;
            let exponent = self.nested(Parser::unary)?;
            return Ok(Expr::Pow(Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, MathError> {
        match self.next() {
            Some(Token::Num(value)) => Ok(Expr::Num(value)),
            Some(Token::Sym(symbol)) => Ok(Expr::Sym(symbol)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(MathError::Parse("missing closing parenthesis".to_string())),
                }
            }
            Some(token) => Err(MathError::Parse(format!("unexpected token {:?}", token))),
            None => Err(MathError::Parse("unexpected end of expression".to_string())),
        }
    }

    fn nested<F>(&mut self, parse: F) -> Result<Expr, MathError>
    where
        F: FnOnce(&mut Parser) -> Result<Expr, MathError>,
    {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(MathError::Parse("expression nested too deeply".to_string()));
        }
        let result = parse(self);
        self.depth -= 1;
        result
    }
}

/// Parse normalized text into an expression tree
pub fn parse_expression(text: &str) -> Result<Expr, MathError> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(MathError::Parse("empty expression".to_string()));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;

    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(MathError::Parse(format!("unexpected token {:?}", token))),
    }
}
