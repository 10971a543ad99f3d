//! Exact symbolic engine used by the solving strategies
//!
//! Text goes through [`normalize_math_text`], is parsed into an [`Expr`],
//! expanded into a [`Poly`] and then solved, differentiated or factored
//! with exact rational arithmetic.

pub mod expr;
pub mod factor;
pub mod normalize;
pub mod poly;
pub mod rational;
pub mod roots;

pub use expr::{parse_expression, Expr};
pub use factor::{factor_univariate, Factorization};
pub use normalize::normalize_math_text;
pub use poly::Poly;
pub use rational::Rational;
pub use roots::{real_roots, Surd};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported function: {0}")]
    UnsupportedFunction(String),

    #[error("Not a polynomial: {0}")]
    NonPolynomial(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Degree {0} is too high")]
    DegreeTooHigh(u32),

    #[error("Unsolvable: {0}")]
    Unsolvable(String),
}

/// Parse already-normalized text straight into a polynomial
pub fn parse_polynomial(normalized: &str) -> Result<Poly, MathError> {
    Poly::from_expr(&parse_expression(normalized)?)
}
