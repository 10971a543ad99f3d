//! Sparse multivariate polynomials with exact rational coefficients

use super::expr::Expr;
use super::{MathError, Rational};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Largest integer exponent accepted in `base**n`
pub const MAX_EXPONENT: i128 = 16;

/// Largest total degree a polynomial may reach
pub const MAX_DEGREE: u32 = 64;

/// Product of symbol powers, e.g. `k*x**2`
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Monomial(BTreeMap<char, u32>);

impl Monomial {
    pub fn one() -> Self {
        Self(BTreeMap::new())
    }

    pub fn power(symbol: char, exp: u32) -> Self {
        let mut powers = BTreeMap::new();
        if exp > 0 {
            powers.insert(symbol, exp);
        }
        Self(powers)
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    pub fn degree_in(&self, symbol: char) -> u32 {
        self.0.get(&symbol).copied().unwrap_or(0)
    }

    pub fn total_degree(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.0.keys().copied()
    }

    fn times(&self, other: &Monomial) -> Monomial {
        let mut powers = self.0.clone();
        for (symbol, exp) in &other.0 {
            *powers.entry(*symbol).or_insert(0) += exp;
        }
        Monomial(powers)
    }

    fn with_degree(&self, symbol: char, exp: u32) -> Monomial {
        let mut powers = self.0.clone();
        if exp == 0 {
            powers.remove(&symbol);
        } else {
            powers.insert(symbol, exp);
        }
        Monomial(powers)
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(symbol, exp)| {
                if *exp == 1 {
                    symbol.to_string()
                } else {
                    format!("{}**{}", symbol, exp)
                }
            })
            .collect();
        write!(f, "{}", parts.join("*"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Poly {
    terms: BTreeMap<Monomial, Rational>,
}

impl Poly {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(value: Rational) -> Self {
        let mut poly = Self::zero();
        if !value.is_zero() {
            poly.terms.insert(Monomial::one(), value);
        }
        poly
    }

    pub fn symbol(symbol: char) -> Self {
        let mut poly = Self::zero();
        poly.terms.insert(Monomial::power(symbol, 1), Rational::ONE);
        poly
    }

    /// Build `c0 + c1*s + c2*s**2 + ...`
    pub fn from_univariate(symbol: char, coeffs: &[Rational]) -> Self {
        let mut poly = Self::zero();
        for (exp, coeff) in coeffs.iter().enumerate() {
            if !coeff.is_zero() {
                poly.terms.insert(Monomial::power(symbol, exp as u32), *coeff);
            }
        }
        poly
    }

    pub fn from_expr(expr: &Expr) -> Result<Self, MathError> {
        let poly = match expr {
            Expr::Num(value) => Poly::constant(*value),
            Expr::Sym(symbol) => Poly::symbol(*symbol),
            Expr::Neg(inner) => Poly::from_expr(inner)?.negate(),
            Expr::Add(lhs, rhs) => Poly::from_expr(lhs)?.checked_add(&Poly::from_expr(rhs)?)?,
            Expr::Sub(lhs, rhs) => Poly::from_expr(lhs)?.checked_sub(&Poly::from_expr(rhs)?)?,
            Expr::Mul(lhs, rhs) => Poly::from_expr(lhs)?.checked_mul(&Poly::from_expr(rhs)?)?,
            Expr::Div(lhs, rhs) => {
                let divisor = Poly::from_expr(rhs)?.as_constant().ok_or_else(|| {
                    MathError::NonPolynomial("division by a non-constant expression".to_string())
                })?;
                Poly::from_expr(lhs)?.scale(&divisor.recip()?)?
            }
            Expr::Pow(base, exponent) => {
                let base = Poly::from_expr(base)?;
                let exponent = Poly::from_expr(exponent)?
                    .as_constant()
                    .filter(Rational::is_integer)
                    .ok_or_else(|| {
                        MathError::NonPolynomial("exponent must be an integer".to_string())
                    })?
                    .numer();

                if exponent.abs() > MAX_EXPONENT {
                    return Err(MathError::DegreeTooHigh(exponent.unsigned_abs() as u32));
                }
                if exponent < 0 {
                    let value = base.as_constant().ok_or_else(|| {
                        MathError::NonPolynomial("negative power of a variable".to_string())
                    })?;
                    Poly::constant(value.pow(exponent as i32)?)
                } else {
                    base.pow(exponent as u32)?
                }
            }
        };

        let degree = poly.total_degree();
        if degree > MAX_DEGREE {
            return Err(MathError::DegreeTooHigh(degree));
        }
        Ok(poly)
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Value of a polynomial without symbols
    pub fn as_constant(&self) -> Option<Rational> {
        match self.terms.len() {
            0 => Some(Rational::ZERO),
            1 => self.terms.get(&Monomial::one()).copied(),
            _ => None,
        }
    }

    pub fn symbols(&self) -> BTreeSet<char> {
        self.terms.keys().flat_map(|m| m.symbols()).collect()
    }

    pub fn degree_in(&self, symbol: char) -> u32 {
        self.terms
            .keys()
            .map(|m| m.degree_in(symbol))
            .max()
            .unwrap_or(0)
    }

    pub fn total_degree(&self) -> u32 {
        self.terms
            .keys()
            .map(Monomial::total_degree)
            .max()
            .unwrap_or(0)
    }

    fn add_term(&mut self, monomial: Monomial, coeff: Rational) -> Result<(), MathError> {
        let sum = match self.terms.get(&monomial) {
            Some(existing) => existing.checked_add(&coeff)?,
            None => coeff,
        };
        if sum.is_zero() {
            self.terms.remove(&monomial);
        } else {
            self.terms.insert(monomial, sum);
        }
        Ok(())
    }

    pub fn checked_add(&self, other: &Poly) -> Result<Poly, MathError> {
        let mut result = self.clone();
        for (monomial, coeff) in &other.terms {
            result.add_term(monomial.clone(), *coeff)?;
        }
        Ok(result)
    }

    pub fn checked_sub(&self, other: &Poly) -> Result<Poly, MathError> {
        self.checked_add(&other.negate())
    }

    pub fn negate(&self) -> Poly {
        Poly {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), c.neg()))
                .collect(),
        }
    }

    pub fn checked_mul(&self, other: &Poly) -> Result<Poly, MathError> {
        let mut result = Poly::zero();
        for (lhs_mono, lhs_coeff) in &self.terms {
            for (rhs_mono, rhs_coeff) in &other.terms {
                result.add_term(lhs_mono.times(rhs_mono), lhs_coeff.checked_mul(rhs_coeff)?)?;
            }
        }
        if result.total_degree() > MAX_DEGREE {
            return Err(MathError::DegreeTooHigh(result.total_degree()));
        }
        Ok(result)
    }

    pub fn scale(&self, factor: &Rational) -> Result<Poly, MathError> {
        let mut result = Poly::zero();
        for (monomial, coeff) in &self.terms {
            result.add_term(monomial.clone(), coeff.checked_mul(factor)?)?;
        }
        Ok(result)
    }

    pub fn pow(&self, exp: u32) -> Result<Poly, MathError> {
        let mut result = Poly::constant(Rational::ONE);
        for _ in 0..exp {
            result = result.checked_mul(self)?;
        }
        Ok(result)
    }

    pub fn derivative(&self, symbol: char) -> Result<Poly, MathError> {
        let mut result = Poly::zero();
        for (monomial, coeff) in &self.terms {
            let degree = monomial.degree_in(symbol);
            if degree == 0 {
                continue;
            }
            let factor = Rational::from_int(degree as i128);
            result.add_term(monomial.with_degree(symbol, degree - 1), coeff.checked_mul(&factor)?)?;
        }
        Ok(result)
    }

    /// Coefficients with respect to `symbol`; index `i` holds the `symbol**i` part
    pub fn coefficients_in(&self, symbol: char) -> Vec<Poly> {
        let mut coeffs = vec![Poly::zero(); self.degree_in(symbol) as usize + 1];
        for (monomial, coeff) in &self.terms {
            let degree = monomial.degree_in(symbol) as usize;
            coeffs[degree]
                .terms
                .insert(monomial.with_degree(symbol, 0), *coeff);
        }
        coeffs
    }

    /// Replace `symbol` by `value` everywhere
    pub fn substitute(&self, symbol: char, value: &Poly) -> Result<Poly, MathError> {
        let mut result = Poly::zero();
        for coeff in self.coefficients_in(symbol).iter().rev() {
            result = result.checked_mul(value)?.checked_add(coeff)?;
        }
        Ok(result)
    }

    /// Rational coefficients (ascending) when `symbol` is the only symbol
    pub fn univariate(&self, symbol: char) -> Option<Vec<Rational>> {
        if self.symbols().iter().any(|s| *s != symbol) {
            return None;
        }
        let mut coeffs = vec![Rational::ZERO; self.degree_in(symbol) as usize + 1];
        for (monomial, coeff) in &self.terms {
            coeffs[monomial.degree_in(symbol) as usize] = *coeff;
        }
        Some(coeffs)
    }
}

/// `(is_negative, body)` for one term, CAS style: `3*x/2`, `x**2`, `5/2`
pub(crate) fn format_term(coeff: &Rational, body: Option<&str>) -> (bool, String) {
    let magnitude = coeff.abs();
    let text = match body {
        None => magnitude.to_string(),
        Some(body) => {
            let numerator = if magnitude.numer() == 1 {
                body.to_string()
            } else {
                format!("{}*{}", magnitude.numer(), body)
            };
            if magnitude.denom() == 1 {
                numerator
            } else {
                format!("{}/{}", numerator, magnitude.denom())
            }
        }
    };
    (coeff.is_negative(), text)
}

pub(crate) fn join_terms(terms: &[(bool, String)]) -> String {
    let mut out = String::new();
    for (i, (negative, text)) in terms.iter().enumerate() {
        match (i, negative) {
            (0, true) => out.push('-'),
            (0, false) => {}
            (_, true) => out.push_str(" - "),
            (_, false) => out.push_str(" + "),
        }
        out.push_str(text);
    }
    out
}

impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }

        let mut ordered: Vec<(&Monomial, &Rational)> = self.terms.iter().collect();
        ordered.sort_by_key(|(m, _)| (Reverse(m.total_degree()), Reverse((*m).clone())));

        let terms: Vec<(bool, String)> = ordered
            .into_iter()
            .map(|(monomial, coeff)| {
                if monomial.is_one() {
                    format_term(coeff, None)
                } else {
                    format_term(coeff, Some(&monomial.to_string()))
                }
            })
            .collect();

        write!(f, "{}", join_terms(&terms))
    }
}
