//! Factorization of univariate polynomials over the rationals
//!
//! Linear factors are split off through rational roots; whatever is left
//! is kept as one primitive integer factor.

use super::poly::Poly;
use super::roots::{deflate, find_rational_root, integer_coefficients, trim};
use super::rational::gcd;
use super::{MathError, Rational};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Factorization {
    symbol: char,
    content: Rational,
    /// Primitive integer factors (ascending coefficients) with multiplicity
    factors: Vec<(Vec<Rational>, u32)>,
}

impl Factorization {
    pub fn content(&self) -> Rational {
        self.content
    }

    pub fn factor_count(&self) -> usize {
        self.factors.len()
    }
}

fn push_root(roots: &mut Vec<(Rational, u32)>, root: Rational) {
    match roots.iter_mut().find(|(r, _)| *r == root) {
        Some((_, mult)) => *mult += 1,
        None => roots.push((root, 1)),
    }
}

/// Factor `coeffs` (ascending) in `symbol`
pub fn factor_univariate(coeffs: &[Rational], symbol: char) -> Result<Factorization, MathError> {
    let coeffs = trim(coeffs);
    let leading = coeffs.last().copied().unwrap_or(Rational::ZERO);
    if coeffs.len() <= 1 {
        return Ok(Factorization {
            symbol,
            content: leading,
            factors: Vec::new(),
        });
    }

    let mut monic = coeffs
        .iter()
        .map(|c| c.checked_div(&leading))
        .collect::<Result<Vec<_>, _>>()?;
    let mut content = leading;
    let mut roots: Vec<(Rational, u32)> = Vec::new();

    while monic.len() > 1 && monic[0].is_zero() {
        monic.remove(0);
        push_root(&mut roots, Rational::ZERO);
    }

    while monic.len() > 1 {
        let root = if monic.len() == 2 {
            Some(monic[0].neg())
        } else {
            // oversized coefficients leave the remainder unsplit
            match find_rational_root(&monic) {
                Ok(root) => root,
                Err(_) => None,
            }
        };
        match root {
            Some(root) => {
                monic = deflate(&monic, &root)?;
                push_root(&mut roots, root);
            }
            None => break,
        }
    }

    roots.sort_by(|(a, _), (b, _)| (!a.is_zero(), *a).cmp(&(!b.is_zero(), *b)));

    let mut factors = Vec::with_capacity(roots.len() + 1);
    for (root, mult) in roots {
        let q = Rational::from_int(root.denom());
        content = content.checked_div(&q.pow(mult as i32)?)?;
        factors.push((vec![Rational::from_int(-root.numer()), q], mult));
    }

    if monic.len() > 1 {
        let ints = integer_coefficients(&monic)?;
        let g = ints.iter().fold(0, |acc, c| gcd(acc, *c)).max(1);
        let primitive: Vec<Rational> = ints.iter().map(|c| Rational::from_int(c / g)).collect();
        if let Some(lead) = primitive.last() {
            content = content.checked_div(lead)?;
        }
        factors.push((primitive, 1));
    }

    Ok(Factorization {
        symbol,
        content,
        factors,
    })
}

impl fmt::Display for Factorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.factors.is_empty() {
            return write!(f, "{}", self.content);
        }

        if let [(coeffs, 1)] = self.factors.as_slice() {
            if self.content.is_one() {
                return write!(f, "{}", Poly::from_univariate(self.symbol, coeffs));
            }
        }

        let parts: Vec<String> = self
            .factors
            .iter()
            .map(|(coeffs, mult)| {
                let poly = Poly::from_univariate(self.symbol, coeffs);
                let base = if poly.term_count() > 1 {
                    format!("({})", poly)
                } else {
                    poly.to_string()
                };
                if *mult > 1 {
                    format!("{}**{}", base, mult)
                } else {
                    base
                }
            })
            .collect();

        let prefix = if self.content.is_one() {
            String::new()
        } else if self.content == Rational::ONE.neg() {
            "-".to_string()
        } else {
            format!("{}*", self.content)
        };
        write!(f, "{}{}", prefix, parts.join("*"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i128]) -> Vec<Rational> {
        values.iter().map(|v| Rational::from_int(*v)).collect()
    }

    fn factored(values: &[i128]) -> String {
        factor_univariate(&ints(values), 'x').unwrap().to_string()
    }

    #[test]
    fn test_distinct_linear_factors() {
        assert_eq!(factored(&[6, -5, 1]), "(x - 2)*(x - 3)");
        assert_eq!(factored(&[-2, 0, 2]), "2*(x + 1)*(x - 1)");
        assert_eq!(factored(&[4, 0, -1]), "-(x + 2)*(x - 2)");
    }

    #[test]
    fn test_zero_root_comes_first() {
        assert_eq!(factored(&[0, -1, 0, 1]), "x*(x + 1)*(x - 1)");
        assert_eq!(factored(&[0, 0, 3]), "3*x**2");
    }

    #[test]
    fn test_repeated_rational_root() {
        // 4x^2 + 4x + 1
        assert_eq!(factored(&[1, 4, 4]), "(2*x + 1)**2");
    }

    #[test]
    fn test_irreducible_remainder() {
        assert_eq!(factored(&[1, 0, 1]), "x**2 + 1");
        // (x - 2)(x^2 + 1)
        assert_eq!(factored(&[-2, 1, -2, 1]), "(x - 2)*(x**2 + 1)");
    }

    #[test]
    fn test_fractional_content() {
        let coeffs = vec![
            Rational::new(-1, 2).unwrap(),
            Rational::ZERO,
            Rational::new(1, 2).unwrap(),
        ];
        let result = factor_univariate(&coeffs, 'x').unwrap();
        assert_eq!(result.content(), Rational::new(1, 2).unwrap());
        assert_eq!(result.to_string(), "1/2*(x + 1)*(x - 1)");
    }

    #[test]
    fn test_constants() {
        assert_eq!(factored(&[7]), "7");
        assert_eq!(factored(&[0]), "0");
        assert_eq!(factored(&[3, 1]), "x + 3");
    }
}
