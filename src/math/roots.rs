//! Exact real roots of univariate polynomials
//!
//! Rational roots come from the rational-root theorem; what remains must be
//! at most quadratic, solved with the quadratic formula. Irrational roots are
//! kept exact as `a + b*sqrt(d)`.

use super::poly::{format_term, join_terms};
use super::rational::gcd;
use super::{MathError, Rational};
use std::cmp::Ordering;
use std::fmt;

/// Coefficient magnitude above which divisor enumeration is refused
const MAX_ENUMERABLE: i128 = 1_000_000_000;
const MAX_TRIAL_FACTOR: i128 = 1_000_000;

/// `rational + radical * sqrt(radicand)`, `radicand` square-free
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surd {
    rational: Rational,
    radical: Rational,
    radicand: i128,
}

impl Surd {
    pub fn from_rational(value: Rational) -> Self {
        Self {
            rational: value,
            radical: Rational::ZERO,
            radicand: 1,
        }
    }

    fn new(rational: Rational, radical: Rational, radicand: i128) -> Self {
        if radical.is_zero() {
            return Self::from_rational(rational);
        }
        Self {
            rational,
            radical,
            radicand,
        }
    }

    pub fn as_rational(&self) -> Option<Rational> {
        if self.radical.is_zero() {
            Some(self.rational)
        } else {
            None
        }
    }

    pub fn to_f64(&self) -> f64 {
        self.rational.to_f64() + self.radical.to_f64() * (self.radicand as f64).sqrt()
    }

    pub fn signum(&self) -> i32 {
        match self.as_rational() {
            Some(value) => value.signum() as i32,
            None => {
                let value = self.to_f64();
                if value > 0.0 {
                    1
                } else if value < 0.0 {
                    -1
                } else {
                    0
                }
            }
        }
    }

    fn common_radicand(&self, other: &Surd) -> Result<i128, MathError> {
        match (self.radical.is_zero(), other.radical.is_zero()) {
            (true, _) => Ok(other.radicand),
            (_, true) => Ok(self.radicand),
            _ if self.radicand == other.radicand => Ok(self.radicand),
            _ => Err(MathError::Unsolvable("mixed square roots".to_string())),
        }
    }

    pub fn checked_add(&self, other: &Surd) -> Result<Surd, MathError> {
        let radicand = self.common_radicand(other)?;
        Ok(Surd::new(
            self.rational.checked_add(&other.rational)?,
            self.radical.checked_add(&other.radical)?,
            radicand,
        ))
    }

    pub fn checked_mul(&self, other: &Surd) -> Result<Surd, MathError> {
        let radicand = self.common_radicand(other)?;
        let d = Rational::from_int(radicand);
        let rational = self
            .rational
            .checked_mul(&other.rational)?
            .checked_add(&self.radical.checked_mul(&other.radical)?.checked_mul(&d)?)?;
        let radical = self
            .rational
            .checked_mul(&other.radical)?
            .checked_add(&self.radical.checked_mul(&other.rational)?)?;
        Ok(Surd::new(rational, radical, radicand))
    }

    /// Evaluate `coeffs` (ascending) at this point
    pub fn evaluate(&self, coeffs: &[Rational]) -> Result<Surd, MathError> {
        let mut acc = Surd::from_rational(Rational::ZERO);
        for coeff in coeffs.iter().rev() {
            acc = acc
                .checked_mul(self)?
                .checked_add(&Surd::from_rational(*coeff))?;
        }
        Ok(acc)
    }
}

impl fmt::Display for Surd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = format!("sqrt({})", self.radicand);
        let mut terms = Vec::with_capacity(2);
        if !self.rational.is_zero() || self.radical.is_zero() {
            terms.push(format_term(&self.rational, None));
        }
        if !self.radical.is_zero() {
            terms.push(format_term(&self.radical, Some(&root)));
        }
        write!(f, "{}", join_terms(&terms))
    }
}

pub(crate) fn trim(coeffs: &[Rational]) -> Vec<Rational> {
    let mut coeffs = coeffs.to_vec();
    while coeffs.len() > 1 && coeffs.last().is_some_and(Rational::is_zero) {
        coeffs.pop();
    }
    coeffs
}

fn horner(coeffs: &[Rational], at: &Rational) -> Result<Rational, MathError> {
    let mut acc = Rational::ZERO;
    for coeff in coeffs.iter().rev() {
        acc = acc.checked_mul(at)?.checked_add(coeff)?;
    }
    Ok(acc)
}

/// Divide by `(x - root)`; the caller guarantees `root` is a root
pub(crate) fn deflate(coeffs: &[Rational], root: &Rational) -> Result<Vec<Rational>, MathError> {
    let n = coeffs.len() - 1;
    let mut quotient = vec![Rational::ZERO; n];
    quotient[n - 1] = coeffs[n];
    for k in (1..n).rev() {
        quotient[k - 1] = coeffs[k].checked_add(&root.checked_mul(&quotient[k])?)?;
    }
    Ok(quotient)
}

/// Integer coefficients with the same roots
pub(crate) fn integer_coefficients(coeffs: &[Rational]) -> Result<Vec<i128>, MathError> {
    let mut lcm: i128 = 1;
    for coeff in coeffs {
        let g = gcd(lcm, coeff.denom());
        lcm = (lcm / g).checked_mul(coeff.denom()).ok_or(MathError::Overflow)?;
    }
    coeffs
        .iter()
        .map(|c| {
            c.checked_mul(&Rational::from_int(lcm))
                .map(|scaled| scaled.numer())
        })
        .collect()
}

fn divisors(n: i128) -> Vec<i128> {
    let n = n.abs();
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut i = 1;
    while i * i <= n {
        if n % i == 0 {
            small.push(i);
            if i != n / i {
                large.push(n / i);
            }
        }
        i += 1;
    }
    small.extend(large.into_iter().rev());
    small
}

/// Some rational root of `coeffs` (ascending, non-zero constant term)
pub(crate) fn find_rational_root(coeffs: &[Rational]) -> Result<Option<Rational>, MathError> {
    let ints = integer_coefficients(coeffs)?;
    let (constant, leading) = match (ints.first(), ints.last()) {
        (Some(c), Some(l)) if *c != 0 && *l != 0 => (*c, *l),
        _ => return Ok(None),
    };
    if constant.abs() > MAX_ENUMERABLE || leading.abs() > MAX_ENUMERABLE {
        return Err(MathError::Unsolvable(
            "coefficients too large for exact root search".to_string(),
        ));
    }

    for p in divisors(constant) {
        for q in divisors(leading) {
            for sign in [1, -1] {
                let candidate = Rational::new(sign * p, q)?;
                if horner(coeffs, &candidate)?.is_zero() {
                    return Ok(Some(candidate));
                }
            }
        }
    }
    Ok(None)
}

/// `n = s*s*r` with `r` square-free (trial division is bounded)
fn square_free(n: i128) -> (i128, i128) {
    let mut outside = 1;
    let mut inside = n;
    let mut i: i128 = 2;
    while i <= MAX_TRIAL_FACTOR && i * i <= inside {
        while inside % (i * i) == 0 {
            inside /= i * i;
            outside *= i;
        }
        i += 1;
    }
    (outside, inside)
}

/// Real roots of `c + b*x + a*x**2`
fn quadratic_roots(c: &Rational, b: &Rational, a: &Rational) -> Result<Vec<Surd>, MathError> {
    let two_a = a.checked_mul(&Rational::from_int(2))?;
    let disc = b
        .checked_mul(b)?
        .checked_sub(&a.checked_mul(c)?.checked_mul(&Rational::from_int(4))?)?;
    let vertex = b.neg().checked_div(&two_a)?;

    match disc.cmp(&Rational::ZERO) {
        Ordering::Less => Ok(vec![]),
        Ordering::Equal => Ok(vec![Surd::from_rational(vertex)]),
        Ordering::Greater => {
            // sqrt(p/q) = sqrt(p*q)/q
            let radicand = disc
                .numer()
                .checked_mul(disc.denom())
                .ok_or(MathError::Overflow)?;
            let (outside, inside) = square_free(radicand);
            let offset = Rational::new(outside, disc.denom())?
                .checked_div(&two_a)?
                .abs();

            if inside == 1 {
                Ok(vec![
                    Surd::from_rational(vertex.checked_sub(&offset)?),
                    Surd::from_rational(vertex.checked_add(&offset)?),
                ])
            } else {
                Ok(vec![
                    Surd::new(vertex, offset.neg(), inside),
                    Surd::new(vertex, offset, inside),
                ])
            }
        }
    }
}

/// Distinct real roots of `coeffs` (ascending) in increasing order.
///
/// A constant polynomial, zero included, has no roots.
pub fn real_roots(coeffs: &[Rational]) -> Result<Vec<Surd>, MathError> {
    let mut coeffs = trim(coeffs);
    let mut roots = Vec::new();

    if coeffs.len() <= 1 {
        return Ok(roots);
    }

    if coeffs[0].is_zero() {
        roots.push(Surd::from_rational(Rational::ZERO));
        while coeffs.len() > 1 && coeffs[0].is_zero() {
            coeffs.remove(0);
        }
    }

    loop {
        match coeffs.len() - 1 {
            0 => break,
            1 => {
                roots.push(Surd::from_rational(coeffs[0].neg().checked_div(&coeffs[1])?));
                break;
            }
            2 => {
                roots.extend(quadratic_roots(&coeffs[0], &coeffs[1], &coeffs[2])?);
                break;
            }
            degree => match find_rational_root(&coeffs)? {
                Some(root) => {
                    roots.push(Surd::from_rational(root));
                    coeffs = deflate(&coeffs, &root)?;
                }
                None => {
                    return Err(MathError::Unsolvable(format!(
                        "degree {} polynomial without rational roots",
                        degree
                    )));
                }
            },
        }
    }

    roots.sort_by(|a, b| a.to_f64().partial_cmp(&b.to_f64()).unwrap_or(Ordering::Equal));
    roots.dedup();
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i128]) -> Vec<Rational> {
        values.iter().map(|v| Rational::from_int(*v)).collect()
    }

    fn shown(roots: &[Surd]) -> Vec<String> {
        roots.iter().map(Surd::to_string).collect()
    }

    #[test]
    fn test_rational_quadratic() {
        // x^2 - 5x + 6
        assert_eq!(shown(&real_roots(&ints(&[6, -5, 1])).unwrap()), vec!["2", "3"]);
        // x^2 - 4
        assert_eq!(shown(&real_roots(&ints(&[-4, 0, 1])).unwrap()), vec!["-2", "2"]);
        // 2x^2 - 3x + 1
        assert_eq!(shown(&real_roots(&ints(&[1, -3, 2])).unwrap()), vec!["1/2", "1"]);
    }

    #[test]
    fn test_irrational_quadratic() {
        // x^2 - 5x + 3 -> 5/2 -+ sqrt(13)/2
        assert_eq!(
            shown(&real_roots(&ints(&[3, -5, 1])).unwrap()),
            vec!["5/2 - sqrt(13)/2", "5/2 + sqrt(13)/2"]
        );
        // x^2 - 8 -> -+ 2*sqrt(2)
        assert_eq!(
            shown(&real_roots(&ints(&[-8, 0, 1])).unwrap()),
            vec!["-2*sqrt(2)", "2*sqrt(2)"]
        );
    }

    #[test]
    fn test_no_real_roots() {
        assert!(real_roots(&ints(&[1, 0, 1])).unwrap().is_empty());
        assert!(real_roots(&ints(&[5])).unwrap().is_empty());
        assert!(real_roots(&ints(&[0])).unwrap().is_empty());
    }

    #[test]
    fn test_repeated_and_zero_roots() {
        // x^2 - 2x + 1
        assert_eq!(shown(&real_roots(&ints(&[1, -2, 1])).unwrap()), vec!["1"]);
        // x^3 - x
        assert_eq!(shown(&real_roots(&ints(&[0, -1, 0, 1])).unwrap()), vec!["-1", "0", "1"]);
    }

    #[test]
    fn test_cubic_with_rational_root() {
        // (x - 2)(x^2 - 2) = x^3 - 2x^2 - 2x + 4
        assert_eq!(
            shown(&real_roots(&ints(&[4, -2, -2, 1])).unwrap()),
            vec!["-sqrt(2)", "sqrt(2)", "2"]
        );
    }

    #[test]
    fn test_irreducible_cubic_is_unsolvable() {
        // x^3 - 2
        assert!(matches!(
            real_roots(&ints(&[-2, 0, 0, 1])),
            Err(MathError::Unsolvable(_))
        ));
    }

    #[test]
    fn test_surd_evaluation() {
        // x^2 - 2 at sqrt(2) is 0
        let root = Surd::new(Rational::ZERO, Rational::ONE, 2);
        let value = root.evaluate(&ints(&[-2, 0, 1])).unwrap();
        assert_eq!(value.as_rational(), Some(Rational::ZERO));
    }
}
