//! Exact rational numbers over `i128`
//!
//! Every operation is checked; overflow surfaces as [`MathError::Overflow`]
//! instead of wrapping.

use super::MathError;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    num: i128,
    den: i128,
}

pub(crate) fn gcd(a: i128, b: i128) -> i128 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Rational {
    pub const ZERO: Rational = Rational { num: 0, den: 1 };
    pub const ONE: Rational = Rational { num: 1, den: 1 };

    pub fn new(num: i128, den: i128) -> Result<Self, MathError> {
        if den == 0 {
            return Err(MathError::DivisionByZero);
        }
        let g = gcd(num, den).max(1);
        let (mut num, mut den) = (num / g, den / g);
        if den < 0 {
            num = num.checked_neg().ok_or(MathError::Overflow)?;
            den = den.checked_neg().ok_or(MathError::Overflow)?;
        }
        Ok(Self { num, den })
    }

    pub const fn from_int(value: i128) -> Self {
        Self { num: value, den: 1 }
    }

    pub fn numer(&self) -> i128 {
        self.num
    }

    pub fn denom(&self) -> i128 {
        self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    pub fn is_one(&self) -> bool {
        self.num == 1 && self.den == 1
    }

    pub fn is_integer(&self) -> bool {
        self.den == 1
    }

    pub fn is_negative(&self) -> bool {
        self.num < 0
    }

    pub fn signum(&self) -> i128 {
        self.num.signum()
    }

    pub fn abs(&self) -> Self {
        Self {
            num: self.num.abs(),
            den: self.den,
        }
    }

    pub fn neg(&self) -> Self {
        Self {
            num: -self.num,
            den: self.den,
        }
    }

    pub fn checked_add(&self, other: &Self) -> Result<Self, MathError> {
        let g = gcd(self.den, other.den);
        let lhs_scale = other.den / g;
        let rhs_scale = self.den / g;
        let num = mul(self.num, lhs_scale)?
            .checked_add(mul(other.num, rhs_scale)?)
            .ok_or(MathError::Overflow)?;
        Self::new(num, mul(self.den, lhs_scale)?)
    }

    pub fn checked_sub(&self, other: &Self) -> Result<Self, MathError> {
        self.checked_add(&other.neg())
    }

    pub fn checked_mul(&self, other: &Self) -> Result<Self, MathError> {
        // cross-reduce first to keep intermediates small
        let g1 = gcd(self.num, other.den).max(1);
        let g2 = gcd(other.num, self.den).max(1);
        Self::new(
            mul(self.num / g1, other.num / g2)?,
            mul(self.den / g2, other.den / g1)?,
        )
    }

    pub fn checked_div(&self, other: &Self) -> Result<Self, MathError> {
        self.checked_mul(&other.recip()?)
    }

    pub fn recip(&self) -> Result<Self, MathError> {
        Self::new(self.den, self.num)
    }

    pub fn pow(&self, exp: i32) -> Result<Self, MathError> {
        let base = if exp < 0 { self.recip()? } else { *self };
        let mut result = Rational::ONE;
        for _ in 0..exp.unsigned_abs() {
            result = result.checked_mul(&base)?;
        }
        Ok(result)
    }

    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Parse an unsigned decimal literal such as `12` or `0.25`
    pub fn parse_decimal(literal: &str) -> Result<Self, MathError> {
        let (whole, fraction) = match literal.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (literal, ""),
        };
        let digits = format!("{}{}", whole, fraction);
        if digits.is_empty()
            || digits.len() > 30
            || !digits.chars().all(|c| c.is_ascii_digit())
        {
            return Err(MathError::Parse(format!("invalid number '{}'", literal)));
        }
        let num: i128 = digits
            .parse()
            .map_err(|_| MathError::Parse(format!("invalid number '{}'", literal)))?;
        let den = 10i128
            .checked_pow(fraction.len() as u32)
            .ok_or(MathError::Overflow)?;
        Self::new(num, den)
    }
}

fn mul(a: i128, b: i128) -> Result<i128, MathError> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

impl From<i128> for Rational {
    fn from(value: i128) -> Self {
        Rational::from_int(value)
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.num.checked_mul(other.den), other.num.checked_mul(self.den)) {
            (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
            _ => self
                .to_f64()
                .partial_cmp(&other.to_f64())
                .unwrap_or(Ordering::Equal),
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}
