//! Exact rational scalar used for all simulation state
//!
//! Wraps `num_rational::BigRational` so that thousands of additive time steps
//! accumulate no floating-point drift. Floating point enters only through the
//! narrow `sin`/`cos`/`sqrt` fallbacks (transcendentals have no rational
//! closed form) and is converted back to exact form immediately.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use thiserror::Error;

/// Exact rational number
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Frac(BigRational);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid rational literal `{0}`")]
pub struct ParseFracError(pub String);

impl Frac {
    pub fn zero() -> Self {
        Frac(BigRational::zero())
    }

    pub fn one() -> Self {
        Frac(BigRational::one())
    }

    pub fn from_int(n: i64) -> Self {
        Frac(BigRational::from_integer(BigInt::from(n)))
    }

    /// Exact ratio `num / den`. `den` must be nonzero.
    pub fn ratio(num: i64, den: i64) -> Self {
        Frac(BigRational::new(BigInt::from(num), BigInt::from(den)))
    }

    /// Exact conversion of a finite float (every finite f64 is a dyadic
    /// rational). `None` for NaN and infinities.
    pub fn from_f64(v: f64) -> Option<Self> {
        BigRational::from_float(v).map(Frac)
    }

    // For results of sin/cos/sqrt on finite inputs, which are always finite.
    fn approx(v: f64) -> Self {
        BigRational::from_float(v).map(Frac).unwrap_or_else(Frac::zero)
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// -1, 0 or 1
    pub fn sign(&self) -> i64 {
        if self.0.is_zero() {
            0
        } else if self.0.is_negative() {
            -1
        } else {
            1
        }
    }

    pub fn abs(&self) -> Self {
        Frac(self.0.abs())
    }

    pub fn square(&self) -> Self {
        Frac(&self.0 * &self.0)
    }

    /// Integer power. Negative exponents invert; the value must then be nonzero.
    pub fn powi(&self, exp: i32) -> Self {
        Frac(self.0.pow(exp))
    }

    pub fn floor_i64(&self) -> Option<i64> {
        self.0.floor().to_integer().to_i64()
    }

    pub fn ceil_i64(&self) -> Option<i64> {
        self.0.ceil().to_integer().to_i64()
    }

    // f64 round-trips, re-rationalized on the way out
    pub fn sqrt(&self) -> Self {
        Frac::approx(self.to_f64().sqrt())
    }

    pub fn sin(&self) -> Self {
        Frac::approx(self.to_f64().sin())
    }

    pub fn cos(&self) -> Self {
        Frac::approx(self.to_f64().cos())
    }
}

impl From<i64> for Frac {
    fn from(n: i64) -> Self {
        Frac::from_int(n)
    }
}

impl fmt::Display for Frac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accepts integers (`-3`), ratios (`3/10`), and decimals with an optional
/// exponent (`0.25`, `1.5e-3`), all parsed exactly at arbitrary precision.
impl FromStr for Frac {
    type Err = ParseFracError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFracError(s.to_string());
        let text = s.trim();
        if text.is_empty() {
            return Err(err());
        }

        if let Some((num, den)) = text.split_once('/') {
            let num = BigInt::from_str(num.trim()).map_err(|_| err())?;
            let den = BigInt::from_str(den.trim()).map_err(|_| err())?;
            if den.is_zero() {
                return Err(err());
            }
            return Ok(Frac(BigRational::new(num, den)));
        }

        // Split off a decimal exponent, if any
        let (mantissa, exp) = match text.split_once(['e', 'E']) {
            Some((m, e)) => (m, i32::from_str(e).map_err(|_| err())?),
            None => (text, 0),
        };

        let (sign, digits) = match mantissa.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, mantissa.strip_prefix('+').unwrap_or(mantissa)),
        };

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(err());
        }

        // value = sign * int_part.frac_part * 10^exp
        let joined = format!("{}{}", int_part, frac_part);
        let unscaled = BigInt::from_str(&joined).map_err(|_| err())?;
        let scale = frac_part.len() as i32 - exp;
        let ten = BigInt::from(10);
        let value = if scale >= 0 {
            BigRational::new(unscaled, num_traits::pow(ten, scale as usize))
        } else {
            BigRational::from_integer(unscaled * num_traits::pow(ten, (-scale) as usize))
        };
        Ok(Frac(value * BigRational::from_integer(BigInt::from(sign))))
    }
}

// Arithmetic, by value and by reference
macro_rules! frac_binop {
    ($trait:ident, $method:ident) => {
        impl $trait for Frac {
            type Output = Frac;
            fn $method(self, rhs: Frac) -> Frac {
                Frac((self.0).$method(rhs.0))
            }
        }

        impl<'a, 'b> $trait<&'b Frac> for &'a Frac {
            type Output = Frac;
            fn $method(self, rhs: &'b Frac) -> Frac {
                Frac((&self.0).$method(&rhs.0))
            }
        }
    };
}

frac_binop!(Add, add);
frac_binop!(Sub, sub);
frac_binop!(Mul, mul);
frac_binop!(Div, div);

impl Neg for Frac {
    type Output = Frac;
    fn neg(self) -> Frac {
        Frac(-self.0)
    }
}

impl Neg for &Frac {
    type Output = Frac;
    fn neg(self) -> Frac {
        Frac(-&self.0)
    }
}

/// Deserializes from a JSON number or a numeric string, exactly either way.
impl<'de> Deserialize<'de> for Frac {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FracVisitor;

        impl<'de> Visitor<'de> for FracVisitor {
            type Value = Frac;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or a numeric string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Frac, E> {
                Ok(Frac::from_int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Frac, E> {
                Ok(Frac(BigRational::from_integer(BigInt::from(v))))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Frac, E> {
                Frac::from_f64(v).ok_or_else(|| E::custom("non-finite number"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Frac, E> {
                Frac::from_str(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(FracVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_strings_parse_exactly() {
        assert_eq!(Frac::from_str("0.3").unwrap(), Frac::ratio(3, 10));
        assert_eq!(Frac::from_str("-1.25").unwrap(), Frac::ratio(-5, 4));
        assert_eq!(Frac::from_str("3/10").unwrap(), Frac::ratio(3, 10));
        assert_eq!(Frac::from_str("1.5e-3").unwrap(), Frac::ratio(3, 2000));
        assert_eq!(Frac::from_str("2e2").unwrap(), Frac::from_int(200));
        assert!(Frac::from_str("1/0").is_err());
        assert!(Frac::from_str("abc").is_err());
    }

    #[test]
    fn floor_and_ceil() {
        let x = Frac::ratio(500, 3); // 166.66..
        assert_eq!(x.floor_i64(), Some(166));
        assert_eq!(x.ceil_i64(), Some(167));
        let y = Frac::ratio(-7, 2);
        assert_eq!(y.floor_i64(), Some(-4));
        assert_eq!(y.ceil_i64(), Some(-3));
    }

    #[test]
    fn float_round_trip_is_exact_for_dyadics() {
        let x = Frac::from_f64(0.5).unwrap();
        assert_eq!(x, Frac::ratio(1, 2));
        assert_eq!(x.to_f64(), 0.5);
    }
}
