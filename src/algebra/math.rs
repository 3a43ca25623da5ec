//! Exact Lagrange interpolation over the integers.
//!
//! Each basis polynomial `l_i(x) = prod( (x - x_k)/(x_i - x_k) | k != i)` is kept
//! as a numerator/denominator pair. The terms are brought onto one common
//! denominator and summed as integers, so the only division happens once, at
//! the very end, and nothing is ever rounded on the way.

use std::fmt;

use itertools::Itertools;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use thiserror::Error;

/// Two interpolation points share the abscissa.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Abscissa {0} appears more than once")]
pub struct RepeatedAbscissa(pub BigInt);

/// An exact evaluation result `numer / denom`.
///
/// Always reduced, with `denom > 0`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interpolation {
    numer: BigInt,
    denom: BigInt,
}

impl Interpolation {
    /// Build a reduced fraction.
    ///
    /// * `numer`: numerator
    /// * `denom`: non-zero denominator
    pub fn new(numer: BigInt, denom: BigInt) -> Self {
        assert!(!denom.is_zero(), "zero denominator");
        let g = numer.gcd(&denom);
        let (mut numer, mut denom) = (numer / &g, denom / &g);
        if denom.is_negative() {
            numer = -numer;
            denom = -denom;
        }
        Self { numer, denom }
    }

    pub fn numer(&self) -> &BigInt {
        &self.numer
    }

    pub fn denom(&self) -> &BigInt {
        &self.denom
    }

    pub fn is_integral(&self) -> bool {
        self.denom.is_one()
    }

    /// The value, if it is a whole number.
    pub fn to_integer(&self) -> Option<BigInt> {
        self.is_integral().then(|| self.numer.clone())
    }

    /// Nearest integer, halves rounded towards positive infinity.
    ///
    /// `floor(n/d + 1/2) = floor((2n + d) / 2d)`
    pub fn round(&self) -> BigInt {
        if self.is_integral() {
            return self.numer.clone();
        }
        let two_d: BigInt = &self.denom * 2u32;
        (&self.numer * 2u32 + &self.denom).div_floor(&two_d)
    }
}

impl From<BigInt> for Interpolation {
    fn from(value: BigInt) -> Self {
        Self {
            numer: value,
            denom: BigInt::one(),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integral() {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

/// Lagrange basis polynomials evaluated at `x`, as `(numerator, denominator)` pairs.
///
/// The `xs` must be pairwise distinct, otherwise a denominator is zero.
pub fn lagrange_coefficients(xs: &[BigInt], x: &BigInt) -> Vec<(BigInt, BigInt)> {
    xs.iter()
        .enumerate()
        .map(|(i, xi)| {
            let mut numer = BigInt::one();
            let mut denom = BigInt::one();
            for (m, xm) in xs.iter().enumerate() {
                if m != i {
                    numer *= x - xm;
                    denom *= xi - xm;
                }
            }
            (numer, denom)
        })
        .collect()
}

/// Evaluate the unique polynomial of degree `< xs.len()` through `(xs, ys)` at `x`.
///
/// Fails on the first repeated abscissa. An empty set of points evaluates to zero.
pub fn lagrange_interpolation(
    x: &BigInt,
    xs: &[BigInt],
    ys: &[BigInt],
) -> Result<Interpolation, RepeatedAbscissa> {
    debug_assert_eq!(xs.len(), ys.len());
    if let Some(dup) = xs.iter().duplicates().next() {
        return Err(RepeatedAbscissa(dup.clone()));
    }
    let ls = lagrange_coefficients(xs, x);

    // common denominator, lcm rather than the plain product keeps the sum small
    let common = ls
        .iter()
        .fold(BigInt::one(), |acc, (_, denom)| acc.lcm(denom));

    let mut sum = BigInt::zero();
    for ((numer, denom), yi) in ls.iter().zip(ys) {
        sum += yi * numer * (&common / denom);
    }
    Ok(Interpolation::new(sum, common))
}
