use num_bigint::{BigInt, RandBigInt};
use num_traits::Zero;
use rand::Rng;

/// A polynomial with integer coefficients, lowest degree first.
///
/// `Polynomial(vec![a0, a1, a2])` is `a0 + a1 x + a2 x^2`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynomial(pub Vec<BigInt>);

impl Polynomial {
    /// Evaluate `x` in the polynomial `f`, such you obtain `f(x)`
    ///
    /// * `x`: value to map from
    pub fn eval(&self, x: &BigInt) -> BigInt {
        // Horner: a0 + x(a1 + x(a2 + ...))
        self.0
            .iter()
            .rev()
            .fold(BigInt::zero(), |acc, a| acc * x + a)
    }

    pub fn degree(&self) -> usize {
        // a0 + a1x1 is degree(1)
        self.0.len().saturating_sub(1)
    }

    /// The constant term, i.e. `f(0)`.
    pub fn constant(&self) -> BigInt {
        self.0.first().cloned().unwrap_or_default()
    }

    /// Sample a random polynomial with non-negative coefficients below `2^bits`
    ///
    /// * `degree`: the degree of the polynomial
    /// * `bits`: bit size of each coefficient
    /// * `rng`: random number generator to use
    pub fn random(degree: usize, bits: u64, rng: &mut impl Rng) -> Self {
        (0..=degree)
            .map(|_| BigInt::from(rng.gen_biguint(bits)))
            .collect()
    }
}

impl FromIterator<BigInt> for Polynomial {
    fn from_iter<T: IntoIterator<Item = BigInt>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
