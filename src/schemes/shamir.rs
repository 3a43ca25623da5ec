//! Shamir Secret Sharing over the integers.
//! See <https://en.wikipedia.org/wiki/Shamir%27s_secret_sharing>
//!
//! There is no field here: shares are exact samples of an integer polynomial,
//! and reconstruction is exact rational Lagrange interpolation.
use num_bigint::BigInt;
use num_traits::Zero;
use rand::Rng;

use crate::{
    algebra::{
        math::{lagrange_interpolation, Interpolation, RepeatedAbscissa},
        poly::Polynomial,
    },
    error::RecoveryError,
};

/// Bit size of the random coefficients used when dealing.
pub const DEFAULT_COEFFICIENT_BITS: u64 = 128;

/// A decoded Shamir share.
/// This is a point evaluated at `x` given a secret polynomial.
/// Reconstruction can be done by obtaining `k` shares.
/// Shares with the same `x` can be added together.
///
/// * `x`: The index of the share
/// * `y`: The 'share' part of the share
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Share {
    pub x: BigInt,
    pub y: BigInt,
}

impl Share {
    pub fn new(x: impl Into<BigInt>, y: impl Into<BigInt>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

impl std::ops::Add for Share {
    type Output = Self;

    /// Add two shares together.
    /// Note: These must share the same `x` value.
    ///
    /// * `rhs`: the other share
    fn add(self, rhs: Self) -> Self::Output {
        assert_eq!(self.x, rhs.x);
        Self {
            x: self.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::iter::Sum for Share {
    fn sum<I: Iterator<Item = Self>>(mut iter: I) -> Self {
        let Some(first) = iter.next() else {
            return Share {
                x: BigInt::zero(),
                y: BigInt::zero(),
            };
        };
        iter.fold(first, |acc, share| acc + share)
    }
}

/// Share/shard a secret value `v` into `n` shares
/// where `n` is the number of the `ids`
///
/// * `v`: secret value to share
/// * `ids`: ids to share to
/// * `threshold`: threshold to reconstruct it
/// * `rng`: rng to generate shares from
pub fn share(v: &BigInt, ids: &[BigInt], threshold: usize, rng: &mut impl Rng) -> Vec<Share> {
    share_with_bits(v, ids, threshold, DEFAULT_COEFFICIENT_BITS, rng)
}

/// Like [`share`], but with random coefficients below `2^bits`.
pub fn share_with_bits(
    v: &BigInt,
    ids: &[BigInt],
    threshold: usize,
    bits: u64,
    rng: &mut impl Rng,
) -> Vec<Share> {
    let n = ids.len();
    assert!(threshold > 0, "Threshold must be positive");
    assert!(
        n >= threshold,
        "Threshold should be less-than-equal to the number of shares: t={threshold}, n={n}"
    );
    assert!(
        ids.iter().all(|x| !x.is_zero()),
        "ID with zero-element provided. Zero-based x coordinates are insecure as they disclose the secret."
    );

    // A polynomial of degree t - 1 needs t points to pin it down.
    let mut polynomial = Polynomial::random(threshold - 1, bits, rng);
    polynomial.0[0] = v.clone();
    let polynomial = polynomial;

    ids.iter()
        .map(|x| Share {
            x: x.clone(),
            y: polynomial.eval(x),
        })
        .collect()
}

/// Evaluate the polynomial through `shares` at `x`, exactly.
///
/// * `shares`: points with pairwise distinct `x`
/// * `x`: where to evaluate
pub fn reconstruct_at(shares: &[Share], x: &BigInt) -> Result<Interpolation, RecoveryError> {
    let (xs, ys): (Vec<BigInt>, Vec<BigInt>) =
        shares.iter().map(|s| (s.x.clone(), s.y.clone())).unzip();
    lagrange_interpolation(x, &xs, &ys)
        .map_err(|RepeatedAbscissa(dup)| RecoveryError::DuplicateAbscissa(dup))
}

/// Reconstruct or open shares
///
/// Evaluates at `x = 0` and rounds to the nearest integer (halves up).
/// Shares that really come from an integer polynomial need no rounding.
///
/// * `shares`: shares to be combined into an open value
pub fn reconstruct(shares: &[Share]) -> Result<BigInt, RecoveryError> {
    let secret = reconstruct_at(shares, &BigInt::zero())?;
    if !secret.is_integral() {
        tracing::debug!(%secret, "Rounding non-integral secret");
    }
    Ok(secret.round())
}

#[cfg(test)]
mod test {
    use itertools::Itertools;
    use rand::SeedableRng;

    use super::*;

    fn ids(range: std::ops::RangeInclusive<i64>) -> Vec<BigInt> {
        range.map(BigInt::from).collect()
    }

    #[test]
    fn simple() {
        // We test that we can secret-share a number and reconstruct it.
        let mut rng = rand::rngs::mock::StepRng::new(0, 7);
        let v = BigInt::from(42u32);
        let shares = share(&v, &ids(1..=5), 4, &mut rng);
        let v = reconstruct(&shares).unwrap();
        assert_eq!(v, BigInt::from(42u32));
    }

    #[test]
    fn any_subset() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let v: BigInt = "123456789012345678901234567890".parse().unwrap();
        let shares = share(&v, &ids(1..=6), 3, &mut rng);
        for subset in shares.iter().cloned().combinations(3) {
            assert_eq!(reconstruct(&subset).unwrap(), v);
        }
    }

    #[test]
    fn too_few_shares() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        let v = BigInt::from(1234);
        let shares = share(&v, &ids(1..=4), 4, &mut rng);
        let res = reconstruct(&shares[..3]).unwrap();
        assert_ne!(res, v);
    }

    #[test]
    fn single_share() {
        let shares = [Share::new(9, 77)];
        assert_eq!(reconstruct(&shares).unwrap(), BigInt::from(77));
    }

    #[test]
    fn addition() {
        // We test that we can secret-share two numbers and add them.
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let parties = ids(1..=4);
        let (a, b) = (BigInt::from(3), BigInt::from(7));
        let vs1 = share(&a, &parties, 4, &mut rng);
        let vs2 = share(&b, &parties, 4, &mut rng);

        let shares: Vec<_> = vs1.into_iter().zip(vs2).map(|(a, b)| a + b).collect();
        assert_eq!(reconstruct(&shares).unwrap(), BigInt::from(10));
    }

    #[test]
    fn sum() {
        let total: Share = [Share::new(2, 5), Share::new(2, 6), Share::new(2, -1)]
            .into_iter()
            .sum();
        assert_eq!(total, Share::new(2, 10));
    }

    #[test]
    fn duplicate_abscissa() {
        let shares = [Share::new(1, 4), Share::new(2, 8), Share::new(1, 5)];
        let err = reconstruct(&shares).unwrap_err();
        assert!(matches!(err, RecoveryError::DuplicateAbscissa(x) if x == BigInt::from(1)));
    }

    #[test]
    fn order_independent() {
        let forward = [Share::new(1, 4), Share::new(2, 11112), Share::new(3, 69420)];
        let mut backward = forward.clone();
        backward.reverse();
        assert_eq!(reconstruct(&forward).unwrap(), BigInt::from(36096));
        assert_eq!(reconstruct(&backward).unwrap(), BigInt::from(36096));
    }

    #[test]
    fn evaluate_at_share() {
        let shares = [Share::new(1, 4), Share::new(2, 11112), Share::new(3, 69420)];
        let y = reconstruct_at(&shares, &BigInt::from(2)).unwrap();
        assert_eq!(y.to_integer(), Some(BigInt::from(11112)));
    }

    #[test]
    #[should_panic]
    fn zero_id() {
        let mut rng = rand::rngs::mock::StepRng::new(0, 7);
        share(&BigInt::from(1), &ids(0..=3), 2, &mut rng);
    }
}
