//! Which `k` of the `n` decoded shares feed the reconstruction.
//!
//! Lagrange interpolation does not care about order, but when `n > k` the
//! policy decides *which* shares are used, and therefore which corrupted
//! shares can spoil the result.

use rand::{seq::index, Rng};

use crate::{document::KeyOrder, error::RecoveryError, schemes::shamir::Share};

/// A policy for picking exactly `k` shares.
///
/// Implementations never modify the input and fail with
/// [`RecoveryError::InsufficientShares`] when fewer than `k` are given.
pub trait Selection {
    fn select(&mut self, shares: &[Share], k: usize) -> Result<Vec<Share>, RecoveryError>;

    /// The order in which the document's shares should be decoded for this policy.
    fn key_order(&self) -> KeyOrder {
        KeyOrder::Enumeration
    }
}

impl<S: Selection + ?Sized> Selection for Box<S> {
    fn select(&mut self, shares: &[Share], k: usize) -> Result<Vec<Share>, RecoveryError> {
        (**self).select(shares, k)
    }

    fn key_order(&self) -> KeyOrder {
        (**self).key_order()
    }
}

fn ensure_enough(shares: &[Share], k: usize) -> Result<(), RecoveryError> {
    if shares.len() < k {
        return Err(RecoveryError::InsufficientShares {
            needed: k,
            available: shares.len(),
        });
    }
    Ok(())
}

/// The first `k` shares in the document's enumeration order.
///
/// See [`KeyOrder::Enumeration`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentOrder;

impl Selection for DocumentOrder {
    fn select(&mut self, shares: &[Share], k: usize) -> Result<Vec<Share>, RecoveryError> {
        ensure_enough(shares, k)?;
        Ok(shares[..k].to_vec())
    }
}

/// The first `k` shares exactly as the document lists them.
#[derive(Clone, Copy, Debug, Default)]
pub struct ListedOrder;

impl Selection for ListedOrder {
    fn select(&mut self, shares: &[Share], k: usize) -> Result<Vec<Share>, RecoveryError> {
        DocumentOrder.select(shares, k)
    }

    fn key_order(&self) -> KeyOrder {
        KeyOrder::Listed
    }
}

/// The `k` shares with the smallest indices, in ascending order.
#[derive(Clone, Copy, Debug, Default)]
pub struct AscendingIndex;

impl Selection for AscendingIndex {
    fn select(&mut self, shares: &[Share], k: usize) -> Result<Vec<Share>, RecoveryError> {
        ensure_enough(shares, k)?;
        let mut sorted = shares.to_vec();
        sorted.sort_by(|a, b| a.x.cmp(&b.x));
        sorted.truncate(k);
        Ok(sorted)
    }
}

/// A uniformly random `k`-subset, kept in input order.
#[derive(Clone, Debug)]
pub struct Randomized<R> {
    rng: R,
}

impl<R: Rng> Randomized<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Selection for Randomized<R> {
    fn select(&mut self, shares: &[Share], k: usize) -> Result<Vec<Share>, RecoveryError> {
        ensure_enough(shares, k)?;
        let mut picked = index::sample(&mut self.rng, shares.len(), k).into_vec();
        picked.sort_unstable();
        Ok(picked.into_iter().map(|i| shares[i].clone()).collect())
    }
}

/// Pick the first `k` shares as given.
pub fn select(shares: &[Share], k: usize) -> Result<Vec<Share>, RecoveryError> {
    DocumentOrder.select(shares, k)
}
