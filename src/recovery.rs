//! The full pipeline: document → shares → selected shares → secret.

use num_bigint::BigInt;
use num_traits::Zero;
use rayon::prelude::*;

use crate::{
    document::{self, Document, Limits},
    error::RecoveryError,
    schemes::{
        select::{DocumentOrder, Selection},
        shamir,
    },
};

/// A configured recovery.
///
/// * `policy`: which `k` shares to use
/// * `limits`: bounds on the input
/// * `strict`: reject non-integral secrets instead of rounding them
#[derive(Clone, Debug, Default)]
pub struct Recovery<S = DocumentOrder> {
    policy: S,
    limits: Limits,
    strict: bool,
}

impl Recovery {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Selection> Recovery<S> {
    pub fn with_policy<T: Selection>(self, policy: T) -> Recovery<T> {
        Recovery {
            policy,
            limits: self.limits,
            strict: self.strict,
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Recover the secret of a parsed document.
    #[tracing::instrument(skip_all, fields(k = document.k))]
    pub fn recover(&mut self, document: &Document) -> Result<BigInt, RecoveryError> {
        let k = document.threshold()?;
        let shares = document::decode_in(document, &self.limits, self.policy.key_order())?;
        let chosen = self.policy.select(&shares, k)?;

        let secret = shamir::reconstruct_at(&chosen, &BigInt::zero())?;
        if secret.is_integral() {
            return Ok(secret.round());
        }
        if self.strict {
            return Err(RecoveryError::NonIntegralSecret(secret));
        }
        tracing::debug!(%secret, "Rounding non-integral secret");
        Ok(secret.round())
    }

    /// Parse and recover a JSON document.
    pub fn recover_str(&mut self, json: &str) -> Result<BigInt, RecoveryError> {
        let document: Document = json.parse()?;
        self.recover(&document)
    }
}

/// Recover the secret from a JSON document, using the first `k` shares
/// in the document's enumeration order.
pub fn find_secret(json: &str) -> Result<BigInt, RecoveryError> {
    Recovery::new().recover_str(json)
}

/// Recover the secrets of many documents independently.
///
/// Runs in parallel when the `rayon` feature is enabled.
pub fn find_secrets<T: AsRef<str> + Sync>(documents: &[T]) -> Vec<Result<BigInt, RecoveryError>> {
    if cfg!(feature = "rayon") {
        documents
            .par_iter()
            .map(|json| find_secret(json.as_ref()))
            .collect()
    } else {
        documents
            .iter()
            .map(|json| find_secret(json.as_ref()))
            .collect()
    }
}
