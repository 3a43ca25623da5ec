use num_bigint::BigInt;
use thiserror::Error;

use crate::{algebra::math::Interpolation, algebra::radix::RadixError, document::DocumentError};

/// Everything that can stop a secret from being recovered.
///
/// Each failure is terminal for the call that produced it.
#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("Malformed share {index:?}: {source}")]
    MalformedShare {
        index: String,
        #[source]
        source: RadixError,
    },
    #[error("Insufficient shares: need {needed}, got {available}")]
    InsufficientShares { needed: usize, available: usize },
    #[error("Two shares have the same index x = {0}")]
    DuplicateAbscissa(BigInt),
    #[error("Malformed document: {0}")]
    MalformedDocument(#[from] DocumentError),
    #[error("Shares do not lie on an integer polynomial, the secret is {0}")]
    NonIntegralSecret(Interpolation),
}
