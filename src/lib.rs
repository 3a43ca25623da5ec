//! Recover a Shamir secret from shares written in arbitrary radices.
//!
//! A document lists `n` shares of a hidden integer polynomial of degree
//! `k - 1`, each as an index plus a digit string in some base. The secret is
//! the polynomial's constant term, recovered by exact Lagrange interpolation:
//!
//! ```text
//! document ──decode──▶ shares ──select──▶ k shares ──reconstruct──▶ secret
//! ```
//!
//! Each stage is usable on its own, see [`document::decode`],
//! [`schemes::select`] and [`schemes::shamir::reconstruct`].
#![deny(unsafe_code)]

pub mod algebra;
pub mod document;
pub mod error;
pub mod recovery;
pub mod schemes;

use num_bigint::{BigInt, BigUint};

pub use document::{Document, Limits};
pub use error::RecoveryError;
pub use recovery::{find_secret, find_secrets, Recovery};

/// Parse a JSON problem description.
pub fn decode_test_case(json: &str) -> Result<Document, RecoveryError> {
    Ok(json.parse()?)
}

/// Convert a digit string in `base` into an integer.
pub fn convert_to_decimal(value: &str, base: u32) -> Result<BigUint, algebra::radix::RadixError> {
    algebra::radix::decode(value, base)
}

/// Evaluate the polynomial through `shares` at `target`, rounding to the nearest integer.
pub fn lagrange_interpolation(
    shares: &[schemes::Share],
    target: &BigInt,
) -> Result<BigInt, RecoveryError> {
    Ok(schemes::shamir::reconstruct_at(shares, target)?.round())
}
