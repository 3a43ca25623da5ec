//! The JSON problem description and the decoder turning it into shares.
//!
//! ```json
//! {
//!   "n": 4,
//!   "k": 3,
//!   "roots": {
//!     "1": { "base": "10", "value": "4" },
//!     "2": { "base": "16", "value": "2b68" }
//!   }
//! }
//! ```
//!
//! `roots` keeps the order in which the document lists its keys. Decoding
//! walks them in [`KeyOrder::Enumeration`] by default: canonical array-index
//! keys ascending, then every other key as listed.

use std::{fmt, io::Read, str::FromStr};

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    algebra::radix::{self, RadixError},
    error::RecoveryError,
    schemes::shamir::Share,
};

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Invalid document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not read document: {0}")]
    Io(#[from] std::io::Error),
    #[error("Threshold k = {0} must be positive")]
    NonPositiveThreshold(i64),
    #[error("Share count n = {0} must be positive")]
    NonPositiveTotal(i64),
    #[error("Threshold k = {k} exceeds share count n = {n}")]
    ThresholdExceedsTotal { k: i64, n: i64 },
    #[error("Document has {count} shares, the limit is {limit}")]
    TooManyShares { count: usize, limit: usize },
}

/// Bounds on untrusted input, keeping the big-integer work in check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Most entries accepted in `roots`.
    pub max_shares: usize,
    /// Longest digit string accepted in a share index or value.
    pub max_digits: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_shares: 1024,
            max_digits: 4096,
        }
    }
}

impl Limits {
    pub fn unbounded() -> Self {
        Self {
            max_shares: usize::MAX,
            max_digits: usize::MAX,
        }
    }
}

/// The radix of a share, written either as a JSON string or a JSON integer.
///
/// Any other JSON type, floats such as `16.0` included, fails the whole
/// document at parse time rather than the one share.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Radix {
    Number(i64),
    Text(String),
}

impl Radix {
    pub fn parse(&self) -> Result<u32, RadixError> {
        match self {
            Radix::Number(n) => match u64::try_from(*n) {
                Ok(n) => radix::check_radix(n),
                Err(_) => Err(RadixError::InvalidBase(n.to_string())),
            },
            Radix::Text(text) => radix::parse_radix(text),
        }
    }
}

impl From<u32> for Radix {
    fn from(radix: u32) -> Self {
        Radix::Text(radix.to_string())
    }
}

/// One encoded share: `value` written in `base`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Root {
    pub base: Radix,
    pub value: String,
}

/// A full problem instance.
///
/// * `n`: total number of shares
/// * `k`: reconstruction threshold
/// * `roots`: index string to encoded share, in document order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub n: i64,
    pub k: i64,
    #[serde(with = "ordered")]
    pub roots: Vec<(String, Root)>,
}

impl FromStr for Document {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Document {
    pub fn from_reader(mut reader: impl Read) -> Result<Self, DocumentError> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        json.parse()
    }

    /// The threshold `k`, after checking that `0 < k <= n`.
    pub fn threshold(&self) -> Result<usize, DocumentError> {
        let Self { n, k, .. } = *self;
        if k <= 0 {
            return Err(DocumentError::NonPositiveThreshold(k));
        }
        if n <= 0 {
            return Err(DocumentError::NonPositiveTotal(n));
        }
        if k > n {
            return Err(DocumentError::ThresholdExceedsTotal { k, n });
        }
        usize::try_from(k).map_err(|_| DocumentError::ThresholdExceedsTotal { k, n })
    }

    /// The roots in the given order.
    pub fn entries(&self, order: KeyOrder) -> Vec<&(String, Root)> {
        let mut entries: Vec<_> = self.roots.iter().collect();
        if order == KeyOrder::Enumeration {
            // stable, so non-index keys keep their listed order
            entries.sort_by_key(|(key, _)| array_index(key).map_or((1, 0), |i| (0, i)));
        }
        entries
    }

    /// Encode shares into a document, writing every value in `base`.
    ///
    /// * `shares`: shares with positive `x` and non-negative `y`
    /// * `k`: threshold to record
    /// * `base`: radix for the values
    pub fn from_shares(shares: &[Share], k: usize, base: u32) -> Result<Self, RadixError> {
        let base = radix::check_radix(base.into())?;
        let roots = shares
            .iter()
            .map(|Share { x, y }| {
                if x.sign() != num_bigint::Sign::Plus {
                    return Err(RadixError::InvalidIndex(x.to_string()));
                }
                let value = y
                    .to_biguint()
                    .ok_or_else(|| RadixError::Negative(y.clone()))?;
                let root = Root {
                    base: base.into(),
                    value: radix::encode(&value, base)?,
                };
                Ok((x.to_string(), root))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            n: shares.len() as i64,
            k: k as i64,
            roots,
        })
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// How the keys of `roots` are walked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyOrder {
    /// Canonical array-index keys in ascending numeric order, then the
    /// remaining keys as listed. This is how a JavaScript object enumerates.
    #[default]
    Enumeration,
    /// Exactly as the document lists them.
    Listed,
}

/// The value of a canonical array-index key: decimal digits without leading
/// zeros, below `2^32 - 1`.
fn array_index(key: &str) -> Option<u32> {
    let canonical =
        key.bytes().all(|b| b.is_ascii_digit()) && (key == "0" || !key.starts_with('0'));
    if !canonical {
        return None;
    }
    key.parse::<u32>().ok().filter(|&i| i != u32::MAX)
}

/// Decode every share of the document, in enumeration order.
///
/// All roots are decoded, including those a selection policy will skip,
/// so a single malformed share fails the whole document.
///
/// * `document`: the problem instance
/// * `limits`: bounds to enforce on the input
pub fn decode(document: &Document, limits: &Limits) -> Result<Vec<Share>, RecoveryError> {
    decode_in(document, limits, KeyOrder::Enumeration)
}

/// Decode every share of the document, walking the keys in `order`.
#[tracing::instrument(skip_all, fields(n = document.n, k = document.k, order = ?order))]
pub fn decode_in(
    document: &Document,
    limits: &Limits,
    order: KeyOrder,
) -> Result<Vec<Share>, RecoveryError> {
    document.threshold()?;

    let count = document.roots.len();
    if count > limits.max_shares {
        return Err(DocumentError::TooManyShares {
            count,
            limit: limits.max_shares,
        }
        .into());
    }
    if usize::try_from(document.n).ok() != Some(count) {
        tracing::warn!(count, "Number of roots does not match n");
    }

    let shares = document
        .entries(order)
        .into_iter()
        .map(|(index, root)| {
            decode_root(index, root, limits).map_err(|source| RecoveryError::MalformedShare {
                index: index.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(count, "Decoded shares");
    Ok(shares)
}

fn decode_root(index: &str, root: &Root, limits: &Limits) -> Result<Share, RadixError> {
    let len = index.chars().count();
    if len > limits.max_digits {
        return Err(RadixError::TooLong {
            len,
            limit: limits.max_digits,
        });
    }
    let x = radix::decode(index, 10)
        .ok()
        .filter(|x| x.bits() > 0)
        .ok_or_else(|| RadixError::InvalidIndex(index.to_owned()))?;

    let base = root.base.parse()?;
    let len = root.value.chars().count();
    if len > limits.max_digits {
        return Err(RadixError::TooLong {
            len,
            limit: limits.max_digits,
        });
    }
    let y = radix::decode(&root.value, base)?;

    Ok(Share {
        x: BigInt::from(x),
        y: BigInt::from(y),
    })
}

/// (De)serialize a JSON object as a list of entries, keeping key order.
mod ordered {
    use std::fmt;

    use serde::{
        de::{MapAccess, Visitor},
        ser::SerializeMap,
        Deserializer, Serializer,
    };

    use super::Root;

    pub fn serialize<S: Serializer>(
        roots: &[(String, Root)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(roots.len()))?;
        for (index, root) in roots {
            map.serialize_entry(index, root)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, Root)>, D::Error> {
        struct RootsVisitor;

        impl<'de> Visitor<'de> for RootsVisitor {
            type Value = Vec<(String, Root)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from share index to {base, value}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut roots = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, Root>()? {
                    roots.push(entry);
                }
                Ok(roots)
            }
        }

        deserializer.deserialize_map(RootsVisitor)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const CASE_ONE: &str = r#"{
        "n": 4,
        "k": 3,
        "roots": {
            "1": { "base": "10", "value": "4" },
            "2": { "base": "10", "value": "11112" },
            "3": { "base": "10", "value": "69420" },
            "6": { "base": "10", "value": "36288000" }
        }
    }"#;

    fn doc(roots: &str, n: i64, k: i64) -> Document {
        format!(r#"{{ "n": {n}, "k": {k}, "roots": {{ {roots} }} }}"#)
            .parse()
            .unwrap()
    }

    #[test]
    fn parse() {
        let document: Document = CASE_ONE.parse().unwrap();
        assert_eq!(document.n, 4);
        assert_eq!(document.k, 3);
        assert_eq!(document.threshold().unwrap(), 3);
        let keys: Vec<_> = document.roots.iter().map(|(i, _)| i.as_str()).collect();
        assert_eq!(keys, ["1", "2", "3", "6"]);
    }

    #[test]
    fn decoding_order() {
        let document = doc(
            r#""10": {"base": "2", "value": "1"}, "2": {"base": "2", "value": "10"}, "1": {"base": "2", "value": "11"}"#,
            3,
            2,
        );
        let xs = |order: KeyOrder| -> Vec<String> {
            decode_in(&document, &Limits::default(), order)
                .unwrap()
                .iter()
                .map(|s| s.x.to_string())
                .collect()
        };
        assert_eq!(xs(KeyOrder::Enumeration), ["1", "2", "10"]);
        assert_eq!(xs(KeyOrder::Listed), ["10", "2", "1"]);
        let keys: Vec<_> = document.roots.iter().map(|(i, _)| i.as_str()).collect();
        assert_eq!(keys, ["10", "2", "1"]);
    }

    #[test]
    fn enumeration_order() {
        let document = doc(
            r#""4294967295": {"base": "10", "value": "1"},
               "10": {"base": "10", "value": "1"},
               "007": {"base": "10", "value": "1"},
               "2": {"base": "10", "value": "1"},
               "4294967294": {"base": "10", "value": "1"},
               "08": {"base": "10", "value": "1"},
               "1": {"base": "10", "value": "1"}"#,
            7,
            1,
        );
        let keys: Vec<_> = document
            .entries(KeyOrder::Enumeration)
            .into_iter()
            .map(|(i, _)| i.as_str())
            .collect();
        assert_eq!(
            keys,
            ["1", "2", "10", "4294967294", "4294967295", "007", "08"]
        );
    }

    #[test]
    fn array_index_keys() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("42"), Some(42));
        assert_eq!(array_index("4294967294"), Some(u32::MAX - 1));
        for key in ["", "01", "00", "4294967295", "99999999999", "+1", "1.0", "a"] {
            assert_eq!(array_index(key), None, "{key}");
        }
    }

    #[test]
    fn numeric_base() {
        let document = doc(r#""1": {"base": 16, "value": "FF"}"#, 1, 1);
        let shares = decode(&document, &Limits::default()).unwrap();
        assert_eq!(shares, vec![Share::new(1, 255)]);
    }

    #[test]
    fn missing_fields() {
        for json in [
            r#"{"n": 1, "roots": {}}"#,
            r#"{"k": 1, "roots": {}}"#,
            r#"{"n": 1, "k": 1}"#,
            r#"{"n": 1, "k": 1, "roots": {"1": {"base": "10"}}}"#,
            "not json",
        ] {
            let err = json.parse::<Document>().unwrap_err();
            assert!(matches!(err, DocumentError::Json(_)), "{json}");
        }
    }

    #[test]
    fn bad_threshold() {
        let root = r#""1": {"base": "10", "value": "4"}"#;
        let err = decode(&doc(root, 1, 0), &Limits::default()).unwrap_err();
        assert!(matches!(
            err,
            RecoveryError::MalformedDocument(DocumentError::NonPositiveThreshold(0))
        ));

        let err = decode(&doc(root, 1, 2), &Limits::default()).unwrap_err();
        assert!(matches!(
            err,
            RecoveryError::MalformedDocument(DocumentError::ThresholdExceedsTotal { k: 2, n: 1 })
        ));

        let err = decode(&doc(root, -1, -1), &Limits::default()).unwrap_err();
        assert!(matches!(
            err,
            RecoveryError::MalformedDocument(DocumentError::NonPositiveThreshold(-1))
        ));
    }

    #[test]
    fn invalid_digit() {
        let document = doc(
            r#""1": {"base": "10", "value": "4"}, "2": {"base": "8", "value": "129"}"#,
            2,
            1,
        );
        let err = decode(&document, &Limits::default()).unwrap_err();
        match err {
            RecoveryError::MalformedShare { index, source } => {
                assert_eq!(index, "2");
                assert_eq!(
                    source,
                    RadixError::InvalidDigit {
                        digit: '9',
                        position: 2,
                        base: 8
                    }
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_index() {
        for index in ["0", "abc", "-1", ""] {
            let document = doc(&format!(r#""{index}": {{"base": "10", "value": "4"}}"#), 1, 1);
            let err = decode(&document, &Limits::default()).unwrap_err();
            assert!(
                matches!(
                    &err,
                    RecoveryError::MalformedShare {
                        source: RadixError::InvalidIndex(_),
                        ..
                    }
                ),
                "{index}: {err}"
            );
        }
    }

    #[test]
    fn bad_base() {
        for base in [r#""1""#, r#""37""#, r#""ten""#, "-2"] {
            let document = doc(&format!(r#""1": {{"base": {base}, "value": "0"}}"#), 1, 1);
            let err = decode(&document, &Limits::default()).unwrap_err();
            assert!(
                matches!(
                    &err,
                    RecoveryError::MalformedShare {
                        source: RadixError::UnsupportedBase(_) | RadixError::InvalidBase(_),
                        ..
                    }
                ),
                "{base}: {err}"
            );
        }
    }

    #[test]
    fn limits() {
        let document: Document = CASE_ONE.parse().unwrap();
        let tight = Limits {
            max_shares: 3,
            ..Limits::default()
        };
        let err = decode(&document, &tight).unwrap_err();
        assert!(matches!(
            err,
            RecoveryError::MalformedDocument(DocumentError::TooManyShares { count: 4, limit: 3 })
        ));

        let short = Limits {
            max_digits: 4,
            ..Limits::default()
        };
        let err = decode(&document, &short).unwrap_err();
        assert!(matches!(
            err,
            RecoveryError::MalformedShare {
                source: RadixError::TooLong { len: 5, limit: 4 },
                ..
            }
        ));
        assert!(decode(&document, &Limits::unbounded()).is_ok());
    }

    #[test]
    fn limits_cover_the_index() {
        let index = "1".repeat(20000);
        let document = doc(&format!(r#""{index}": {{"base": "10", "value": "4"}}"#), 1, 1);
        let tight = Limits {
            max_shares: 4,
            max_digits: 4,
        };
        let err = decode(&document, &tight).unwrap_err();
        match err {
            RecoveryError::MalformedShare { index: key, source } => {
                assert_eq!(key, index);
                assert_eq!(
                    source,
                    RadixError::TooLong {
                        len: 20000,
                        limit: 4
                    }
                );
            }
            other => panic!("unexpected {other:?}"),
        }

        let document = doc(r#""12345": {"base": "10", "value": "4"}"#, 1, 1);
        assert!(matches!(
            decode(&document, &tight).unwrap_err(),
            RecoveryError::MalformedShare {
                source: RadixError::TooLong { len: 5, limit: 4 },
                ..
            }
        ));
        let document = doc(r#""1234": {"base": "10", "value": "4"}"#, 1, 1);
        assert_eq!(
            decode(&document, &tight).unwrap(),
            vec![Share::new(1234, 4)]
        );
    }

    #[test]
    fn unreadable_input() {
        let err = Document::from_reader(&b"{\"n\": \xff}"[..]).unwrap_err();
        assert!(matches!(err, DocumentError::Io(_)), "{err}");
    }

    #[test]
    fn float_base_fails_the_document() {
        let err = r#"{"n": 1, "k": 1, "roots": {"1": {"base": 16.0, "value": "ff"}}}"#
            .parse::<Document>()
            .unwrap_err();
        assert!(matches!(err, DocumentError::Json(_)));
    }

    #[test]
    fn limits_from_json() {
        let limits: Limits = serde_json::from_str(r#"{"max_digits": 10}"#).unwrap();
        assert_eq!(limits.max_digits, 10);
        assert_eq!(limits.max_shares, Limits::default().max_shares);
    }

    #[test]
    fn duplicate_keys_are_kept() {
        let document = doc(
            r#""1": {"base": "10", "value": "4"}, "1": {"base": "10", "value": "5"}"#,
            2,
            2,
        );
        let shares = decode(&document, &Limits::default()).unwrap();
        assert_eq!(shares.len(), 2);
    }

    #[test_log::test]
    fn count_mismatch_is_not_an_error() {
        let document = doc(r#""1": {"base": "10", "value": "4"}"#, 5, 1);
        assert!(decode(&document, &Limits::default()).is_ok());
    }

    #[test]
    fn serialize_roundtrip() {
        let document: Document = CASE_ONE.parse().unwrap();
        let json = serde_json::to_string(&document).unwrap();
        assert!(json.contains(r#""roots":{"1":{"base":"10","value":"4"}"#));
        let again: Document = json.parse().unwrap();
        assert_eq!(again, document);
    }

    #[test]
    fn from_shares() {
        let shares = vec![Share::new(1, 255), Share::new(2, 16)];
        let document = Document::from_shares(&shares, 2, 16).unwrap();
        assert_eq!(document.n, 2);
        assert_eq!(document.k, 2);
        assert_eq!(
            document.roots[0],
            (
                "1".to_owned(),
                Root {
                    base: Radix::Text("16".to_owned()),
                    value: "ff".to_owned()
                }
            )
        );
        assert_eq!(decode(&document, &Limits::default()).unwrap(), shares);
    }

    #[test]
    fn from_shares_rejects_negative() {
        let err = Document::from_shares(&[Share::new(1, -3)], 1, 10).unwrap_err();
        assert_eq!(err, RadixError::Negative(BigInt::from(-3)));
        let err = Document::from_shares(&[Share::new(0, 3)], 1, 10).unwrap_err();
        assert_eq!(err, RadixError::InvalidIndex("0".to_owned()));
    }
}
