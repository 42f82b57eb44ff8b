// crates/trustnet-core/src/timestamp.rs
//
// Composite timestamps for the trustnet reputation service.
//
// A timestamp is a sequence of unsigned 64-bit components, component 0
// most significant, interpreted as one big composite unsigned integer.
// Applications assign their own meaning to the components (seconds,
// block height, sequence numbers); the core only relies on the total
// order and on the windowing arithmetic below.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::TrustNetError;

/// A composite multi-component timestamp, ordered as one big unsigned
/// integer. `[0, 5]` and `[5]` are the same instant; the empty
/// sequence is zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(Vec<u64>);

impl Timestamp {
    /// The zero timestamp (no components).
    pub fn zero() -> Self {
        Self(Vec::new())
    }

    /// Build a timestamp from qword components, component 0 most
    /// significant.
    pub fn from_qwords(qwords: impl Into<Vec<u64>>) -> Self {
        Self(qwords.into())
    }

    /// The raw components as supplied (leading zeros preserved).
    pub fn qwords(&self) -> &[u64] {
        &self.0
    }

    /// True if the composite value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }

    /// The components with leading zeros stripped; the canonical
    /// magnitude used for comparison and hashing.
    fn magnitude(&self) -> &[u64] {
        let start = self.0.iter().position(|&c| c != 0).unwrap_or(self.0.len());
        &self.0[start..]
    }

    /// The composite-integer value.
    fn to_biguint(&self) -> BigUint {
        let mut bytes = Vec::with_capacity(self.0.len() * 8);
        for q in &self.0 {
            bytes.extend_from_slice(&q.to_be_bytes());
        }
        BigUint::from_bytes_be(&bytes)
    }

    /// Re-encode a composite integer as a timestamp, left-padded with
    /// zero components to `min_components`.
    fn from_biguint(value: &BigUint, min_components: usize) -> Self {
        let mut digits = value.to_u64_digits();
        digits.reverse(); // to_u64_digits is least significant first
        if digits.len() < min_components {
            let mut padded = vec![0u64; min_components - digits.len()];
            padded.extend_from_slice(&digits);
            digits = padded;
        }
        Self(digits)
    }

    /// The start of the window containing this timestamp:
    /// `self - (self mod period)` on the composite integers.
    ///
    /// The result carries at least as many components as `self`.
    /// Fails `InvalidArgument` if `period` is zero.
    pub fn window(&self, period: &Timestamp) -> Result<Timestamp, TrustNetError> {
        if period.is_zero() {
            return Err(TrustNetError::InvalidArgument(
                "window period must be nonzero".into(),
            ));
        }
        let ts = self.to_biguint();
        let p = period.to_biguint();
        let floored = &ts - (&ts % &p);
        Ok(Self::from_biguint(&floored, self.0.len()))
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.magnitude() == other.magnitude()
    }
}

impl Eq for Timestamp {}

impl Hash for Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.magnitude().hash(state);
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        let a = self.magnitude();
        let b = other.magnitude();
        // More significant components first, so a longer magnitude is
        // strictly larger and equal lengths compare lexicographically.
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, q) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", q)?;
        }
        write!(f, "]")
    }
}

impl From<u64> for Timestamp {
    fn from(value: u64) -> Self {
        Self(vec![value])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_forms_compare_equal() {
        assert_eq!(Timestamp::zero(), Timestamp::from_qwords(vec![0, 0]));
        assert!(Timestamp::from_qwords(vec![0, 0, 0]).is_zero());
    }

    #[test]
    fn leading_zeros_do_not_affect_order() {
        let a = Timestamp::from_qwords(vec![0, 5]);
        let b = Timestamp::from_qwords(vec![5]);
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn component_zero_is_most_significant() {
        let low = Timestamp::from_qwords(vec![1, u64::MAX]);
        let high = Timestamp::from_qwords(vec![2, 0]);
        assert!(low < high);
    }

    #[test]
    fn longer_magnitude_is_larger() {
        let one_word = Timestamp::from_qwords(vec![u64::MAX]);
        let two_words = Timestamp::from_qwords(vec![1, 0]);
        assert!(one_word < two_words);
    }

    #[test]
    fn window_floors_to_period_multiple() {
        let period = Timestamp::from(1000);
        assert_eq!(
            Timestamp::from(9947).window(&period).unwrap(),
            Timestamp::from(9000)
        );
        assert_eq!(
            Timestamp::from(10814).window(&period).unwrap(),
            Timestamp::from(10000)
        );
        assert_eq!(
            Timestamp::from(12000).window(&period).unwrap(),
            Timestamp::from(12000)
        );
    }

    #[test]
    fn window_spans_component_boundaries() {
        // ts = 3 * 2^64 + 7, period = 2^64 -> window = 3 * 2^64.
        let ts = Timestamp::from_qwords(vec![3, 7]);
        let period = Timestamp::from_qwords(vec![1, 0]);
        let w = ts.window(&period).unwrap();
        assert_eq!(w, Timestamp::from_qwords(vec![3, 0]));
        assert_eq!(w.qwords().len(), 2);
    }

    #[test]
    fn window_rejects_zero_period() {
        let err = Timestamp::from(5).window(&Timestamp::zero()).unwrap_err();
        assert!(matches!(err, TrustNetError::InvalidArgument(_)));
    }

    #[test]
    fn serde_round_trip_is_a_plain_array() {
        let ts = Timestamp::from_qwords(vec![1, 2, 3]);
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "[1,2,3]");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
