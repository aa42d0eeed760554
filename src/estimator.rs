//! Cardinality estimator allows to estimate number of distinct elements
//! in the stream or dataset. It is defined by a single precision parameter
//! `p` in [4..18] range, which defines number of bits used for register
//! indices, giving `m = 2^p` registers of one byte each.
//!
//! # Algorithm
//!
//! Every item is reduced to a 64-bit fingerprint `h`:
//! - top `p` bits of `h` select a register,
//! - remaining `64 - p` bits form a word `w` whose rank (1-indexed position of
//!   the leftmost set bit within the `64 - p` bit window, or `64 - p + 1` when
//!   `w == 0`) is stored in the register if larger than its current value.
//!
//! The estimate is the classic HyperLogLog raw estimate
//! `alpha_m * m^2 / sum(2^-register)`, replaced by linear counting
//! `m * ln(m / zeros)` while the raw estimate is at most `2.5 * m` and some
//! registers are still zero.
//!
//! No large-range correction is applied. With 64-bit fingerprints the hash
//! space is large enough for practical inputs; when cardinality is much larger
//! than `m`, use a larger `p`.
//!
//! Expected error is `1.04 / sqrt(m)`:
//! - P = 10: 3.25%
//! - P = 12: 1.62%
//! - P = 14: 0.81%
//! - P = 18: 0.20%
//!
//! # Low latency
//! Number of zero registers and registers' harmonic sum are updated
//! whenever a register changes, so `count` does not scan the registers.

use std::fmt::{Debug, Formatter};
use std::mem::{size_of, size_of_val};

use crate::config::DEFAULT_PRECISION;
use crate::error::{Result, SketchError};
use crate::hash::fingerprint;

/// Smallest supported precision
pub const MIN_PRECISION: u8 = 4;
/// Largest supported precision
pub const MAX_PRECISION: u8 = 18;

/// HyperLogLog cardinality estimator with `2^p` byte registers.
#[derive(Clone, PartialEq)]
pub struct CardinalityEstimator {
    /// Number of bits used for register indices
    precision: u8,
    /// Register ranks
    registers: Box<[u8]>,
    /// Number of registers set to 0
    zeros: usize,
    /// Harmonic sum of registers, i.e. `sum(2^-register)`
    sum: f64,
    /// Bias correction constant for `m` registers
    alpha: f64,
}

impl CardinalityEstimator {
    /// Creates new instance of `CardinalityEstimator` with `2^precision` registers
    pub fn new(precision: u8) -> Result<Self> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(SketchError::invalid(
                "precision",
                format!(
                    "{} is outside [{}..{}]",
                    precision, MIN_PRECISION, MAX_PRECISION
                ),
            ));
        }

        Ok(Self::with_precision(precision))
    }

    /// Create estimator for an already validated precision
    fn with_precision(precision: u8) -> Self {
        let m = 1usize << precision;
        tracing::debug!(precision, registers = m, "creating cardinality estimator");

        Self {
            precision,
            registers: vec![0u8; m].into_boxed_slice(),
            zeros: m,
            sum: m as f64,
            alpha: alpha(m),
        }
    }

    /// Insert an item into `CardinalityEstimator`
    #[inline]
    pub fn add(&mut self, item: impl AsRef<[u8]>) {
        self.add_hash(fingerprint(item.as_ref()));
    }

    /// Insert an already computed 64-bit fingerprint into `CardinalityEstimator`
    #[inline]
    pub fn add_hash(&mut self, hash: u64) {
        let (idx, rank) = self.decode_hash(hash);
        self.update_rank(idx, rank);
    }

    /// Return cardinality estimate
    #[inline]
    pub fn count(&self) -> f64 {
        let m = self.registers.len() as f64;
        let raw = self.alpha * m * m / self.sum;
        if raw <= 2.5 * m && self.zeros > 0 {
            m * (m / self.zeros as f64).ln()
        } else {
            raw
        }
    }

    /// Return number of bits used for register indices
    #[inline]
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Return number of registers, `2^precision`
    #[inline]
    pub fn num_registers(&self) -> usize {
        self.registers.len()
    }

    /// Return register ranks
    #[inline]
    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    /// Return whether nothing was added yet
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.zeros == self.registers.len()
    }

    /// Return expected relative standard error of estimates, `1.04 / sqrt(m)`
    #[inline]
    pub fn standard_error(&self) -> f64 {
        1.04 / (self.registers.len() as f64).sqrt()
    }

    /// Return memory size of `CardinalityEstimator`
    pub fn size_of(&self) -> usize {
        size_of::<Self>() + size_of_val(&*self.registers)
    }

    /// Return register index and rank from 64-bit hash
    #[inline]
    fn decode_hash(&self, hash: u64) -> (usize, u8) {
        let p = u32::from(self.precision);
        let idx = (hash >> (64 - p)) as usize;
        let w = hash & ((1u64 << (64 - p)) - 1);
        // `w` has its top `p` bits cleared, so its leading zeros are
        // offset by `p` relative to the `64 - p` bit window.
        let rank = if w == 0 {
            64 - p + 1
        } else {
            w.leading_zeros() - p + 1
        };
        (idx, rank as u8)
    }

    /// Raise register `idx` to `new_rank` if it is lower
    #[inline]
    fn update_rank(&mut self, idx: usize, new_rank: u8) {
        let old_rank = self.registers[idx];
        if new_rank <= old_rank {
            return;
        }
        self.registers[idx] = new_rank;

        if old_rank == 0 {
            self.zeros -= 1;
        }
        self.sum -= inverse_pow2(old_rank);
        self.sum += inverse_pow2(new_rank);
    }
}

impl Default for CardinalityEstimator {
    fn default() -> Self {
        Self::with_precision(DEFAULT_PRECISION)
    }
}

impl Debug for CardinalityEstimator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ precision: {}, estimate: {:.0}, size: {} }}",
            self.precision,
            self.count(),
            self.size_of()
        )
    }
}

/// Parameter for bias correction
#[inline]
fn alpha(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / (m as f64)),
    }
}

/// Return `2^-rank`
#[inline]
fn inverse_pow2(rank: u8) -> f64 {
    2f64.powi(-i32::from(rank))
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0 => "{ precision: 10, estimate: 0, size: 1072 }")]
    #[test_case(1 => "{ precision: 10, estimate: 1, size: 1072 }")]
    fn test_estimator_p10_small(n: usize) -> String {
        let mut e = CardinalityEstimator::new(10).unwrap();
        for i in 0..n {
            e.add(i.to_le_bytes());
        }
        format!("{:?}", e)
    }

    #[test_case(100, 0.05; "hundred items")]
    #[test_case(1_000, 0.05; "thousand items")]
    #[test_case(5_000, 0.06; "five thousand items")]
    #[test_case(100_000, 0.07; "hundred thousand items")]
    fn test_estimator_p12(n: usize, max_err: f64) {
        let mut e = CardinalityEstimator::new(12).unwrap();
        for i in 0..n {
            e.add(format!("item{}", i));
        }
        let err = (e.count() - n as f64).abs() / n as f64;
        assert!(err < max_err, "n = {}, estimate = {:.1}, err = {:.4}", n, e.count(), err);
    }

    #[test_case(3; "below range")]
    #[test_case(19; "above range")]
    #[test_case(0; "zero")]
    #[test_case(u8::MAX; "max")]
    fn test_invalid_precision(p: u8) {
        let err = CardinalityEstimator::new(p).unwrap_err();
        assert!(matches!(err, SketchError::InvalidParameter { name: "precision", .. }));
    }

    #[test]
    fn test_fresh_estimators_count_zero() {
        for p in MIN_PRECISION..=MAX_PRECISION {
            let e = CardinalityEstimator::new(p).unwrap();
            assert_eq!(e.count(), 0.0, "p = {}", p);
            assert!(e.is_empty());
            assert_eq!(e.num_registers(), 1 << p);
        }
    }

    #[test_case(16 => 0.673)]
    #[test_case(32 => 0.697)]
    #[test_case(64 => 0.709)]
    fn test_alpha_literals(m: usize) -> f64 {
        alpha(m)
    }

    #[test]
    fn test_alpha_formula() {
        let expected = 0.7213 / (1.0 + 1.079 / 16384.0);
        assert_eq!(alpha(16384), expected);
    }

    #[test]
    fn test_insert() {
        let mut e = CardinalityEstimator::new(12).unwrap();
        assert_eq!(e.count(), 0.0);

        e.add("test item 1");
        let one = e.count();
        assert!((one - 1.0).abs() < 0.01, "estimate = {}", one);

        // Re-inserting the same item must not change anything.
        let registers = e.registers().to_vec();
        for _ in 0..100 {
            e.add("test item 1");
        }
        assert_eq!(e.count(), one);
        assert_eq!(e.registers(), &registers[..]);

        for i in 2..=10 {
            e.add(format!("test item {}", i));
        }
        assert!(e.count() > one);
    }

    // Hash layout: top `p` bits select the register, the rest give the rank.
    #[test_case(4, 0x0000_0000_0000_0000 => (0, 61); "all zero")]
    #[test_case(4, 0xf000_0000_0000_0000 => (15, 61); "index only")]
    #[test_case(4, 0x1800_0000_0000_0000 => (1, 1); "first window bit set")]
    #[test_case(4, 0x2400_0000_0000_0000 => (2, 2); "second window bit set")]
    #[test_case(4, 0x3000_0000_0000_0001 => (3, 60); "last window bit set")]
    #[test_case(18, 0xffff_c000_0000_0000 => (262_143, 47); "max precision empty window")]
    #[test_case(18, 0x0000_2000_0000_0000 => (0, 1); "max precision first bit")]
    fn test_decode_hash(p: u8, hash: u64) -> (usize, u8) {
        CardinalityEstimator::new(p).unwrap().decode_hash(hash)
    }

    #[test]
    fn test_registers_monotonic() {
        let mut e = CardinalityEstimator::new(4).unwrap();
        e.add_hash(0x1000_0000_0000_0001);
        assert_eq!(e.registers()[1], 60);
        e.add_hash(0x1800_0000_0000_0000);
        assert_eq!(e.registers()[1], 60);
        e.add_hash(0x1000_0000_0000_0000);
        assert_eq!(e.registers()[1], 61);
    }

    #[test]
    fn test_incremental_sum_matches_scan() {
        let mut e = CardinalityEstimator::new(8).unwrap();
        for i in 0..5_000 {
            e.add(format!("10.0.{}.{}", i / 256, i % 256));
        }
        let zeros = e.registers().iter().filter(|&&r| r == 0).count();
        let sum: f64 = e.registers().iter().map(|&r| inverse_pow2(r)).sum();
        assert_eq!(e.zeros, zeros);
        assert!((e.sum - sum).abs() < 1e-9);
    }

    #[test]
    fn test_linear_counting_branch() {
        let mut e = CardinalityEstimator::new(4).unwrap();
        // Ranks of 1 in 4 registers: raw = 0.673 * 256 / (12 + 4 * 0.5) < 2.5 * 16.
        for idx in 0..4u64 {
            e.add_hash((idx << 60) | (1 << 59));
        }
        let expected = 16.0 * (16.0f64 / 12.0).ln();
        assert_eq!(e.count(), expected);
    }

    #[test]
    fn test_raw_branch_without_zero_registers() {
        let mut e = CardinalityEstimator::new(4).unwrap();
        for idx in 0..16u64 {
            e.add_hash((idx << 60) | (1 << 59));
        }
        // Every register holds rank 1: indicator = 16 * 0.5 = 8.
        assert_eq!(e.count(), 0.673 * 256.0 / 8.0);
    }

    #[test]
    fn test_default_precision() {
        let e = CardinalityEstimator::default();
        assert_eq!(e, CardinalityEstimator::new(DEFAULT_PRECISION).unwrap());
        assert_eq!(e.count(), 0.0);
    }

    #[test]
    fn test_standard_error() {
        let e = CardinalityEstimator::new(14).unwrap();
        assert!((e.standard_error() - 0.008125).abs() < 1e-9);
    }
}
