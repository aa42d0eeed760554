//! Bloom filter answering "possibly present" or "definitely absent".
//!
//! # Enhanced double hashing
//!
//! Every item is reduced to a single 128-bit digest `h0`. Its two halves give
//! the seeds `a` and `b`, and slot `i` additionally gets a salt `c_i`, the
//! hash of `h0` concatenated with `i`:
//!
//! index<sub>i</sub> = (a + i·b + c<sub>i</sub>) mod size
//!
//! The per-slot salt breaks the arithmetic progression of plain double
//! hashing, so two items sharing `a` and `b` modulo `size` still spread over
//! different slots.
//!
//! Bits are only ever set. There is no removal, and an item that was added
//! always tests positive.

use std::fmt::{Debug, Formatter};
use std::mem::{size_of, size_of_val};

use crate::error::{Result, SketchError};
use crate::hash::{digest128, salted, split_digest};

/// Fixed-size Bloom filter with `k` derived hash positions per item.
#[derive(Clone, PartialEq, Eq)]
pub struct MembershipFilter {
    /// Number of addressable bits
    size: usize,
    /// Number of positions derived per item
    num_hashes: u32,
    /// Bit vector, bit `i` lives in `words[i / 64]`
    words: Box<[u64]>,
}

impl MembershipFilter {
    /// Create new filter with `size` bits and `num_hashes` positions per item
    pub fn new(size: usize, num_hashes: u32) -> Result<Self> {
        if size == 0 {
            return Err(SketchError::invalid("size", "must be greater than 0"));
        }
        if num_hashes == 0 {
            return Err(SketchError::invalid("num_hashes", "must be greater than 0"));
        }

        tracing::debug!(size, num_hashes, "creating membership filter");

        Ok(Self {
            size,
            num_hashes,
            words: vec![0u64; size.div_ceil(64)].into_boxed_slice(),
        })
    }

    /// Create filter sized for `expected_items` with target false positive `rate`.
    ///
    /// Uses the optimal bit count `-n ln(rate) / ln(2)^2` and hash count
    /// `size / n * ln(2)`.
    pub fn with_false_positive_rate(expected_items: usize, rate: f64) -> Result<Self> {
        if expected_items == 0 {
            return Err(SketchError::invalid(
                "expected_items",
                "must be greater than 0",
            ));
        }
        if !(rate > 0.0 && rate < 1.0) {
            return Err(SketchError::invalid(
                "rate",
                format!("{} is outside (0, 1)", rate),
            ));
        }

        let n = expected_items as f64;
        let ln2 = std::f64::consts::LN_2;
        let size = (-n * rate.ln() / (ln2 * ln2)).ceil().max(1.0) as usize;
        let num_hashes = ((size as f64 / n) * ln2).round().max(1.0) as u32;
        Self::new(size, num_hashes)
    }

    /// Return bit positions of `item`, one per hash
    #[inline]
    pub fn positions(&self, item: impl AsRef<[u8]>) -> impl Iterator<Item = usize> {
        let digest = digest128(item.as_ref());
        let (a, b) = split_digest(&digest);
        let size = self.size as u128;
        (0..self.num_hashes).map(move |i| {
            let c = salted(&digest, i);
            let idx = (u128::from(a) + u128::from(i) * u128::from(b) + u128::from(c)) % size;
            idx as usize
        })
    }

    /// Insert an item into `MembershipFilter`.
    ///
    /// Returns `true` if any bit changed, i.e. the item was definitely not
    /// present before.
    #[inline]
    pub fn add(&mut self, item: impl AsRef<[u8]>) -> bool {
        let mut changed = false;
        for idx in self.positions(item) {
            changed |= self.set_bit(idx);
        }
        changed
    }

    /// Return whether `item` is possibly present
    #[inline]
    pub fn contains(&self, item: impl AsRef<[u8]>) -> bool {
        self.positions(item).all(|idx| self.get_bit(idx))
    }

    /// Return number of bits
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Return number of positions derived per item
    #[inline]
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Return number of set bits
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Return whether no bit is set
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Return probability that an item never added tests positive
    /// given the bits set so far, `(ones / size)^k`.
    pub fn estimate_false_positive_rate(&self) -> f64 {
        let fill = self.count_ones() as f64 / self.size as f64;
        fill.powf(f64::from(self.num_hashes))
    }

    /// Return expected false positive rate after `n` distinct insertions,
    /// `(1 - e^(-k n / size))^k`.
    pub fn theoretical_false_positive_rate(&self, n: usize) -> f64 {
        let k = f64::from(self.num_hashes);
        (1.0 - (-k * n as f64 / self.size as f64).exp()).powf(k)
    }

    /// Return approximate number of distinct items added,
    /// `-(size / k) ln(1 - ones / size)`.
    ///
    /// Infinite once every bit is set.
    pub fn approximate_len(&self) -> f64 {
        let m = self.size as f64;
        let k = f64::from(self.num_hashes);
        let ones = self.count_ones() as f64;
        -(m / k) * (1.0 - ones / m).ln()
    }

    /// Return memory size of `MembershipFilter`
    pub fn size_of(&self) -> usize {
        size_of::<Self>() + size_of_val(&*self.words)
    }

    /// Set bit `idx`, returning whether it was clear
    #[inline]
    fn set_bit(&mut self, idx: usize) -> bool {
        let mask = 1u64 << (idx % 64);
        let word = &mut self.words[idx / 64];
        let was_clear = *word & mask == 0;
        *word |= mask;
        was_clear
    }

    #[inline]
    fn get_bit(&self, idx: usize) -> bool {
        self.words[idx / 64] & (1u64 << (idx % 64)) != 0
    }
}

impl Debug for MembershipFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ size: {}, num_hashes: {}, ones: {} }}",
            self.size,
            self.num_hashes,
            self.count_ones()
        )
    }
}
