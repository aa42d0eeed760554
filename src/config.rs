//! Construction parameters for the sketches.

#[cfg(feature = "with_serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::estimator::CardinalityEstimator;
use crate::filter::MembershipFilter;

/// Default estimator precision, `2^14` registers and ~0.81% error
pub const DEFAULT_PRECISION: u8 = 14;
/// Default filter size in bits
pub const DEFAULT_FILTER_SIZE: usize = 1000;
/// Default number of hash positions per filter item
pub const DEFAULT_NUM_HASHES: u32 = 3;

/// Parameters used to build a [`CardinalityEstimator`] and a [`MembershipFilter`].
///
/// Nothing is validated until a sketch is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with_serde", serde(default))]
pub struct SketchConfig {
    pub precision: u8,
    pub filter_size: usize,
    pub num_hashes: u32,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            filter_size: DEFAULT_FILTER_SIZE,
            num_hashes: DEFAULT_NUM_HASHES,
        }
    }
}

impl SketchConfig {
    pub fn with_precision(mut self, precision: u8) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_filter_size(mut self, filter_size: usize) -> Self {
        self.filter_size = filter_size;
        self
    }

    pub fn with_num_hashes(mut self, num_hashes: u32) -> Self {
        self.num_hashes = num_hashes;
        self
    }

    /// Build an empty estimator
    pub fn estimator(&self) -> Result<CardinalityEstimator> {
        CardinalityEstimator::new(self.precision)
    }

    /// Build an empty filter
    pub fn filter(&self) -> Result<MembershipFilter> {
        MembershipFilter::new(self.filter_size, self.num_hashes)
    }
}
