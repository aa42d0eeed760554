#![no_main]

use approx_sketch::{CardinalityEstimator, MembershipFilter};
use libfuzzer_sys::fuzz_target;
use wyhash::wyhash;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Derive sketch parameters from the input itself.
    let seed = wyhash(data, 0);
    let precision = 4 + (seed % 15) as u8;
    let size = 1 + (seed >> 8) as usize % 4096;
    let num_hashes = 1 + (seed >> 24) as u32 % 16;

    let mut estimator = CardinalityEstimator::new(precision).unwrap();
    let mut filter = MembershipFilter::new(size, num_hashes).unwrap();

    for chunk in data.chunks(4) {
        estimator.add(chunk);
        filter.add(chunk);
        assert!(estimator.count() > 0.0);
        assert!(filter.contains(chunk));
        assert!(filter.positions(chunk).all(|idx| idx < size));
    }

    let max_rank = 64 - precision + 1;
    assert!(estimator.registers().iter().all(|&r| r <= max_rank));
});
