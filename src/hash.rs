//! Fingerprinting of raw bytes.
//!
//! Every value is derived from `wyhash` with its own fixed seed, so the
//! derived words are independent of each other and stable across runs.

use wyhash::wyhash;

/// Seed of the 64-bit fingerprint used by the cardinality estimator.
const FINGERPRINT_SEED: u64 = 0x9e37_79b9_7f4a_7c15;
/// Seeds of the two halves of the 128-bit digest.
const DIGEST_SEEDS: [u64; 2] = [0x517c_c1b7_2722_0a95, 0x6d0f_27bd_ceb7_b067];
/// Seed used when salting a digest with a slot number.
const SALT_SEED: u64 = 0xff51_afd7_ed55_8ccd;

/// Width in bytes of [`digest128`] output.
pub const DIGEST_LEN: usize = 16;

/// Return the 64-bit fingerprint of `bytes`.
#[inline]
pub fn fingerprint(bytes: &[u8]) -> u64 {
    wyhash(bytes, FINGERPRINT_SEED)
}

/// Return a 128-bit digest of `bytes`.
///
/// The two big-endian 8-byte halves are produced by independently seeded
/// hashes and can be used as two unrelated 64-bit values.
#[inline]
pub fn digest128(bytes: &[u8]) -> [u8; DIGEST_LEN] {
    let mut digest = [0u8; DIGEST_LEN];
    digest[..8].copy_from_slice(&wyhash(bytes, DIGEST_SEEDS[0]).to_be_bytes());
    digest[8..].copy_from_slice(&wyhash(bytes, DIGEST_SEEDS[1]).to_be_bytes());
    digest
}

/// Split a digest into its two 64-bit halves.
#[inline]
pub fn split_digest(digest: &[u8; DIGEST_LEN]) -> (u64, u64) {
    let mut hi = [0u8; 8];
    let mut lo = [0u8; 8];
    hi.copy_from_slice(&digest[..8]);
    lo.copy_from_slice(&digest[8..]);
    (u64::from_be_bytes(hi), u64::from_be_bytes(lo))
}

/// Hash `digest || salt` into a new 64-bit value.
///
/// The concatenation is built on the stack, so salting never allocates.
#[inline]
pub fn salted(digest: &[u8; DIGEST_LEN], salt: u32) -> u64 {
    let mut buf = [0u8; DIGEST_LEN + 4];
    buf[..DIGEST_LEN].copy_from_slice(digest);
    buf[DIGEST_LEN..].copy_from_slice(&salt.to_be_bytes());
    wyhash(&buf, SALT_SEED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(""; "empty input")]
    #[test_case("password123"; "ascii input")]
    #[test_case("пароль"; "multibyte input")]
    fn test_deterministic(input: &str) {
        assert_eq!(fingerprint(input.as_bytes()), fingerprint(input.as_bytes()));
        assert_eq!(digest128(input.as_bytes()), digest128(input.as_bytes()));
    }

    #[test]
    fn test_digest_halves_differ() {
        let (a, b) = split_digest(&digest128(b"192.168.0.1"));
        assert_ne!(a, b);
        assert_ne!(a, fingerprint(b"192.168.0.1"));
    }

    #[test]
    fn test_salt_changes_value() {
        let digest = digest128(b"admin123");
        let salts: Vec<u64> = (0..8).map(|i| salted(&digest, i)).collect();
        for (i, x) in salts.iter().enumerate() {
            for y in &salts[i + 1..] {
                assert_ne!(x, y);
            }
        }
    }

    #[test]
    fn test_bit_balance() {
        // Every bit of the fingerprint should be set roughly half of the time.
        let n = 10_000u32;
        let mut ones = [0u32; 64];
        for i in 0..n {
            let h = fingerprint(format!("item{}", i).as_bytes());
            for (bit, count) in ones.iter_mut().enumerate() {
                *count += u32::from((h >> bit) & 1 == 1);
            }
        }
        for (bit, &count) in ones.iter().enumerate() {
            let ratio = f64::from(count) / f64::from(n);
            assert!((0.45..0.55).contains(&ratio), "bit {} set ratio {:.3}", bit, ratio);
        }
    }
}
