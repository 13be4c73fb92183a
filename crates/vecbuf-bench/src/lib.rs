//! Workload builders shared by the vecbuf benchmarks.
//!
//! - [`filled_bytes`]: a type-erased vector of `n` 16-byte records
//! - [`filled_typed`]: a `TypedVec<u64>` holding `0..n`
//! - [`removal_indices`]: a seeded, always-in-range sequence of removals

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use vecbuf_store::{ByteVec, TypedVec};

/// Element size used by the byte-vector workloads.
pub const RECORD_SIZE: usize = 16;

/// A record whose bytes encode its index.
pub fn record(i: usize) -> [u8; RECORD_SIZE] {
    let mut out = [0u8; RECORD_SIZE];
    out[..8].copy_from_slice(&(i as u64).to_le_bytes());
    out[8..].copy_from_slice(&(!(i as u64)).to_le_bytes());
    out
}

/// Build a [`ByteVec`] holding `n` records, grown by repeated push.
pub fn filled_bytes(n: usize) -> ByteVec {
    let mut v = ByteVec::new(RECORD_SIZE).unwrap();
    for i in 0..n {
        v.push(&record(i)).unwrap();
    }
    v
}

/// Build a [`TypedVec`] holding `0..n`.
pub fn filled_typed(n: usize) -> TypedVec<u64> {
    let mut v = TypedVec::new();
    for i in 0..n as u64 {
        v.push(i).unwrap();
    }
    v
}

/// `n` removal indices for a vector that starts with `n` elements.
///
/// The `k`th index is below `n - k`, so applying them in order always
/// removes an existing element. Same seed, same sequence.
pub fn removal_indices(seed: u64, n: usize) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|k| (rng.next_u64() % (n - k) as u64) as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_bytes_holds_records_in_order() {
        let v = filled_bytes(100);
        assert_eq!(v.len(), 100);
        assert_eq!(v.capacity(), 128);
        assert_eq!(v.at(42), Some(&record(42)[..]));
    }

    #[test]
    fn filled_typed_holds_range() {
        let v = filled_typed(10);
        assert_eq!(v.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn removal_indices_are_deterministic_and_in_range() {
        let a = removal_indices(7, 500);
        assert_eq!(a, removal_indices(7, 500));
        assert_ne!(a, removal_indices(8, 500));

        let mut v = filled_typed(500);
        for &i in &a {
            assert!(v.remove(i).is_some());
        }
        assert!(v.is_empty());
    }
}
