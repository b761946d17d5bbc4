//! Membership filters used to suppress repeated regexes.
//!
//! The pipeline only needs `contains` and `add`, so any structure with no
//! false negatives can stand in. [`ScalableBloomFilter`] is the default: it
//! starts at a capacity hint and chains larger segments as each one fills.

use std::hash::Hasher;

use rustc_hash::{FxHashSet, FxHasher};
use serde::{Deserialize, Serialize};

/// Set semantics over strings with possible false positives and no false
/// negatives.
pub trait MembershipFilter {
    fn contains(&self, key: &str) -> bool;

    /// Insert `key`. Returns true if it was (probably) present already.
    fn add(&mut self, key: &str) -> bool;

    /// Number of distinct keys inserted.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

const SALT_PRIMARY: u64 = 0x9e37_79b9_7f4a_7c15;
const SALT_SECONDARY: u64 = 0xc2b2_ae3d_27d4_eb4f;

/// Segment growth factor of [`ScalableBloomFilter`].
const SCALE: usize = 2;
/// Error-rate tightening per segment of [`ScalableBloomFilter`].
const TIGHTENING_RATIO: f64 = 0.9;

fn salted_hash(key: &str, salt: u64) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write_u64(salt);
    hasher.write(key.as_bytes());
    avalanche(hasher.finish())
}

/// Murmur3 finalizer; spreads the weak low bits of the Fx output.
fn avalanche(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^ (h >> 33)
}

/// Fixed-capacity Bloom filter with one bit slice per hash function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloomFilter {
    capacity: usize,
    error_rate: f64,
    slices: usize,
    bits_per_slice: usize,
    count: usize,
    bits: Vec<u64>,
}

impl BloomFilter {
    /// Sized so that `capacity` insertions keep the false-positive rate
    /// at or below `error_rate`.
    pub fn new(capacity: usize, error_rate: f64) -> Self {
        let capacity = capacity.max(1);
        let slices = ((1.0 / error_rate).log2().ceil() as usize).max(1);
        let ln2_squared = std::f64::consts::LN_2 * std::f64::consts::LN_2;
        let bits_per_slice =
            (capacity as f64 * error_rate.ln().abs()) / (slices as f64 * ln2_squared);
        let bits_per_slice = bits_per_slice.ceil() as usize;
        let bits_per_slice = bits_per_slice.max(1);
        let words = (slices * bits_per_slice).div_ceil(64);
        Self { capacity, error_rate, slices, bits_per_slice, count: 0, bits: vec![0; words] }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    pub fn is_full(&self) -> bool {
        self.count >= self.capacity
    }

    fn bit_indexes(&self, key: &str) -> impl Iterator<Item = usize> + use<> {
        let h1 = salted_hash(key, SALT_PRIMARY);
        // odd step so consecutive probes never collapse onto one bit
        let h2 = salted_hash(key, SALT_SECONDARY) | 1;
        let per_slice = self.bits_per_slice as u64;
        (0..self.slices).map(move |i| {
            let probe = h1.wrapping_add((i as u64).wrapping_mul(h2)) % per_slice;
            i * per_slice as usize + probe as usize
        })
    }

    fn get(&self, index: usize) -> bool {
        self.bits[index / 64] & (1 << (index % 64)) != 0
    }
}

impl MembershipFilter for BloomFilter {
    fn contains(&self, key: &str) -> bool {
        self.bit_indexes(key).all(|index| self.get(index))
    }

    fn add(&mut self, key: &str) -> bool {
        let mut present = true;
        for index in self.bit_indexes(key) {
            let mask = 1 << (index % 64);
            let word = &mut self.bits[index / 64];
            if *word & mask == 0 {
                present = false;
                *word |= mask;
            }
        }
        if !present {
            self.count += 1;
        }
        present
    }

    fn len(&self) -> usize {
        self.count
    }
}

/// Bloom filter that grows by chaining segments, each twice as large and
/// with a tighter error rate than the last, so the compound false-positive
/// rate stays near the target however many keys arrive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalableBloomFilter {
    initial_capacity: usize,
    error_rate: f64,
    segments: Vec<BloomFilter>,
}

impl ScalableBloomFilter {
    pub fn new(initial_capacity: usize, error_rate: f64) -> Self {
        Self { initial_capacity: initial_capacity.max(1), error_rate, segments: Vec::new() }
    }

    pub fn segments(&self) -> &[BloomFilter] {
        &self.segments
    }

    /// Total capacity across segments.
    pub fn capacity(&self) -> usize {
        self.segments.iter().map(BloomFilter::capacity).sum()
    }

    fn writable_segment(&mut self) -> &mut BloomFilter {
        let next = match self.segments.last() {
            None => {
                let error_rate = self.error_rate * (1.0 - TIGHTENING_RATIO);
                Some(BloomFilter::new(self.initial_capacity, error_rate))
            }
            Some(last) if last.is_full() => {
                let error_rate = last.error_rate() * TIGHTENING_RATIO;
                Some(BloomFilter::new(last.capacity() * SCALE, error_rate))
            }
            Some(_) => None,
        };
        if let Some(segment) = next {
            tracing::debug!(
                capacity = segment.capacity(),
                error_rate = segment.error_rate(),
                segments = self.segments.len() + 1,
                "dedup filter grew a segment"
            );
            self.segments.push(segment);
        }
        let last = self.segments.len() - 1;
        &mut self.segments[last]
    }
}

impl MembershipFilter for ScalableBloomFilter {
    fn contains(&self, key: &str) -> bool {
        self.segments.iter().rev().any(|segment| segment.contains(key))
    }

    fn add(&mut self, key: &str) -> bool {
        if self.contains(key) {
            return true;
        }
        self.writable_segment().add(key);
        false
    }

    fn len(&self) -> usize {
        self.segments.iter().map(BloomFilter::len).sum()
    }
}

/// Exact set; no false positives, memory linear in the keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExactFilter {
    keys: FxHashSet<String>,
}

impl ExactFilter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MembershipFilter for ExactFilter {
    fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    fn add(&mut self, key: &str) -> bool {
        !self.keys.insert(key.to_string())
    }

    fn len(&self) -> usize {
        self.keys.len()
    }
}
