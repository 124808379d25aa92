// Copyright 2026 brazier Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::atomic::{AtomicU64, Ordering};

use brazier_common::hash::DoubleHash;

/// A fixed-size bloom filter with `k` double-hashing probes per key.
///
/// False positives are possible; false negatives are not. Bits are set with
/// release ordering and read with acquire ordering: once an [`add`] returns,
/// every later [`test`] for the same key observes all of its bits.
///
/// [`add`]: BloomFilter::add
/// [`test`]: BloomFilter::test
pub struct BloomFilter {
    words: Vec<AtomicU64>,
    bits: usize,
    probes: u32,
}

impl BloomFilter {
    /// Create a filter over `bits` bits probed `probes` times per key.
    pub fn new(bits: usize, probes: u32) -> Self {
        assert!(bits > 0, "filter requires a non-empty bit array");
        assert!(probes > 0, "filter requires at least one probe");
        Self {
            words: (0..bits.div_ceil(64)).map(|_| AtomicU64::new(0)).collect(),
            bits,
            probes,
        }
    }

    /// Mark `key` as seen.
    pub fn add(&self, key: &str) {
        let hash = DoubleHash::new(key.as_bytes());
        for i in 0..self.probes {
            let bit = hash.probe(i) as usize % self.bits;
            self.words[bit / 64].fetch_or(1 << (bit % 64), Ordering::Release);
        }
    }

    /// `true` if `key` may have been seen, `false` if it definitely has not.
    pub fn test(&self, key: &str) -> bool {
        let hash = DoubleHash::new(key.as_bytes());
        (0..self.probes).all(|i| {
            let bit = hash.probe(i) as usize % self.bits;
            self.words[bit / 64].load(Ordering::Acquire) & (1 << (bit % 64)) != 0
        })
    }
}

impl std::fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BloomFilter")
            .field("bits", &self.bits)
            .field("probes", &self.probes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_add_then_test() {
        let filter = BloomFilter::new(1 << 10, 5);
        assert!(!filter.test("a"));
        filter.add("a");
        assert!(filter.test("a"));
        assert!(!filter.test("b"));
    }

    #[test]
    fn test_no_false_negatives() {
        let filter = BloomFilter::new(1 << 16, 5);
        for i in 0..1000 {
            filter.add(&format!("key-{i}"));
        }
        for i in 0..1000 {
            assert!(filter.test(&format!("key-{i}")));
        }
    }

    #[test]
    fn test_false_positive_ratio() {
        const THRESHOLD: f64 = 0.02;
        let filter = BloomFilter::new(1_000_000, 5);
        for i in 0..10_000 {
            filter.add(&format!("present-{i}"));
        }
        let false_positives = (0..10_000)
            .filter(|i| filter.test(&format!("absent-{i}")))
            .count();
        let ratio = false_positives as f64 / 10_000.0;
        assert!(ratio < THRESHOLD, "false positive ratio {ratio} > threshold {THRESHOLD}");
    }

    #[test]
    fn test_concurrent_add_test() {
        let filter = Arc::new(BloomFilter::new(1 << 20, 5));
        let handles = (0..8)
            .map(|t| {
                let filter = filter.clone();
                std::thread::spawn(move || {
                    for i in 0..1000 {
                        let key = format!("key-{t}-{i}");
                        filter.add(&key);
                        assert!(filter.test(&key));
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
