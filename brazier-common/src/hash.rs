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

const FNV_OFFSET_32: u32 = 0x811c9dc5;
const FNV_PRIME_32: u32 = 0x0100_0193;

/// 32-bit FNV-1 (multiply, then xor).
#[inline]
pub fn fnv1_32(data: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_32;
    for byte in data {
        hash = hash.wrapping_mul(FNV_PRIME_32);
        hash ^= *byte as u32;
    }
    hash
}

/// 32-bit FNV-1a (xor, then multiply).
#[inline]
pub fn fnv1a_32(data: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_32;
    for byte in data {
        hash ^= *byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME_32);
    }
    hash
}

/// A double-hashing probe sequence `probe(i) = h1 + i * h2` built from the two
/// FNV variants.
///
/// `h2` is forced odd so the sequence does not cycle within a power-of-two
/// table. The two base hashes must stay distinct variants; a single hash
/// reused for both collapses the sequence into an arithmetic progression.
#[derive(Debug, Clone, Copy)]
pub struct DoubleHash {
    h1: u32,
    h2: u32,
}

impl DoubleHash {
    /// Derive the probe bases for `data`.
    pub fn new(data: &[u8]) -> Self {
        let h1 = fnv1a_32(data);
        let mut h2 = fnv1_32(data);
        if h2 % 2 == 0 {
            h2 = h2.wrapping_add(1);
        }
        Self { h1, h2 }
    }

    /// The `i`-th probe for this key.
    #[inline]
    pub fn probe(&self, i: u32) -> u32 {
        self.h1.wrapping_add(i.wrapping_mul(self.h2))
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_fnv1_32_vectors() {
        assert_eq!(fnv1_32(b""), 0x811c9dc5);
        assert_eq!(fnv1_32(b"a"), 0x050c5d7e);
        assert_eq!(fnv1_32(b"foobar"), 0x31f0b262);
    }

    #[test]
    fn test_fnv1a_32_vectors() {
        assert_eq!(fnv1a_32(b""), 0x811c9dc5);
        assert_eq!(fnv1a_32(b"a"), 0xe40c292c);
        assert_eq!(fnv1a_32(b"foobar"), 0xbf9cf968);
    }

    #[test]
    fn test_double_hash_second_base_is_odd() {
        for i in 0..1000u32 {
            let hash = DoubleHash::new(format!("key-{i}").as_bytes());
            assert_eq!(hash.h2 % 2, 1);
        }
    }

    #[test]
    fn test_double_hash_probes_spread() {
        const TABLE: u32 = 1 << 20;
        let hash = DoubleHash::new(b"some key");
        let slots = (0..5).map(|i| hash.probe(i) % TABLE).unique().count();
        assert_eq!(slots, 5);
    }

    #[test]
    fn test_double_hash_deterministic() {
        let a = DoubleHash::new(b"k");
        let b = DoubleHash::new(b"k");
        for i in 0..8 {
            assert_eq!(a.probe(i), b.probe(i));
        }
    }
}
