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

use hashbrown::HashSet;

/// The ring hash function.
pub type RingHash = fn(&[u8]) -> u32;

/// Default virtual nodes per peer.
pub const DEFAULT_VNODES: usize = 50;

fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// A consistent-hash ring over peer identifiers with virtual nodes.
///
/// Each peer is hashed onto the ring at `vnodes` positions
/// (`hash("{i}{peer}")`); a key maps to the peer owning the first ring
/// position at or after the key's hash, wrapping at the top. Lookups only
/// ever return peers passed to [`HashRing::add`], and repeated construction
/// with the same peers in the same order yields identical placement.
///
/// The ring is not internally synchronized; membership changes must not
/// race lookups.
pub struct HashRing {
    vnodes: usize,
    hash: RingHash,
    ring: Vec<(u32, String)>,
    peers: HashSet<String>,
}

impl HashRing {
    /// Create a ring hashing with CRC32 (IEEE).
    pub fn new(vnodes: usize) -> Self {
        Self::with_hasher(vnodes, crc32)
    }

    /// Create a ring with a caller-provided hash function.
    pub fn with_hasher(vnodes: usize, hash: RingHash) -> Self {
        assert!(vnodes > 0, "ring requires at least one virtual node per peer");
        Self {
            vnodes,
            hash,
            ring: Vec::new(),
            peers: HashSet::new(),
        }
    }

    /// Add peers, placing `vnodes` virtual nodes each.
    pub fn add<S>(&mut self, peers: impl IntoIterator<Item = S>)
    where
        S: Into<String>,
    {
        for peer in peers {
            let peer = peer.into();
            for i in 0..self.vnodes {
                let hash = (self.hash)(format!("{i}{peer}").as_bytes());
                self.ring.push((hash, peer.clone()));
            }
            self.peers.insert(peer);
        }
        self.ring
            .sort_unstable_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    }

    /// The peer owning `key`, or `None` on an empty ring.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.ring.is_empty() {
            return None;
        }
        let hash = (self.hash)(key.as_bytes());
        let idx = self.ring.partition_point(|(h, _)| *h < hash);
        Some(self.ring[idx % self.ring.len()].1.as_str())
    }

    /// The first `n` distinct peers clockwise from `key`'s position,
    /// starting with the owner. `n` is capped at the number of peers.
    pub fn get_n(&self, key: &str, n: usize) -> Vec<&str> {
        if self.ring.is_empty() || n == 0 {
            return Vec::new();
        }
        let n = n.min(self.peers.len());
        let hash = (self.hash)(key.as_bytes());
        let start = self.ring.partition_point(|(h, _)| *h < hash);

        let mut picked = Vec::with_capacity(n);
        let mut seen = HashSet::with_capacity(n);
        for i in 0..self.ring.len() {
            if picked.len() == n {
                break;
            }
            let peer = self.ring[(start + i) % self.ring.len()].1.as_str();
            if seen.insert(peer) {
                picked.push(peer);
            }
        }
        picked
    }

    /// Number of distinct peers on the ring.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// `true` if no peer has been added.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl std::fmt::Debug for HashRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashRing")
            .field("vnodes", &self.vnodes)
            .field("peers", &self.peers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use hashbrown::HashMap;
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_empty_ring() {
        let ring = HashRing::new(DEFAULT_VNODES);
        assert!(ring.is_empty());
        assert_eq!(ring.get("k"), None);
        assert!(ring.get_n("k", 3).is_empty());
    }

    #[test]
    fn test_lookups_return_added_peers() {
        let mut ring = HashRing::new(DEFAULT_VNODES);
        ring.add(["A", "B", "C"]);
        assert_eq!(ring.len(), 3);
        for i in 0..1000 {
            let peer = ring.get(&format!("key-{i}")).unwrap();
            assert!(["A", "B", "C"].contains(&peer));
        }
    }

    #[test]
    fn test_placement_is_stable() {
        let build = || {
            let mut ring = HashRing::new(DEFAULT_VNODES);
            ring.add(["A", "B", "C"]);
            ring
        };
        let (a, b) = (build(), build());
        for i in 0..1000 {
            let key = format!("key-{i}");
            assert_eq!(a.get(&key), b.get(&key));
            assert_eq!(a.get_n(&key, 3), b.get_n(&key, 3));
        }
    }

    #[test]
    fn test_explicit_placement_with_identity_hash() {
        // Map "{i}{peer}" strings onto small, predictable ring positions.
        fn tiny(data: &[u8]) -> u32 {
            match data {
                b"0p2" => 2,
                b"0p4" => 4,
                b"0p6" => 6,
                _ => unreachable!("unexpected vnode key"),
            }
        }
        fn key_hash(data: &[u8]) -> u32 {
            std::str::from_utf8(data).unwrap().parse().unwrap()
        }
        // Single hash for both vnode keys and lookups.
        fn hash(data: &[u8]) -> u32 {
            if data.len() == 3 {
                tiny(data)
            } else {
                key_hash(data)
            }
        }

        let mut ring = HashRing::with_hasher(1, hash);
        ring.add(["p2", "p4", "p6"]);

        assert_eq!(ring.get("1"), Some("p2"));
        assert_eq!(ring.get("2"), Some("p2"));
        assert_eq!(ring.get("3"), Some("p4"));
        assert_eq!(ring.get("5"), Some("p6"));
        // Past the last vnode the ring wraps to the first.
        assert_eq!(ring.get("7"), Some("p2"));
    }

    #[test]
    fn test_get_n_distinct_coverage() {
        let mut ring = HashRing::new(DEFAULT_VNODES);
        ring.add(["A", "B", "C", "D"]);
        for i in 0..200 {
            let key = format!("key-{i}");
            for n in 1..=4 {
                let picked = ring.get_n(&key, n);
                assert_eq!(picked.len(), n);
                assert_eq!(picked.iter().unique().count(), n);
            }
            // The walk starts at the owner.
            assert_eq!(ring.get_n(&key, 3)[0], ring.get(&key).unwrap());
        }
    }

    #[test]
    fn test_get_n_caps_at_peer_count() {
        let mut ring = HashRing::new(DEFAULT_VNODES);
        ring.add(["A", "B"]);
        let picked = ring.get_n("k", 5);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked.iter().unique().count(), 2);
    }

    #[test]
    fn test_distribution_is_roughly_uniform() {
        let mut ring = HashRing::new(DEFAULT_VNODES);
        ring.add(["A", "B", "C"]);

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for i in 0..10_000 {
            *counts.entry(ring.get(&format!("k{i}")).unwrap()).or_default() += 1;
        }
        for peer in ["A", "B", "C"] {
            let count = counts[peer];
            assert!(
                (2_500..=4_000).contains(&count),
                "peer {peer} owns {count} of 10000 keys"
            );
        }
    }
}
