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

use std::{sync::Arc, time::Duration};

use brazier_common::{
    byte_view::ByteView,
    hash, spawn,
    telemetry::{self, METRICS},
};
use parking_lot::Mutex;

use crate::{detector::HotKeyDetector, lru::LruShard};

/// Number of shards. A power of two keeps the index derivation cheap and
/// per-shard collisions low across cores.
pub const SHARD_COUNT: usize = 256;

/// The per-node cache: [`SHARD_COUNT`] independently locked LRU shards
/// fronted by the hot-key detector's lock-free entry map.
///
/// The total byte budget is split evenly across shards; the remainder of the
/// integer division is discarded. Budgets below the shard count therefore
/// leave every shard unbounded.
pub struct ShardedCache {
    shards: Vec<Mutex<LruShard>>,
    detector: Arc<HotKeyDetector>,
    capacity: usize,
}

impl ShardedCache {
    /// Create a cache with `capacity` bytes split across the shards.
    pub fn new(capacity: usize, hot_threshold: u64, decay_interval: Duration) -> Self {
        let per_shard = capacity / SHARD_COUNT;
        Self {
            shards: (0..SHARD_COUNT)
                .map(|_| Mutex::new(LruShard::new(per_shard)))
                .collect(),
            detector: HotKeyDetector::new(hot_threshold, decay_interval),
            capacity,
        }
    }

    #[inline]
    fn shard(&self, key: &str) -> &Mutex<LruShard> {
        &self.shards[hash::fnv1_32(key.as_bytes()) as usize % SHARD_COUNT]
    }

    /// Insert `key` into its shard and record the sighting.
    pub fn insert(&self, key: &str, value: ByteView) {
        self.shard(key).lock().insert(key, value.clone());
        // The detector is internally synchronized; record outside the shard
        // lock.
        self.detector.record(key, value);
    }

    /// Look up `key`: hot-entry map first (no shard lock), then the shard.
    ///
    /// A shard hit records the sighting on a detached task; the caller never
    /// waits on detector work.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        if let Some(value) = self.detector.get_hot(key) {
            telemetry::count(&METRICS.hit_hot);
            return Some(value);
        }

        let value = self.shard(key).lock().get(key);
        match value {
            Some(value) => {
                telemetry::count(&METRICS.hit_local);
                let detector = self.detector.clone();
                let key = key.to_owned();
                let recorded = value.clone();
                spawn::spawn_or_inline(move || detector.record(&key, recorded));
                Some(value)
            }
            None => {
                telemetry::count(&METRICS.miss);
                None
            }
        }
    }

    /// Remove `key` from its shard and from the hot-entry map.
    pub fn remove(&self, key: &str) {
        self.shard(key).lock().remove(key);
        self.detector.forget(key);
    }

    /// The hot-key detector backing this cache.
    pub fn detector(&self) -> &HotKeyDetector {
        &self.detector
    }

    /// Total configured byte budget.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes charged across all shards.
    pub fn bytes(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().bytes()).sum()
    }

    /// Resident entries across all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    /// `true` if no entry is resident.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for ShardedCache {
    fn drop(&mut self) {
        self.detector.stop();
    }
}

impl std::fmt::Debug for ShardedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedCache")
            .field("shards", &SHARD_COUNT)
            .field("capacity", &self.capacity)
            .finish()
    }
}
