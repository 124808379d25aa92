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

//! The per-node in-memory cache engine for brazier.
//!
//! A fixed array of independently locked LRU shards holds the resident
//! entries; a two-stage frequency detector (admission filter + count-min
//! sketch) promotes hot keys into a lock-free side table that serves reads
//! without touching any shard lock.

/// The sharded bounded cache.
pub mod cache;
/// The two-stage hot-key detector.
pub mod detector;
/// The admission filter suppressing single-hit keys.
pub mod filter;
/// The bounded LRU shard.
pub mod lru;
/// The count-min frequency sketch.
pub mod sketch;

pub use cache::{ShardedCache, SHARD_COUNT};
pub use detector::{HotKeyDetector, DEFAULT_DECAY_INTERVAL, DEFAULT_HOT_THRESHOLD};
pub use filter::BloomFilter;
pub use lru::LruShard;
pub use sketch::CountMinSketch;
