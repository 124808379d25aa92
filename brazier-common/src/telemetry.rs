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

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    LazyLock,
};

static METRICS_ENABLED: AtomicBool = AtomicBool::new(false);
static LOGGING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable counter collection. Off by default.
pub fn enable_metrics() {
    METRICS_ENABLED.store(true, Ordering::Relaxed);
}

/// Disable counter collection.
pub fn disable_metrics() {
    METRICS_ENABLED.store(false, Ordering::Relaxed);
}

/// `true` if counter collection is enabled.
pub fn metrics_enabled() -> bool {
    METRICS_ENABLED.load(Ordering::Relaxed)
}

/// Enable hot-path log statements. Off by default.
pub fn enable_logging() {
    LOGGING_ENABLED.store(true, Ordering::Relaxed);
}

/// Disable hot-path log statements.
pub fn disable_logging() {
    LOGGING_ENABLED.store(false, Ordering::Relaxed);
}

/// `true` if hot-path log statements are enabled.
pub fn logging_enabled() -> bool {
    LOGGING_ENABLED.load(Ordering::Relaxed)
}

/// Process-wide counters, shared by every group.
#[derive(Debug, Default)]
pub struct Metrics {
    /// get hits served from the hot-entry map
    pub hit_hot: AtomicU64,
    /// get hits served from a shard
    pub hit_local: AtomicU64,
    /// get misses
    pub miss: AtomicU64,

    /// admission filter tests that passed
    pub filter_hit: AtomicU64,
    /// admission filter tests that seeded the filter
    pub filter_miss: AtomicU64,

    /// keys promoted into the hot-entry map
    pub hot_promote: AtomicU64,
    /// keys demoted by decay
    pub hot_demote: AtomicU64,

    /// loads answered by a peer
    pub load_peer: AtomicU64,
    /// loads answered by the local source
    pub load_source: AtomicU64,

    /// replica propagation calls that failed
    pub replicate_error: AtomicU64,
}

/// The process-wide [`Metrics`] instance.
pub static METRICS: LazyLock<Metrics> = LazyLock::new(Metrics::default);

/// Bump `counter` if counter collection is enabled.
#[inline]
pub fn count(counter: &AtomicU64) {
    if metrics_enabled() {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
