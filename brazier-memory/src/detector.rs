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

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use brazier_common::{
    byte_view::ByteView,
    spawn,
    telemetry::{self, METRICS},
};
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::{sync::oneshot, time::MissedTickBehavior};

use crate::{filter::BloomFilter, sketch::CountMinSketch};

/// Default promotion threshold: a key becomes hot at this estimated count.
pub const DEFAULT_HOT_THRESHOLD: u64 = 10;
/// Default period between sketch decays.
pub const DEFAULT_DECAY_INTERVAL: Duration = Duration::from_secs(5 * 60);

const FILTER_BITS: usize = 1_000_000;
const FILTER_PROBES: u32 = 5;
const SKETCH_EPSILON: f64 = 0.001;
const SKETCH_DELTA: f64 = 0.99;

/// A two-stage hot-key detector with a lock-free store for promoted entries.
///
/// Stage one is an admission filter: the first sighting of a key only seeds
/// the filter, keeping the long tail of single-hit keys out of the sketch.
/// Stage two counts re-sightings in a count-min sketch and promotes a key
/// into the hot-entry map once its estimate reaches the threshold.
/// [`HotKeyDetector::get_hot`] reads that map without taking any lock.
///
/// A background task decays the sketch every `decay_interval` and demotes
/// hot entries whose estimate dropped below half the threshold. The task
/// ends on [`HotKeyDetector::stop`] or when the detector is dropped.
/// Without a tokio runtime on the constructing thread no task is spawned and
/// counts are never decayed.
pub struct HotKeyDetector {
    filter: BloomFilter,
    sketch: CountMinSketch,
    hot: DashMap<String, ByteView>,
    threshold: u64,
    stop: Mutex<Option<oneshot::Sender<()>>>,
}

impl HotKeyDetector {
    /// Create a detector and spawn its decay task.
    pub fn new(threshold: u64, decay_interval: Duration) -> Arc<Self> {
        let (tx, rx) = oneshot::channel();
        let detector = Arc::new(Self {
            filter: BloomFilter::new(FILTER_BITS, FILTER_PROBES),
            sketch: CountMinSketch::new(SKETCH_EPSILON, SKETCH_DELTA),
            hot: DashMap::new(),
            threshold,
            stop: Mutex::new(Some(tx)),
        });
        spawn::try_spawn(Self::decay_loop(
            Arc::downgrade(&detector),
            decay_interval,
            rx,
        ));
        detector
    }

    /// Record one sighting of `key`.
    ///
    /// The first sighting seeds the admission filter and returns without
    /// touching the sketch. Re-sightings bump the sketch; at the threshold
    /// the entry is stored (or refreshed) in the hot-entry map.
    pub fn record(&self, key: &str, value: ByteView) {
        if !self.filter.test(key) {
            self.filter.add(key);
            telemetry::count(&METRICS.filter_miss);
            return;
        }
        telemetry::count(&METRICS.filter_hit);

        self.sketch.add(key, 1);
        if self.sketch.count(key) >= self.threshold {
            if !self.hot.contains_key(key) {
                telemetry::count(&METRICS.hot_promote);
                tracing::trace!("[detector]: promote {key}");
            }
            self.hot.insert(key.to_owned(), value);
        }
    }

    /// Look `key` up in the hot-entry map. Lock-free.
    pub fn get_hot(&self, key: &str) -> Option<ByteView> {
        self.hot.get(key).map(|entry| entry.value().clone())
    }

    /// Drop `key` from the hot-entry map.
    pub fn forget(&self, key: &str) {
        self.hot.remove(key);
    }

    /// Number of currently promoted entries.
    pub fn hot_len(&self) -> usize {
        self.hot.len()
    }

    /// End the decay task. Idempotent; does not wait for the task to exit.
    pub fn stop(&self) {
        if let Some(tx) = self.stop.lock().take() {
            let _ = tx.send(());
        }
    }

    fn decay_and_demote(&self) {
        self.sketch.decay();
        let floor = self.threshold / 2;
        self.hot.retain(|key, _| {
            let keep = self.sketch.count(key) >= floor;
            if !keep {
                telemetry::count(&METRICS.hot_demote);
                tracing::trace!("[detector]: demote {key}");
            }
            keep
        });
    }

    async fn decay_loop(detector: Weak<Self>, period: Duration, mut stop: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick resolves immediately.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(detector) = detector.upgrade() else { return };
                    detector.decay_and_demote();
                }
                _ = &mut stop => return,
            }
        }
    }
}

impl std::fmt::Debug for HotKeyDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotKeyDetector")
            .field("threshold", &self.threshold)
            .field("hot_len", &self.hot.len())
            .finish()
    }
}
