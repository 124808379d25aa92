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

/// A count-min sketch over atomic counters.
///
/// `epsilon` bounds the relative overcount (`width = ⌈e / epsilon⌉`) and
/// `delta` the probability of exceeding it (`depth = ⌈ln(1 / delta)⌉`).
/// [`count`] returns the minimum across rows, which is never below the true
/// number of [`add`]s for a key since the last [`decay`].
///
/// All cell updates are atomic fetch-adds and all reads are atomic loads;
/// there is no sketch-wide lock.
///
/// [`add`]: CountMinSketch::add
/// [`count`]: CountMinSketch::count
/// [`decay`]: CountMinSketch::decay
pub struct CountMinSketch {
    width: usize,
    depth: usize,
    table: Vec<AtomicU64>,
}

impl CountMinSketch {
    /// Size a sketch for the given error tolerance and failure probability.
    pub fn new(epsilon: f64, delta: f64) -> Self {
        assert!(epsilon > 0.0, "epsilon must be positive");
        assert!(delta > 0.0 && delta < 1.0, "delta must be in (0, 1)");
        let width = (std::f64::consts::E / epsilon).ceil() as usize;
        let depth = (1.0 / delta).ln().ceil() as usize;
        Self {
            width,
            depth,
            table: (0..width * depth).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// Add `count` sightings of `key`.
    pub fn add(&self, key: &str, count: u64) {
        let hash = DoubleHash::new(key.as_bytes());
        for row in 0..self.depth {
            let col = hash.probe(row as u32) as usize % self.width;
            self.table[row * self.width + col].fetch_add(count, Ordering::Relaxed);
        }
    }

    /// The minimum estimate for `key` across rows. Never undercounts.
    pub fn count(&self, key: &str) -> u64 {
        let hash = DoubleHash::new(key.as_bytes());
        (0..self.depth)
            .map(|row| {
                let col = hash.probe(row as u32) as usize % self.width;
                self.table[row * self.width + col].load(Ordering::Relaxed)
            })
            .min()
            .unwrap_or(0)
    }

    /// Halve every cell, rounding down.
    pub fn decay(&self) {
        for cell in &self.table {
            cell.store(cell.load(Ordering::Relaxed) / 2, Ordering::Relaxed);
        }
    }

    /// Columns per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl std::fmt::Debug for CountMinSketch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountMinSketch")
            .field("width", &self.width)
            .field("depth", &self.depth)
            .finish()
    }
}
