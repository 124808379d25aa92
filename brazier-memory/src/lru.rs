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

use std::sync::Arc;

use brazier_common::byte_view::ByteView;
use hashbrown::HashMap;

/// Callback invoked with each entry removed by eviction or [`LruShard::remove`].
pub type EvictionListener = Box<dyn Fn(&str, &ByteView) + Send + Sync>;

const NIL: usize = usize::MAX;

struct Node {
    key: Arc<str>,
    value: ByteView,
    prev: usize,
    next: usize,
}

/// A bounded LRU map over arena-allocated entry nodes.
///
/// Entries are linked most- to least-recently used through indices into the
/// arena; the index map stores node handles, and freed slots are pooled for
/// reuse. Each resident entry charges `key.len() + value.len()` bytes, and
/// admission evicts from the tail until usage fits `max_bytes`.
/// `max_bytes == 0` disables the bound.
///
/// The shard is not internally synchronized; the enclosing cache holds one
/// lock per shard around every call. The eviction listener runs with that
/// lock held and must not reenter the shard.
pub struct LruShard {
    map: HashMap<Arc<str>, usize>,
    nodes: Vec<Node>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    bytes: usize,
    max_bytes: usize,
    listener: Option<EvictionListener>,
}

impl LruShard {
    /// Create a shard bounded by `max_bytes` (`0` = unbounded).
    pub fn new(max_bytes: usize) -> Self {
        Self {
            map: HashMap::new(),
            nodes: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            bytes: 0,
            max_bytes,
            listener: None,
        }
    }

    /// Attach a listener observing every evicted or removed entry.
    pub fn with_eviction_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(&str, &ByteView) + Send + Sync + 'static,
    {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Insert `key` with `value`, or refresh an existing entry.
    ///
    /// Either path leaves `key` at the front of the recency order, then
    /// evicts from the tail while usage exceeds the bound.
    pub fn insert(&mut self, key: &str, value: ByteView) {
        if let Some(idx) = self.map.get(key).copied() {
            let node = &mut self.nodes[idx];
            self.bytes -= node.value.len();
            self.bytes += value.len();
            node.value = value;
            self.unlink(idx);
            self.push_front(idx);
        } else {
            let key: Arc<str> = Arc::from(key);
            self.bytes += key.len() + value.len();
            let idx = self.alloc(Node {
                key: key.clone(),
                value,
                prev: NIL,
                next: NIL,
            });
            self.map.insert(key, idx);
            self.push_front(idx);
        }

        while self.max_bytes != 0 && self.bytes > self.max_bytes && !self.map.is_empty() {
            self.evict_tail();
        }
    }

    /// Look up `key`, refreshing its recency on a hit.
    pub fn get(&mut self, key: &str) -> Option<ByteView> {
        let idx = *self.map.get(key)?;
        self.unlink(idx);
        self.push_front(idx);
        Some(self.nodes[idx].value.clone())
    }

    /// Remove `key` if resident. The eviction listener observes the removal.
    pub fn remove(&mut self, key: &str) {
        if let Some(idx) = self.map.get(key).copied() {
            self.unlink(idx);
            self.release(idx);
        }
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// `true` if no entry is resident.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Bytes charged by resident entries.
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// The configured bound (`0` = unbounded).
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    fn evict_tail(&mut self) {
        let idx = self.tail;
        if idx == NIL {
            return;
        }
        self.unlink(idx);
        self.release(idx);
    }

    /// Unmap a detached node, settle accounting, notify, and pool the slot.
    fn release(&mut self, idx: usize) {
        let node = &self.nodes[idx];
        self.map.remove(node.key.as_ref());
        self.bytes -= node.key.len() + node.value.len();
        if let Some(listener) = &self.listener {
            listener(node.key.as_ref(), &node.value);
        }
        self.nodes[idx].value = ByteView::default();
        self.free.push(idx);
    }

    fn alloc(&mut self, node: Node) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        if prev == NIL {
            self.head = next;
        } else {
            self.nodes[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.nodes[next].prev = prev;
        }
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = NIL;
    }

    fn push_front(&mut self, idx: usize) {
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = self.head;
        if self.head != NIL {
            self.nodes[self.head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    #[cfg(test)]
    fn dump(&self) -> Vec<(&str, &ByteView)> {
        let mut res = Vec::with_capacity(self.map.len());
        let mut idx = self.head;
        while idx != NIL {
            let node = &self.nodes[idx];
            res.push((node.key.as_ref(), &node.value));
            idx = node.next;
        }
        res
    }
}
