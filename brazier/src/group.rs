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

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use brazier_common::{
    byte_view::ByteView,
    spawn,
    telemetry::{self, METRICS},
};
use brazier_memory::{ShardedCache, DEFAULT_DECAY_INTERVAL, DEFAULT_HOT_THRESHOLD};
use parking_lot::RwLock;

use crate::{
    error::{Error, Result},
    peers::{PeerClient, PeerPicker},
    singleflight::Singleflight,
};

/// The user-supplied backing source of a group.
///
/// Called at most once per coalesced miss; concurrent misses for the same
/// key share one invocation.
#[async_trait]
pub trait Loader: Send + Sync + 'static {
    /// Produce the value for `key`, or fail with the source's error.
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

#[async_trait]
impl<F, Fut> Loader for F
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Vec<u8>>> + Send + 'static,
{
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        (self)(key.to_owned()).await
    }
}

/// Builder for [`Group`].
pub struct GroupBuilder {
    name: String,
    capacity: usize,
    hot_threshold: u64,
    decay_interval: Duration,
}

impl GroupBuilder {
    /// Start building a group named `name` with `capacity` cache bytes.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            capacity,
            hot_threshold: DEFAULT_HOT_THRESHOLD,
            decay_interval: DEFAULT_DECAY_INTERVAL,
        }
    }

    /// Override the hot-key promotion threshold.
    pub fn with_hot_threshold(mut self, threshold: u64) -> Self {
        self.hot_threshold = threshold;
        self
    }

    /// Override the hot-key decay interval.
    pub fn with_decay_interval(mut self, interval: Duration) -> Self {
        self.decay_interval = interval;
        self
    }

    /// Build the group over its backing source and register it process-wide.
    pub fn build(self, loader: impl Loader) -> Arc<Group> {
        let group = Arc::new(Group {
            name: self.name,
            cache: ShardedCache::new(self.capacity, self.hot_threshold, self.decay_interval),
            flights: Singleflight::new(),
            loader: Arc::new(loader),
            peers: RwLock::new(None),
        });
        crate::register(group.clone());
        group
    }
}

/// A named cache instance: a byte budget, a backing source, and optionally
/// a picker routing keys to remote peers.
///
/// Reads check the local cache (hot map, then shard), fall back to the
/// ring-designated primary peer and its replicas, and finally load from the
/// backing source, populating the local cache and pushing replicas on the
/// way out. Concurrent misses for one key are coalesced into a single
/// fetch.
pub struct Group {
    name: String,
    cache: ShardedCache,
    flights: Singleflight<ByteView>,
    loader: Arc<dyn Loader>,
    peers: RwLock<Option<Arc<dyn PeerPicker>>>,
}

impl Group {
    /// Start building a group named `name` with `capacity` cache bytes.
    pub fn builder(name: impl Into<String>, capacity: usize) -> GroupBuilder {
        GroupBuilder::new(name, capacity)
    }

    /// The group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register the peer picker routing this group's keys.
    ///
    /// # Panics
    ///
    /// Panics when called more than once; the group must not continue with
    /// an ambiguous picker.
    pub fn register_peers(&self, picker: Arc<dyn PeerPicker>) {
        let mut peers = self.peers.write();
        assert!(peers.is_none(), "register_peers called more than once");
        *peers = Some(picker);
    }

    /// Get the value for `key`.
    ///
    /// Rejects the empty key. A local hit returns immediately; a miss is
    /// routed through the coalescer to a peer or to the backing source.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(Error::invalid_key());
        }

        if let Some(view) = self.cache.get(key) {
            if telemetry::logging_enabled() {
                tracing::debug!("[group {}]: hit {key}", self.name);
            }
            return Ok(view);
        }

        self.flights.run(key, self.load(key)).await
    }

    /// Remove `key` locally and propagate the removal to its replica peers.
    pub fn delete(&self, key: &str) {
        self.cache.remove(key);
        self.replicate(key, ReplicaOp::Delete);
    }

    /// Populate the local cache without replica propagation.
    ///
    /// This is the write path for a replica pushed by a peer; propagating
    /// again would bounce the value between replicas indefinitely.
    pub fn set_local(&self, key: &str, value: ByteView) {
        self.cache.insert(key, value);
    }

    /// Bytes resident in the local cache.
    pub fn cache_bytes(&self) -> usize {
        self.cache.bytes()
    }

    /// Entries resident in the local cache.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// End the hot-key decay task. Idempotent.
    pub fn stop(&self) {
        self.cache.detector().stop();
    }

    /// The coalesced miss path: primary peer, replica peers, then the
    /// backing source.
    async fn load(&self, key: &str) -> Result<ByteView> {
        let picker = self.peers.read().clone();
        if let Some(picker) = picker {
            if let Some(peer) = picker.pick_peer(key) {
                match self.load_from_peer(peer.as_ref(), key).await {
                    Ok(view) => {
                        telemetry::count(&METRICS.load_peer);
                        return Ok(view);
                    }
                    Err(e) => {
                        if telemetry::logging_enabled() {
                            tracing::debug!("[group {}]: primary peer failed for {key}: {e}", self.name);
                        }
                    }
                }
                for peer in picker.replica_peers(key) {
                    if let Ok(view) = self.load_from_peer(peer.as_ref(), key).await {
                        telemetry::count(&METRICS.load_peer);
                        return Ok(view);
                    }
                }
            }
        }
        self.load_from_source(key).await
    }

    async fn load_from_peer(&self, peer: &dyn PeerClient, key: &str) -> Result<ByteView> {
        let bytes = peer.get(&self.name, key).await?;
        Ok(ByteView::copy_from(&bytes))
    }

    async fn load_from_source(&self, key: &str) -> Result<ByteView> {
        let bytes = self.loader.load(key).await.map_err(|e| Error::load(e))?;
        telemetry::count(&METRICS.load_source);
        let view = ByteView::copy_from(&bytes);
        self.set(key, view.clone());
        Ok(view)
    }

    /// Populate the local cache and push replicas. Source-load path only.
    fn set(&self, key: &str, value: ByteView) {
        self.cache.insert(key, value.clone());
        self.replicate(key, ReplicaOp::Set(value));
    }

    /// Fan `op` out to the replica peers for `key` as detached tasks.
    /// Failures are counted and logged, never surfaced.
    fn replicate(&self, key: &str, op: ReplicaOp) {
        let picker = self.peers.read().clone();
        let Some(picker) = picker else {
            return;
        };
        for peer in picker.replica_peers(key) {
            let name = self.name.clone();
            let key_owned = key.to_owned();
            let op = op.clone();
            let spawned = spawn::try_spawn(async move {
                let result = match &op {
                    ReplicaOp::Set(value) => peer.set(&name, &key_owned, value.as_ref()).await,
                    ReplicaOp::Delete => peer.delete(&name, &key_owned).await,
                };
                if let Err(e) = result {
                    telemetry::count(&METRICS.replicate_error);
                    tracing::warn!(
                        "[group {name}]: replica propagation failed for {key_owned}: {e}"
                    );
                }
            });
            if !spawned {
                tracing::warn!(
                    "[group {}]: no runtime reachable, replica propagation skipped for {key}",
                    self.name
                );
            }
        }
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("cache", &self.cache)
            .finish()
    }
}

#[derive(Clone)]
enum ReplicaOp {
    Set(ByteView),
    Delete,
}
