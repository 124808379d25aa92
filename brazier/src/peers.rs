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

use async_trait::async_trait;

use crate::error::Result;

/// Total replicas per key: the ring-designated primary plus the extras, so
/// pickers hand out up to `DEFAULT_REPLICA_COUNT - 1` replica clients.
pub const DEFAULT_REPLICA_COUNT: usize = 3;

/// A transport client for one remote peer.
///
/// Implementations live outside the core and are expected to be
/// concurrency-safe; every call may fail with an opaque transport error.
#[async_trait]
pub trait PeerClient: Send + Sync + 'static {
    /// Fetch the value for `key` in `group` from this peer.
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>>;

    /// Push a replica of `key` to this peer.
    async fn set(&self, group: &str, key: &str, value: &[u8]) -> Result<()>;

    /// Drop `key` from this peer.
    async fn delete(&self, group: &str, key: &str) -> Result<()>;
}

/// Selects the peers responsible for a key.
pub trait PeerPicker: Send + Sync + 'static {
    /// The peer owning `key`, or `None` when the local node owns it.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerClient>>;

    /// The ordered replica peers for `key`, excluding the local node.
    fn replica_peers(&self, key: &str) -> Vec<Arc<dyn PeerClient>>;
}
