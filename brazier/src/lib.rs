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

//! brazier is a distributed, read-optimized, in-memory cache with a hot-key
//! fast path.
//!
//! Values live in named [`Group`]s, each with its own byte budget and
//! backing source. A read is served from the local sharded cache when
//! possible; on a miss the group fetches from the ring-designated peer (or
//! its replicas), or loads from the backing source, populating the local
//! cache and pushing replicas on the way out. Frequently read keys are
//! promoted into a lock-free side table and served without touching any
//! lock.

/// The error and result types.
pub mod error;
/// Named cache instances and their read/delete paths.
pub mod group;
/// The peer picker and client contracts consumed by groups.
pub mod peers;
/// Re-exports of the most commonly used types.
pub mod prelude;
/// The consistent-hash ring for peer selection.
pub mod ring;
/// Per-key request coalescing.
pub mod singleflight;

use std::sync::{Arc, LazyLock};

use hashbrown::HashMap;
use parking_lot::RwLock;

pub use brazier_common::{byte_view::ByteView, telemetry};

use group::Group;

static GROUPS: LazyLock<RwLock<HashMap<String, Arc<Group>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

pub(crate) fn register(group: Arc<Group>) {
    GROUPS.write().insert(group.name().to_owned(), group);
}

/// Look up a registered group by name.
pub fn get_group(name: &str) -> Option<Arc<Group>> {
    GROUPS.read().get(name).cloned()
}

/// Deregister `name` and return its group, if any.
///
/// The registry otherwise keeps groups alive for the process lifetime; tests
/// that build throwaway groups drop them through here.
pub fn remove_group(name: &str) -> Option<Arc<Group>> {
    GROUPS.write().remove(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registry_round_trip() {
        let group = Group::builder("registry-round-trip", 1 << 20)
            .build(|_key: String| async move { anyhow::Ok(b"v".to_vec()) });

        let found = get_group("registry-round-trip").unwrap();
        assert_eq!(found.name(), "registry-round-trip");
        assert!(Arc::ptr_eq(&group, &found));

        assert!(remove_group("registry-round-trip").is_some());
        assert!(get_group("registry-round-trip").is_none());
        assert!(remove_group("registry-round-trip").is_none());
    }

    #[tokio::test]
    async fn test_rebuild_replaces_registration() {
        let _a = Group::builder("registry-replace", 1 << 20)
            .build(|_key: String| async move { anyhow::Ok(b"a".to_vec()) });
        let b = Group::builder("registry-replace", 1 << 20)
            .build(|_key: String| async move { anyhow::Ok(b"b".to_vec()) });

        let found = get_group("registry-replace").unwrap();
        assert!(Arc::ptr_eq(&b, &found));
        remove_group("registry-replace");
    }
}
