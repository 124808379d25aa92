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

pub use brazier_memory::{ShardedCache, DEFAULT_DECAY_INTERVAL, DEFAULT_HOT_THRESHOLD};

pub use crate::{
    error::{Error, ErrorKind, Result},
    get_group,
    group::{Group, GroupBuilder, Loader},
    peers::{PeerClient, PeerPicker, DEFAULT_REPLICA_COUNT},
    remove_group,
    ring::{HashRing, DEFAULT_VNODES},
    singleflight::Singleflight,
    ByteView,
};
