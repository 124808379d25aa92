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

//! Shared components and utils for brazier.

/// The immutable byte-sequence value type carried by the cache.
pub mod byte_view;
/// Provisioned FNV hashers and the double-hashing probe scheme.
pub mod hash;
/// Detached task spawning helpers.
pub mod spawn;
/// Process-wide counters and enable switches.
pub mod telemetry;
