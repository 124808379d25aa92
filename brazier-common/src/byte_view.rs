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

use std::{borrow::Cow, fmt::Debug};

use bytes::Bytes;

/// An immutable view over an owned byte sequence.
///
/// `ByteView` is the only value type the cache carries. The constructor copies
/// the source into a fresh owned buffer, and [`ByteView::to_vec`] hands out
/// fresh copies, so neither the producer nor any consumer can mutate a value
/// another holder observes. Cloning a view shares the underlying buffer.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    inner: Bytes,
}

impl ByteView {
    /// Copy `src` into a fresh owned buffer and wrap it.
    pub fn copy_from(src: &[u8]) -> Self {
        Self {
            inner: Bytes::copy_from_slice(src),
        }
    }

    /// Length of the viewed bytes.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// `true` if the view holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// A fresh copy of the viewed bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.inner.to_vec()
    }

    /// Best-effort text rendering of the viewed bytes.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.inner)
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl Debug for ByteView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteView").field("len", &self.len()).finish()
    }
}
