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

use std::future::Future;

use tokio::runtime::Handle;

/// Spawn `future` onto the current tokio runtime, detached.
///
/// Returns `false` when no runtime is reachable from the calling thread; the
/// future is dropped in that case.
pub fn try_spawn<F>(future: F) -> bool
where
    F: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn(future);
            true
        }
        Err(_) => false,
    }
}

/// Run `f` as a detached task on the current tokio runtime, or inline on the
/// calling thread when no runtime is reachable.
pub fn spawn_or_inline<F>(f: F)
where
    F: FnOnce() + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move { f() });
        }
        Err(_) => f(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use super::*;

    #[test]
    fn test_spawn_or_inline_without_runtime() {
        let ran = Arc::new(AtomicBool::new(false));
        let r = ran.clone();
        spawn_or_inline(move || r.store(true, Ordering::SeqCst));
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_try_spawn_without_runtime() {
        assert!(!try_spawn(async {}));
    }

    #[tokio::test]
    async fn test_try_spawn_with_runtime() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        assert!(try_spawn(async move {
            let _ = tx.send(());
        }));
        rx.await.unwrap();
    }
}
