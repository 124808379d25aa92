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

use hashbrown::{hash_map::EntryRef, HashMap};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::{Error, Result};

type Notifier<T> = oneshot::Sender<Result<T>>;

/// Deduplicates concurrent loads of the same key into one in-flight
/// execution.
///
/// The first caller for a key becomes the leader and runs the future; every
/// caller that arrives before the leader finishes waits on a oneshot
/// notifier and observes the leader's cloned result. Once the result is
/// delivered the entry is gone and the next caller executes again.
pub struct Singleflight<T> {
    calls: Mutex<HashMap<String, Vec<Notifier<T>>>>,
}

impl<T> Default for Singleflight<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Singleflight<T> {
    /// Create an empty singleflight group.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Number of keys currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<T> Singleflight<T>
where
    T: Clone,
{
    /// Run `f` for `key`, sharing its result with every concurrent caller.
    ///
    /// Waiters whose leader is dropped before completing observe an
    /// `Interrupted` error rather than hanging.
    pub async fn run<F>(&self, key: &str, f: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let waiter = {
            let mut calls = self.calls.lock();
            match calls.entry_ref(key) {
                EntryRef::Occupied(mut o) => {
                    let (tx, rx) = oneshot::channel();
                    o.get_mut().push(tx);
                    Some(rx)
                }
                EntryRef::Vacant(v) => {
                    v.insert(Vec::new());
                    None
                }
            }
        };

        if let Some(rx) = waiter {
            return match rx.await {
                Ok(result) => result,
                Err(_) => Err(Error::interrupted()),
            };
        }

        let guard = FlightGuard {
            calls: &self.calls,
            key,
            done: false,
        };
        let result = f.await;
        for notifier in guard.take() {
            let _ = notifier.send(result.clone());
        }
        result
    }
}

/// Removes the in-flight entry even if the leader future is dropped
/// mid-execution, closing the waiters' channels.
struct FlightGuard<'a, T> {
    calls: &'a Mutex<HashMap<String, Vec<Notifier<T>>>>,
    key: &'a str,
    done: bool,
}

impl<T> FlightGuard<'_, T> {
    fn take(mut self) -> Vec<Notifier<T>> {
        self.done = true;
        self.calls.lock().remove(self.key).unwrap_or_default()
    }
}

impl<T> Drop for FlightGuard<'_, T> {
    fn drop(&mut self) {
        if !self.done {
            self.calls.lock().remove(self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use std::time::Duration;

    use futures::future::join_all;
    use itertools::Itertools;

    use super::*;

    #[tokio::test]
    async fn test_concurrent_callers_coalesce() {
        let flights = Arc::new(Singleflight::new());
        let invocations = Arc::new(AtomicUsize::new(0));

        let handles = (0..100)
            .map(|_| {
                let flights = flights.clone();
                let invocations = invocations.clone();
                tokio::spawn(async move {
                    flights
                        .run("k", async {
                            invocations.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            Ok(b"X".to_vec())
                        })
                        .await
                })
            })
            .collect_vec();

        let results = join_all(handles).await;
        for result in results {
            assert_eq!(result.unwrap().unwrap(), b"X".to_vec());
        }
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
        assert_eq!(flights.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_distinct_keys_run_independently() {
        let flights = Arc::new(Singleflight::new());
        let invocations = Arc::new(AtomicUsize::new(0));

        let handles = ["k1", "k2"]
            .into_iter()
            .map(|key| {
                let flights = flights.clone();
                let invocations = invocations.clone();
                tokio::spawn(async move {
                    flights
                        .run(key, async {
                            invocations.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok(key.to_owned())
                        })
                        .await
                })
            })
            .collect_vec();

        let results = join_all(handles).await;
        assert_eq!(results[0].as_ref().unwrap().as_ref().unwrap(), "k1");
        assert_eq!(results[1].as_ref().unwrap().as_ref().unwrap(), "k2");
        assert_eq!(invocations.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reexecutes_after_delivery() {
        let flights = Singleflight::new();
        let invocations = AtomicUsize::new(0);

        for _ in 0..3 {
            let result = flights
                .run("k", async {
                    invocations.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await;
            assert_eq!(result.unwrap(), 42);
        }
        assert_eq!(invocations.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_errors_are_broadcast() {
        let flights = Arc::new(Singleflight::<u32>::new());

        let handles = (0..10)
            .map(|_| {
                let flights = flights.clone();
                tokio::spawn(async move {
                    flights
                        .run("k", async {
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Err(Error::not_found("k"))
                        })
                        .await
                })
            })
            .collect_vec();

        for result in join_all(handles).await {
            let err = result.unwrap().unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
        }
    }

    #[tokio::test]
    async fn test_dropped_leader_releases_waiters() {
        let flights = Arc::new(Singleflight::<u32>::new());

        let leader = {
            let flights = flights.clone();
            tokio::spawn(async move {
                flights
                    .run("k", async {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                        Ok(1)
                    })
                    .await
            })
        };
        // Let the leader take the entry before a waiter joins.
        tokio::task::yield_now().await;
        assert_eq!(flights.in_flight(), 1);

        let waiter = {
            let flights = flights.clone();
            tokio::spawn(async move { flights.run("k", async { Ok(2) }).await })
        };
        tokio::task::yield_now().await;

        leader.abort();
        let err = waiter.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Interrupted);
        assert_eq!(flights.in_flight(), 0);
    }
}
