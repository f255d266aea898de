//! The seam every live fetch passes through.
//!
//! Fetches for the same key are not coalesced: each caller performs its own
//! exchange and the last one to finish overwrites the store. [`Flight`] is the
//! one place where per-key coalescing would be introduced; for now it only
//! tracks how many fetches are in flight per key.

use std::future::Future;

use dashmap::DashMap;
use tracing::{debug, trace};

/// Per-key accounting of live fetches.
#[derive(Debug, Default)]
pub struct Flight {
    in_flight: DashMap<String, usize>,
}

impl Flight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `fetch` as a live fetch for `key`.
    ///
    /// Concurrent calls for the same key each run their own `fetch`. The
    /// accounting is released even if the returned future is dropped early.
    pub async fn run<F, T>(&self, key: &str, fetch: F) -> T
    where
        F: Future<Output = T>,
    {
        let already = {
            let mut count = self.in_flight.entry(key.to_owned()).or_insert(0);
            *count += 1;
            *count - 1
        };
        if already > 0 {
            debug!(key = %key, already, "live fetch already in flight; fetching independently");
        } else {
            trace!(key = %key, "live fetch started");
        }

        let _landing = Landing { flight: self, key };
        fetch.await
    }

    /// Number of live fetches currently running for `key`.
    pub fn in_flight(&self, key: &str) -> usize {
        self.in_flight.get(key).map_or(0, |count| *count)
    }
}

// Releases one in-flight slot for `key` on drop.
struct Landing<'a> {
    flight: &'a Flight,
    key: &'a str,
}

impl Drop for Landing<'_> {
    fn drop(&mut self) {
        let drained = match self.flight.in_flight.get_mut(self.key) {
            Some(mut count) => {
                *count -= 1;
                *count == 0
            }
            None => false,
        };
        if drained {
            self.flight
                .in_flight
                .remove_if(self.key, |_, count| *count == 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn counts_and_releases() {
        let flight = Flight::new();
        let out = flight
            .run("k", async {
                assert_eq!(flight.in_flight("k"), 1);
                42
            })
            .await;

        assert_eq!(out, 42);
        assert_eq!(flight.in_flight("k"), 0);
    }

    #[tokio::test]
    async fn concurrent_fetches_are_not_coalesced() {
        let flight = Flight::new();
        let (a, b) = tokio::join!(
            flight.run("k", async {
                tokio::task::yield_now().await;
                "a"
            }),
            flight.run("k", async {
                tokio::task::yield_now().await;
                "b"
            }),
        );

        assert_eq!((a, b), ("a", "b"));
        assert_eq!(flight.in_flight("k"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_fetch_releases_slot() {
        let flight = Flight::new();
        let result = tokio::time::timeout(
            Duration::from_secs(1),
            flight.run("k", std::future::pending::<()>()),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(flight.in_flight("k"), 0);
    }
}
