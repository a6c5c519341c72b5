//! Single-entry result cache with a freshness window.
//!
//! Holds at most one computed value, replaced wholesale on every successful
//! recompute. A failed compute leaves the previous entry untouched, and the
//! next call retries. Concurrent misses are serialized: only one compute runs
//! at a time and waiters re-check freshness before starting their own.

use chrono::{DateTime, Duration, Utc};
use log::debug;
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::services::clock::Clock;

#[derive(Debug)]
struct CacheEntry<T> {
    computed_at: DateTime<Utc>,
    payload: Arc<T>,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = now - self.computed_at;
        age >= Duration::zero() && age < ttl
    }
}

pub struct ResultCache<T> {
    entry: RwLock<Option<CacheEntry<T>>>,
    in_flight: Mutex<()>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<T> ResultCache<T> {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entry: RwLock::new(None),
            in_flight: Mutex::new(()),
            clock,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// When the current entry was computed, if there is one.
    pub fn computed_at(&self) -> Option<DateTime<Utc>> {
        self.entry.read().as_ref().map(|e| e.computed_at)
    }

    /// Drop the current entry so the next call recomputes.
    pub fn invalidate(&self) {
        *self.entry.write() = None;
    }

    fn fresh(&self) -> Option<Arc<T>> {
        let now = self.clock.now();
        self.entry
            .read()
            .as_ref()
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| Arc::clone(&entry.payload))
    }

    /// Return the cached value while fresh, otherwise run `compute` and store
    /// its result.
    ///
    /// `compute` receives the instant the entry will be stamped with.
    ///
    /// # Errors
    /// Whatever `compute` returns; the cache is left unchanged.
    pub async fn get_or_compute<F, Fut, E>(&self, compute: F) -> Result<Arc<T>, E>
    where
        F: FnOnce(DateTime<Utc>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(payload) = self.fresh() {
            debug!("Result cache hit");
            return Ok(payload);
        }

        let _guard = self.in_flight.lock().await;
        if let Some(payload) = self.fresh() {
            debug!("Result cache filled by a concurrent caller");
            return Ok(payload);
        }

        let now = self.clock.now();
        let payload = Arc::new(compute(now).await?);
        *self.entry.write() = Some(CacheEntry {
            computed_at: now,
            payload: Arc::clone(&payload),
        });
        Ok(payload)
    }
}
