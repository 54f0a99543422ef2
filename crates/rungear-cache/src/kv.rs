//! Key-Value store wrapper with automatic serialization.

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Every this many writes, expired entries are swept from the whole store.
pub const SWEEP_EVERY_WRITES: u64 = 256;

#[derive(Debug)]
struct Entry {
    bytes: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Type-safe in-process cache.
///
/// Values are stored as JSON so any `Serialize + DeserializeOwned` type
/// round-trips. Cloning the cache yields another handle to the same store.
///
/// Expired entries are dropped when their key is read, on every
/// [`SWEEP_EVERY_WRITES`]th write, and by [`Cache::purge_expired`].
#[derive(Debug, Clone, Default)]
pub struct Cache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    writes: Arc<AtomicU64>,
}

impl Cache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, CacheError> {
        self.entries
            .lock()
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let session: Option<ShopSession> = cache.get("session:abc")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let mut entries = self.lock()?;
        let Some(entry) = entries.get(key) else {
            return Ok(None);
        };
        if !entry.is_expired(Instant::now()) {
            return Ok(Some(serde_json::from_slice(&entry.bytes)?));
        }
        entries.remove(key);
        Ok(None)
    }

    /// Set a value with no expiry.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        self.put(key, value, None)
    }

    /// Set a value that expires after `ttl`.
    pub fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.put(key, value, Some(Instant::now() + ttl))
    }

    fn put<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        expires_at: Option<Instant>,
    ) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        let mut entries = self.lock()?;
        entries.insert(key.to_string(), Entry { bytes, expires_at });
        self.note_write(&mut entries);
        Ok(())
    }

    /// Replace the value under `key` with `f(current)` in one step.
    ///
    /// No other writer can interleave between the read and the write. A
    /// missing or expired entry is passed to `f` as `None`.
    pub fn update<T, F>(&self, key: &str, ttl: Option<Duration>, f: F) -> Result<T, CacheError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> T,
    {
        let mut entries = self.lock()?;
        let now = Instant::now();
        let current = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(serde_json::from_slice(&entry.bytes)?),
            _ => None,
        };
        let next = f(current);
        let bytes = serde_json::to_vec(&next)?;
        entries.insert(
            key.to_string(),
            Entry {
                bytes,
                expires_at: ttl.map(|ttl| now + ttl),
            },
        );
        self.note_write(&mut entries);
        Ok(next)
    }

    fn note_write(&self, entries: &mut HashMap<String, Entry>) {
        let count = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if count % SWEEP_EVERY_WRITES == 0 {
            let swept = sweep(entries, Instant::now());
            if swept > 0 {
                tracing::debug!(swept, "expired cache entries swept");
            }
        }
    }

    /// Remove a value and return it, so only one caller ever observes it.
    ///
    /// Expired entries are removed and reported as `None`.
    pub fn take<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let entry = self.lock()?.remove(key);
        match entry {
            Some(entry) if entry.is_expired(Instant::now()) => Ok(None),
            Some(entry) => Ok(Some(serde_json::from_slice(&entry.bytes)?)),
            None => Ok(None),
        }
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.lock()?.remove(key);
        Ok(())
    }

    /// Check if a live key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let now = Instant::now();
        Ok(self
            .lock()?
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now)))
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        Ok(sweep(&mut *self.lock()?, Instant::now()))
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> Result<usize, CacheError> {
        Ok(self.lock()?.len())
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }
}

fn sweep(entries: &mut HashMap<String, Entry>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    before - entries.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Shoe {
        name: String,
        size: u8,
    }

    #[test]
    fn test_set_and_get() {
        let cache = Cache::new();
        let shoe = Shoe {
            name: "Novablast".into(),
            size: 9,
        };
        cache.set("shoe:1", &shoe).unwrap();

        let loaded: Option<Shoe> = cache.get("shoe:1").unwrap();
        assert_eq!(loaded, Some(shoe));
        assert!(cache.exists("shoe:1").unwrap());
    }

    #[test]
    fn test_take_is_single_use() {
        let cache = Cache::new();
        cache.set("once", &"payload").unwrap();

        let first: Option<String> = cache.take("once").unwrap();
        let second: Option<String> = cache.take("once").unwrap();
        assert_eq!(first.as_deref(), Some("payload"));
        assert_eq!(second, None);
    }

    #[test]
    fn test_expired_entries_are_invisible() {
        let cache = Cache::new();
        cache
            .set_with_ttl("gone", &1_u32, Duration::ZERO)
            .unwrap();

        assert!(!cache.exists("gone").unwrap());
        let value: Option<u32> = cache.take("gone").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_purge_expired() {
        let cache = Cache::new();
        cache.set_with_ttl("a", &1_u32, Duration::ZERO).unwrap();
        cache.set("b", &2_u32).unwrap();

        assert_eq!(cache.purge_expired().unwrap(), 1);
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_writes_sweep_expired_entries() {
        let cache = Cache::new();
        for i in 0..1000 {
            cache
                .set_with_ttl(&format!("ticket:{i}"), &i, Duration::ZERO)
                .unwrap();
        }
        for i in 0..1000 {
            cache
                .set_with_ttl(&format!("session:{i}"), &i, Duration::from_secs(3600))
                .unwrap();
        }

        // Everything expired was swept by the time the live entries landed,
        // except what arrived after the last sweep.
        let len = cache.len().unwrap();
        assert!(len >= 1000);
        assert!(len < 1000 + SWEEP_EVERY_WRITES as usize);
        assert_eq!(cache.get::<i32>("session:0").unwrap(), Some(0));
    }

    #[test]
    fn test_update_reads_and_writes_in_one_step() {
        let cache = Cache::new();
        let first = cache
            .update("visits", None, |n: Option<u32>| n.unwrap_or(0) + 1)
            .unwrap();
        let second = cache
            .update("visits", None, |n: Option<u32>| n.unwrap_or(0) + 1)
            .unwrap();
        assert_eq!((first, second), (1, 2));

        cache.set_with_ttl("stale", &9_u32, Duration::ZERO).unwrap();
        let fresh = cache
            .update("stale", None, |n: Option<u32>| n.unwrap_or(100))
            .unwrap();
        assert_eq!(fresh, 100);
    }

    #[test]
    fn test_wrong_type_is_serialize_error() {
        let cache = Cache::new();
        cache.set("n", &"not a shoe").unwrap();
        let result: Result<Option<Shoe>, _> = cache.get("n");
        assert!(matches!(result, Err(CacheError::SerializeError(_))));
    }

    #[test]
    fn test_clones_share_store() {
        let cache = Cache::new();
        let other = cache.clone();
        cache.set("k", &5_i64).unwrap();
        assert_eq!(other.get::<i64>("k").unwrap(), Some(5));
        other.delete("k").unwrap();
        assert!(cache.is_empty().unwrap());
    }
}
