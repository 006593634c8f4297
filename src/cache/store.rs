//! Cache store implementation
//!
//! In-memory TTL cache over DashMap with ETags and prefix invalidation.

use super::{CacheConfig, QueryKey};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A cached report body
#[derive(Debug, Clone)]
pub struct CachedResult {
    /// Serialized JSON
    pub data: Vec<u8>,
    /// Quoted hex prefix of the SHA-256 of `data`
    pub etag: String,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl CachedResult {
    pub fn new(data: Vec<u8>, ttl: Duration) -> Self {
        let etag = compute_etag(&data);
        let now = Instant::now();
        Self {
            data,
            etag,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub fn remaining_ttl_secs(&self) -> u64 {
        self.expires_at
            .saturating_duration_since(Instant::now())
            .as_secs()
    }
}

/// ETag for a response body
pub fn compute_etag(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("\"{}\"", hex::encode(&hash[..16]))
}

/// Cache statistics
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Report cache shared by all requests
pub struct QueryCache {
    entries: DashMap<String, CachedResult>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    /// Bumped by every invalidation and clear
    generation: AtomicU64,
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Live entry for a query, dropping it if expired
    pub fn get(&self, key: &QueryKey) -> Option<CachedResult> {
        let storage_key = key.to_storage_key();
        if let Some(entry) = self.entries.get(&storage_key) {
            if !entry.is_expired() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, ttl_left = entry.remaining_ttl_secs(), "Cache hit");
                return Some(entry.clone());
            }
            drop(entry);
            self.entries.remove(&storage_key);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "Cache miss");
        None
    }

    /// Store a serialized result with the configured TTL
    pub fn set(&self, key: &QueryKey, data: Vec<u8>) -> CachedResult {
        let entry = CachedResult::new(data, self.config.ttl);
        debug!(key = %key, ttl_secs = self.config.ttl.as_secs(), "Cache set");
        self.entries.insert(key.to_storage_key(), entry.clone());

        self.maybe_evict();
        entry
    }

    /// Current invalidation generation, taken before computing a result
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Store a result only if nothing was invalidated since `generation`
    ///
    /// A result computed from data read before an invalidation is dropped
    /// instead of outliving it.
    pub fn set_if_current(
        &self,
        key: &QueryKey,
        data: Vec<u8>,
        generation: u64,
    ) -> Option<CachedResult> {
        if self.generation() != generation {
            debug!(key = %key, "Cache set skipped, invalidated while computing");
            return None;
        }
        Some(self.set(key, data))
    }

    /// Remove entries whose storage key starts with `pattern`
    pub fn invalidate_pattern(&self, pattern: &str) -> usize {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let keys_to_remove: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(pattern))
            .map(|entry| entry.key().clone())
            .collect();

        let count = keys_to_remove.len();
        for key in keys_to_remove {
            self.entries.remove(&key);
        }

        if count > 0 {
            debug!(pattern = pattern, count = count, "Invalidated cache entries");
        }
        count
    }

    pub fn clear(&self) -> usize {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let count = self.entries.len();
        self.entries.clear();
        info!(count = count, "Cache cleared");
        count
    }

    /// Remove expired entries
    pub fn cleanup(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let count = before.saturating_sub(self.entries.len());

        if count > 0 {
            debug!(count = count, "Cleaned up expired cache entries");
        }
        count
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Drop the oldest entries once over capacity
    fn maybe_evict(&self) {
        let len = self.entries.len();
        if len <= self.config.max_entries {
            return;
        }

        // Free a tenth of the capacity at once to avoid evicting on every set
        let to_evict = len - self.config.max_entries + (self.config.max_entries / 10).max(1);

        let mut by_age: Vec<(String, Instant)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.created_at))
            .collect();
        by_age.sort_by_key(|(_, created)| *created);

        let mut evicted = 0u64;
        for (key, _) in by_age.into_iter().take(to_evict) {
            if self.entries.remove(&key).is_some() {
                evicted += 1;
            }
        }
        self.evictions.fetch_add(evicted, Ordering::Relaxed);

        debug!(evicted = evicted, "Evicted cache entries");
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Spawn a background task that periodically sweeps expired entries
pub fn spawn_cleanup_task(cache: Arc<QueryCache>) {
    let interval = cache.config.cleanup_interval;

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let removed = cache.cleanup();
            let stats = cache.stats();
            debug!(
                removed = removed,
                entries = stats.entries,
                hit_rate = format!("{:.1}%", stats.hit_rate()),
                "Cache cleanup completed"
            );
        }
    });

    info!(interval_secs = interval.as_secs(), "Cache cleanup task started");
}
