//! Atomic counters for the tile load path.

use std::sync::atomic::{AtomicU64, Ordering};

use super::TelemetrySnapshot;

/// Lock-free counters recorded by the loader and the tile cache client.
///
/// Counters only ever increase; readers take a [`TelemetrySnapshot`] for a
/// consistent-enough point-in-time view.
#[derive(Debug, Default)]
pub struct LoaderMetrics {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    tiles_fetched: AtomicU64,
    tiles_absent: AtomicU64,
    bytes_fetched: AtomicU64,
    fetch_failures: AtomicU64,
    decode_failures: AtomicU64,
}

impl LoaderMetrics {
    /// Create a fresh metrics set with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cache hit.
    pub fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss.
    pub fn cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a tile fetched from the source, with its encoded size.
    pub fn tile_fetched(&self, bytes: usize) {
        self.tiles_fetched.fetch_add(1, Ordering::Relaxed);
        self.bytes_fetched.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record a tile the source does not have (ocean tile).
    pub fn tile_absent(&self) {
        self.tiles_absent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed source fetch.
    pub fn fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a tile that fetched but failed to decode.
    pub fn decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            tiles_fetched: self.tiles_fetched.load(Ordering::Relaxed),
            tiles_absent: self.tiles_absent.load(Ordering::Relaxed),
            bytes_fetched: self.bytes_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_zero() {
        let metrics = LoaderMetrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.cache_hits, 0);
        assert_eq!(snapshot.tiles_fetched, 0);
        assert_eq!(snapshot.bytes_fetched, 0);
    }

    #[test]
    fn test_counters_accumulate() {
        let metrics = LoaderMetrics::new();
        metrics.cache_hit();
        metrics.cache_hit();
        metrics.cache_miss();
        metrics.tile_fetched(1500);
        metrics.tile_fetched(500);
        metrics.tile_absent();
        metrics.fetch_failure();
        metrics.decode_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.cache_hits, 2);
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.tiles_fetched, 2);
        assert_eq!(snapshot.bytes_fetched, 2000);
        assert_eq!(snapshot.tiles_absent, 1);
        assert_eq!(snapshot.fetch_failures, 1);
        assert_eq!(snapshot.decode_failures, 1);
    }

    #[test]
    fn test_concurrent_updates() {
        use std::sync::Arc;
        use std::thread;

        let metrics = Arc::new(LoaderMetrics::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let metrics = Arc::clone(&metrics);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    metrics.cache_hit();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.snapshot().cache_hits, 8000);
    }
}
