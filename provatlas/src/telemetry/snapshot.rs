//! Point-in-time copy of loader metrics.

use std::fmt;

/// Plain-value copy of [`LoaderMetrics`](super::LoaderMetrics) counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    /// Tiles served from the cache.
    pub cache_hits: u64,
    /// Cache lookups that missed.
    pub cache_misses: u64,
    /// Tiles fetched from the source.
    pub tiles_fetched: u64,
    /// Tiles the source reported as absent.
    pub tiles_absent: u64,
    /// Total encoded bytes fetched from the source.
    pub bytes_fetched: u64,
    /// Source fetches that failed.
    pub fetch_failures: u64,
    /// Fetched tiles that failed to decode.
    pub decode_failures: u64,
}

impl TelemetrySnapshot {
    /// Fraction of cache lookups that hit, or `None` before any lookup.
    pub fn hit_rate(&self) -> Option<f64> {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            None
        } else {
            Some(self.cache_hits as f64 / lookups as f64)
        }
    }
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hit_rate = self
            .hit_rate()
            .map(|r| format!("{:.1}%", r * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        write!(
            f,
            "hits: {} misses: {} (rate {}) fetched: {} ({} bytes) absent: {} errors: {} fetch / {} decode",
            self.cache_hits,
            self.cache_misses,
            hit_rate,
            self.tiles_fetched,
            self.bytes_fetched,
            self.tiles_absent,
            self.fetch_failures,
            self.decode_failures,
        )
    }
}
