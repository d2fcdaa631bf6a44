//! Monotonic access counters, read without synchronization at shutdown.

use std::sync::atomic::{AtomicU64, Ordering};

/// `total_access` counts one per dispatched SET/GET/DELETE regardless of
/// outcome; `cache_hits` counts one per dispatch that found the key
/// resident locally. Both only ever increase.
#[derive(Default)]
pub struct Metrics {
    total_access: AtomicU64,
    cache_hits: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics::default()
    }

    pub fn record_access(&self) {
        self.total_access.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// A relaxed-consistency snapshot: `(total_access, cache_hits)`.
    pub fn snapshot(&self) -> (u64, u64) {
        (
            self.total_access.load(Ordering::Relaxed),
            self.cache_hits.load(Ordering::Relaxed),
        )
    }

    /// Hit ratio as a fraction in `[0, 1]`; `0.0` if no accesses occurred.
    pub fn hit_ratio(&self) -> f64 {
        let (total, hits) = self.snapshot();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let m = Metrics::new();
        assert_eq!(m.snapshot(), (0, 0));
        assert_eq!(m.hit_ratio(), 0.0);
    }

    #[test]
    fn record_access_and_hit_accumulate() {
        let m = Metrics::new();
        m.record_access();
        m.record_access();
        m.record_hit();
        assert_eq!(m.snapshot(), (2, 1));
        assert_eq!(m.hit_ratio(), 0.5);
    }

    #[test]
    fn hits_never_exceed_access_under_correct_usage() {
        let m = Metrics::new();
        for _ in 0..10 {
            m.record_access();
            m.record_hit();
        }
        let (total, hits) = m.snapshot();
        assert!(hits <= total);
    }
}
