// ── Status cache ──
//
// Last fetched snapshot plus the instant it was stored. Freshness is a
// pure function of that instant and the configured window; the cache
// itself does no locking (the read coalescer owns it behind its mutex).

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::model::StoveSnapshot;

/// Time-windowed holder for the most recent [`StoveSnapshot`].
#[derive(Debug)]
pub struct StatusCache {
    freshness: Duration,
    snapshot: Option<Arc<StoveSnapshot>>,
    /// Cleared by `invalidate`; the snapshot itself is kept.
    fetched_at: Option<Instant>,
}

impl StatusCache {
    pub fn new(freshness: Duration) -> Self {
        Self {
            freshness,
            snapshot: None,
            fetched_at: None,
        }
    }

    /// `true` if a snapshot exists and was stored at most one freshness
    /// window ago. A zero window disables caching.
    pub fn is_fresh(&self) -> bool {
        self.snapshot.is_some()
            && !self.freshness.is_zero()
            && self
                .fetched_at
                .is_some_and(|at| at.elapsed() <= self.freshness)
    }

    /// The cached snapshot, fresh or not.
    pub fn get(&self) -> Option<Arc<StoveSnapshot>> {
        self.snapshot.clone()
    }

    /// The cached snapshot, only if it is still fresh.
    pub fn get_fresh(&self) -> Option<Arc<StoveSnapshot>> {
        if self.is_fresh() { self.get() } else { None }
    }

    /// Replace the whole snapshot and restart the freshness window.
    pub fn update(&mut self, snapshot: Arc<StoveSnapshot>) {
        self.snapshot = Some(snapshot);
        self.fetched_at = Some(Instant::now());
    }

    /// Keep the snapshot but force the next read to refetch.
    pub fn invalidate(&mut self) {
        self.fetched_at = None;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::model::{HeaterCoolerState, TargetHeaterCoolerState};

    fn snapshot(temp: f64) -> Arc<StoveSnapshot> {
        Arc::new(StoveSnapshot {
            name: None,
            active: true,
            current_state: HeaterCoolerState::Heating,
            target_state: TargetHeaterCoolerState::Auto,
            current_temperature: temp,
            target_temperature: 21.0,
            main_state: 3,
            sub_state: 0,
            revision: Value::from(1),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn empty_cache_is_stale() {
        let cache = StatusCache::new(Duration::from_millis(1000));
        assert!(!cache.is_fresh());
        assert!(cache.get().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_within_window() {
        let mut cache = StatusCache::new(Duration::from_millis(1000));
        cache.update(snapshot(20.0));

        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(cache.is_fresh());
        assert!(cache.get_fresh().is_some());

        // The window is inclusive: exactly 1000 ms old still counts.
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(cache.is_fresh());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(!cache.is_fresh());
        assert!(cache.get_fresh().is_none());
        // Stale data is still available on request.
        assert!(cache.get().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn update_replaces_wholesale() {
        let mut cache = StatusCache::new(Duration::from_millis(1000));
        cache.update(snapshot(20.0));
        tokio::time::advance(Duration::from_millis(1500)).await;
        cache.update(snapshot(22.5));

        assert!(cache.is_fresh());
        assert_eq!(cache.get().map(|s| s.current_temperature), Some(22.5));
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_forces_refetch() {
        let mut cache = StatusCache::new(Duration::from_millis(1000));
        cache.update(snapshot(20.0));
        cache.invalidate();
        assert!(!cache.is_fresh());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_window_is_never_fresh() {
        let mut cache = StatusCache::new(Duration::ZERO);
        cache.update(snapshot(20.0));
        assert!(!cache.is_fresh());
    }
}
