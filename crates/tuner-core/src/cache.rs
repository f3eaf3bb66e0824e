//! Feed cache — keyed windows with debounced regeneration.
//!
//! The cache exists so jitter within one band never recomputes a window,
//! while genuine band changes still land promptly.  `FeedEngine` is the sole
//! owner: the cache map, the generator, and the idle timer are all private,
//! and nothing else may mutate them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};
use rand::Rng;
use tracing::{debug, info};

use crate::feed::{FeedGenerator, Station, WindowRequest};
use crate::params::{band_index, Axis, ParameterState};
use crate::timer::IdleTimer;

/// Composite cache key.  Structured rather than string-concatenated, so two
/// unrelated states can never collide by formatting accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BandKey {
    pub axis: Axis,
    pub band: u32,
    /// The exact landed value, or None when the user is still tuning.
    /// Included so each landing gets its own correctly anchored window.
    pub landed: Option<i32>,
}

/// One cached window.  Immutable once created; `items` is the identity-stable
/// reference consumers use for memoization.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: BandKey,
    pub items: Arc<Vec<Station>>,
    pub created_at: DateTime<Local>,
}

pub struct FeedEngine<R: Rng> {
    generator: FeedGenerator<R>,
    entries: HashMap<BandKey, CacheEntry>,
    idle: IdleTimer,
    params: ParameterState,
    landed: Option<i32>,
    /// Secondary-axis candidates per band, refreshed on band change.
    band_frequencies: Vec<i32>,
    /// Last published window, for consumers that poll between fires.
    current: Option<Arc<Vec<Station>>>,
}

impl<R: Rng> FeedEngine<R> {
    pub fn new(generator: FeedGenerator<R>, idle: IdleTimer) -> Self {
        Self {
            generator,
            entries: HashMap::new(),
            idle,
            params: ParameterState::default(),
            landed: None,
            band_frequencies: Vec::new(),
            current: None,
        }
    }

    /// Candidate secondary-axis values used to diversify generated windows.
    /// Typically produced by `feed::frequency_points` once per band.
    pub fn set_band_frequencies(&mut self, freqs: Vec<i32>) {
        self.band_frequencies = freqs;
    }

    /// Record a parameter update and (re)start the quiet window.
    ///
    /// An axis switch invalidates every cached entry immediately — windows
    /// generated for the other axis are never reusable, even when a band
    /// index happens to coincide numerically.
    pub fn set_params(&mut self, params: ParameterState, landed: Option<i32>, now: Instant) {
        if params.active_axis != self.params.active_axis {
            info!(
                "axis switch {} -> {}: clearing {} cached windows",
                self.params.active_axis.label(),
                params.active_axis.label(),
                self.entries.len()
            );
            self.entries.clear();
            self.current = None;
        }
        self.params = params;
        self.landed = landed.map(|v| params.active_axis.clamp(v));
        self.idle.restart(now);
    }

    /// The key the current state maps to.
    pub fn current_key(&self) -> BandKey {
        BandKey {
            axis: self.params.active_axis,
            band: band_index(self.params.active_axis, self.params.active_value()),
            landed: self.landed,
        }
    }

    /// Drive the idle timer.  When the quiet window elapses, publish the
    /// window for the current key: a cache hit returns the identical `Arc`
    /// (pointer-equal, no recomputation); a miss generates and stores.
    ///
    /// Returns `Some` only on the tick where a window is (re)published.
    pub fn poll(&mut self, now: Instant) -> Option<Arc<Vec<Station>>> {
        if !self.idle.fire(now) {
            return None;
        }
        let key = self.current_key();
        if let Some(entry) = self.entries.get(&key) {
            debug!("feed cache hit for {:?}", key);
            self.current = Some(Arc::clone(&entry.items));
            return Some(Arc::clone(&entry.items));
        }

        debug!("feed cache miss for {:?}, generating", key);
        let items = Arc::new(self.generator.generate_window(&WindowRequest {
            active_axis: self.params.active_axis,
            volume: self.params.volume,
            similarity: self.params.similarity,
            landed: self.landed,
            band_frequencies: &self.band_frequencies,
            band: key.band,
        }));
        self.entries.insert(
            key,
            CacheEntry {
                key,
                items: Arc::clone(&items),
                created_at: Local::now(),
            },
        );
        self.current = Some(Arc::clone(&items));
        Some(items)
    }

    /// Last published window, if any.
    pub fn current(&self) -> Option<&Arc<Vec<Station>>> {
        self.current.as_ref()
    }

    pub fn cached_windows(&self) -> usize {
        self.entries.len()
    }

    pub fn params(&self) -> &ParameterState {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    const IDLE: Duration = Duration::from_millis(1000);

    fn engine() -> FeedEngine<StdRng> {
        let mut engine = FeedEngine::new(
            FeedGenerator::new(StdRng::seed_from_u64(1), 8),
            IdleTimer::new(IDLE),
        );
        engine.set_band_frequencies(vec![-600, 0, 600]);
        engine
    }

    fn params(axis: Axis, volume: i32, similarity: i32) -> ParameterState {
        ParameterState {
            volume,
            similarity,
            active_axis: axis,
        }
    }

    #[test]
    fn test_nothing_published_before_idle_window() {
        let t0 = Instant::now();
        let mut engine = engine();
        engine.set_params(params(Axis::Volume, 1326, 80), Some(1326), t0);
        assert!(engine.poll(t0 + Duration::from_millis(500)).is_none());
        assert!(engine.poll(t0 + IDLE).is_some());
    }

    #[test]
    fn test_same_key_reuses_identical_arc() {
        let t0 = Instant::now();
        let mut engine = engine();
        let p = params(Axis::Volume, 1326, 80);

        engine.set_params(p, Some(1326), t0);
        let first = engine.poll(t0 + IDLE).unwrap();

        // Jitter within the same band and the same landing.
        engine.set_params(params(Axis::Volume, 1340, 80), Some(1326), t0 + IDLE);
        let second = engine.poll(t0 + IDLE + IDLE).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.cached_windows(), 1);
    }

    #[test]
    fn test_band_change_generates_new_window() {
        let t0 = Instant::now();
        let mut engine = engine();
        engine.set_params(params(Axis::Volume, 100, 0), None, t0);
        let first = engine.poll(t0 + IDLE).unwrap();

        engine.set_params(params(Axis::Volume, 700, 0), None, t0 + IDLE);
        let second = engine.poll(t0 + IDLE + IDLE).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(engine.cached_windows(), 2);
    }

    #[test]
    fn test_distinct_landed_values_are_distinct_entries() {
        let t0 = Instant::now();
        let mut engine = engine();

        engine.set_params(params(Axis::Volume, 1310, 0), Some(1310), t0);
        let first = engine.poll(t0 + IDLE).unwrap();
        assert_eq!(first[0].volume, 1310);

        // Same band (4), different landing point.
        engine.set_params(params(Axis::Volume, 1390, 0), Some(1390), t0 + IDLE);
        let second = engine.poll(t0 + IDLE + IDLE).unwrap();
        assert_eq!(second[0].volume, 1390);

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(engine.cached_windows(), 2);
    }

    #[test]
    fn test_axis_switch_clears_cache() {
        let t0 = Instant::now();
        let mut engine = engine();
        engine.set_params(params(Axis::Volume, 700, 0), None, t0);
        engine.poll(t0 + IDLE).unwrap();
        assert_eq!(engine.cached_windows(), 1);

        // Similarity value 0 indexes band 3 on its own axis; even a
        // numerically colliding band index must not survive the switch.
        engine.set_params(params(Axis::Similarity, 700, 0), None, t0 + IDLE);
        assert_eq!(engine.cached_windows(), 0);
        assert!(engine.current().is_none());

        let regenerated = engine.poll(t0 + IDLE + IDLE).unwrap();
        assert_eq!(engine.cached_windows(), 1);
        assert!(!regenerated.is_empty());
    }

    #[test]
    fn test_rapid_updates_coalesce_to_latest() {
        let t0 = Instant::now();
        let mut engine = engine();
        for (i, v) in [100, 400, 800, 1326].iter().enumerate() {
            engine.set_params(
                params(Axis::Volume, *v, 0),
                None,
                t0 + Duration::from_millis(i as u64 * 100),
            );
        }
        // Quiet window measured from the last update.
        let last = t0 + Duration::from_millis(300);
        assert!(engine.poll(last + Duration::from_millis(999)).is_none());
        engine.poll(last + IDLE).unwrap();
        // Only the final band was generated.
        assert_eq!(engine.cached_windows(), 1);
        assert_eq!(engine.current_key().band, 4);
    }
}
