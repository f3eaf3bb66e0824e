//! Room feed orchestrator — single owner of all room-pipeline state.
//!
//! Combines the user's seed selection with the cached artist pools and the
//! current tuned parameters into the room list.  Network happens only on
//! selection changes (`InitialLoad`); once `Ready`, every parameter change
//! is a debounced, fetch-free, synchronous recomputation.
//!
//! Errors never escape to the caller: fetch failures degrade the pools and
//! surface as a user-facing `error` string with `regenerate_rooms` as the
//! retry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info, warn};
use tuner_core::params::Axis;
use tuner_core::timer::IdleTimer;

use crate::artist::{Artist, MAX_SEED_ARTISTS};
use crate::client::ArtistSource;
use crate::pool::{ArtistPools, SelectionKey};
use crate::rooms::{build_rooms, similarity_range_info, Room, RoomParams, SimilarityRangeInfo};

/// Lifecycle of the orchestrator.  `InitialLoad` is entered on every
/// selection-set change and never revisited by mere parameter changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InitialLoad,
    Ready,
}

/// Fine-grained loading flags for the UI layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadingState {
    pub initial_load: bool,
    pub similar_artists: bool,
    /// Lightweight synchronous sub-state while rooms are being rebuilt.
    pub room_generation: bool,
    /// 0.0..=1.0 across the artist-resolution loop.
    pub progress: f32,
}

pub struct RoomOrchestrator<S: ArtistSource, R: Rng> {
    pools: ArtistPools<S>,
    rng: R,

    seeds: Vec<Artist>,
    selection_key: SelectionKey,
    /// Bumped on every selection change; async fetch results are checked
    /// against it before being committed, so a stale in-flight fetch that
    /// completes late cannot overwrite fresher state.
    selection_epoch: u64,

    related: Arc<Vec<Artist>>,
    random: Arc<Vec<Artist>>,

    phase: Phase,
    loading: LoadingState,
    error: Option<String>,
    rooms: Vec<Room>,

    active_axis: Axis,
    volume: i32,
    similarity: i32,
    /// Whether the current active-axis value is a committed landing (knob
    /// released) rather than a mid-drag pause.  Only a landed rebuild marks
    /// the target room.
    landed: bool,

    debounce: IdleTimer,
    room_count: usize,
}

impl<S: ArtistSource, R: Rng> RoomOrchestrator<S, R> {
    pub fn new(pools: ArtistPools<S>, rng: R, debounce: Duration, room_count: usize) -> Self {
        Self {
            pools,
            rng,
            seeds: Vec::new(),
            selection_key: SelectionKey::empty(),
            selection_epoch: 0,
            related: Arc::new(Vec::new()),
            random: Arc::new(Vec::new()),
            phase: Phase::Idle,
            loading: LoadingState::default(),
            error: None,
            rooms: Vec::new(),
            active_axis: Axis::Volume,
            volume: 1600,
            similarity: 0,
            landed: true,
            debounce: IdleTimer::new(debounce),
            room_count,
        }
    }

    // ── Selection ─────────────────────────────────────────────────────────────

    /// Apply a seed-artist selection.  Compared as an order-independent set;
    /// re-selecting the same artists in any order is a no-op.  A genuine
    /// change returns the orchestrator to `InitialLoad` and refetches pools.
    pub async fn select_artists(&mut self, mut seeds: Vec<Artist>) {
        if seeds.len() > MAX_SEED_ARTISTS {
            warn!(
                "selection of {} seeds truncated to {}",
                seeds.len(),
                MAX_SEED_ARTISTS
            );
            seeds.truncate(MAX_SEED_ARTISTS);
        }
        let key = SelectionKey::from_artists(&seeds);
        if key == self.selection_key && self.phase == Phase::Ready {
            debug!("selection unchanged, keeping cached pools");
            return;
        }

        self.seeds = seeds;
        self.selection_key = key;
        self.selection_epoch += 1;
        let epoch = self.selection_epoch;

        self.phase = Phase::InitialLoad;
        self.loading = LoadingState {
            initial_load: true,
            similar_artists: true,
            room_generation: false,
            progress: 0.0,
        };
        self.error = None;

        self.load_pools(epoch).await;
    }

    async fn load_pools(&mut self, epoch: u64) {
        let seeds = self.seeds.clone();

        let loading = &mut self.loading;
        let related = self
            .pools
            .related_for(&seeds, |p| loading.progress = p)
            .await;
        let random = self.pools.random_pool().await;

        if epoch != self.selection_epoch {
            debug!("discarding stale pool fetch (epoch {})", epoch);
            return;
        }

        match related {
            Ok(pool) => {
                info!("related pool ready: {} artists", pool.len());
                self.related = pool;
            }
            Err(e) => {
                warn!("related pool fetch failed: {}", e);
                self.related = Arc::new(Vec::new());
                self.error = Some("Couldn't load similar artists. Try regenerating.".to_string());
            }
        }
        match random {
            Ok(pool) => self.random = pool,
            Err(e) => {
                warn!("random pool fetch failed: {}", e);
                self.random = Arc::new(Vec::new());
            }
        }

        self.loading.initial_load = false;
        self.loading.similar_artists = false;
        self.loading.progress = 1.0;
        self.phase = Phase::Ready;

        self.rebuild_rooms();
    }

    // ── Parameter changes ─────────────────────────────────────────────────────

    /// The similarity dial moved.  `landed_volume` carries the value the user
    /// had already landed on the other axis, keeping both axes consistent.
    /// `landed` is true for a committed value (knob released), false while
    /// the user is still turning.
    pub fn handle_similarity_change(
        &mut self,
        value: i32,
        landed_volume: Option<i32>,
        landed: bool,
        now: Instant,
    ) {
        self.active_axis = Axis::Similarity;
        self.similarity = Axis::Similarity.clamp(value);
        if let Some(v) = landed_volume {
            self.volume = Axis::Volume.clamp(v);
        }
        self.landed = landed;
        self.debounce.restart(now);
    }

    /// The volume dial moved.
    pub fn handle_volume_change(
        &mut self,
        value: i32,
        landed_similarity: Option<i32>,
        landed: bool,
        now: Instant,
    ) {
        self.active_axis = Axis::Volume;
        self.volume = Axis::Volume.clamp(value);
        if let Some(s) = landed_similarity {
            self.similarity = Axis::Similarity.clamp(s);
        }
        self.landed = landed;
        self.debounce.restart(now);
    }

    /// Drive the debounce.  When the quiet window elapses, rooms are rebuilt
    /// synchronously from the cached pools — no network.  The parameter
    /// values observed at fire time are authoritative.  Returns true when
    /// the room list was rebuilt.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.phase != Phase::Ready || !self.debounce.fire(now) {
            return false;
        }
        self.loading.room_generation = true;
        self.rebuild_rooms();
        self.loading.room_generation = false;
        true
    }

    /// Retry surface for the UI.  Clears the error, refetches any missing
    /// pool, and rebuilds.
    pub async fn regenerate_rooms(&mut self) {
        self.error = None;
        if self.related.is_empty() && !self.seeds.is_empty() {
            let epoch = self.selection_epoch;
            self.phase = Phase::InitialLoad;
            self.loading.initial_load = true;
            self.load_pools(epoch).await;
            return;
        }
        self.loading.room_generation = true;
        self.rebuild_rooms();
        self.loading.room_generation = false;
    }

    /// Recompute the room list from the cached pools.  While a fetch error
    /// stands the list stays empty; `regenerate_rooms` clears the error
    /// before retrying.
    fn rebuild_rooms(&mut self) {
        if self.error.is_some() {
            self.rooms.clear();
            return;
        }
        let params = RoomParams {
            active_axis: self.active_axis,
            volume: self.volume,
            similarity: self.similarity,
            landed: self.landed,
        };
        self.rooms = build_rooms(
            &params,
            &self.seeds,
            &self.related,
            &self.random,
            self.room_count,
            &mut self.rng,
        );
        debug!(
            "rebuilt {} rooms at volume={} similarity={} ({})",
            self.rooms.len(),
            self.volume,
            self.similarity,
            self.active_axis.label()
        );
        if self.rooms.is_empty() && self.error.is_none() {
            self.error = Some("No rooms available for this tuning. Try regenerating.".to_string());
        }
    }

    // ── Read surface ──────────────────────────────────────────────────────────

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn loading(&self) -> &LoadingState {
        &self.loading
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::InitialLoad || self.loading.room_generation
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current_similarity(&self) -> i32 {
        self.similarity
    }

    pub fn current_volume(&self) -> i32 {
        self.volume
    }

    pub fn selected_seeds(&self) -> &[Artist] {
        &self.seeds
    }

    pub fn get_similarity_range_info(&self, value: i32) -> SimilarityRangeInfo {
        similarity_range_info(value)
    }
}
