//! End-to-end orchestrator flow against a scripted artist source.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use room_feed::orchestrator::{Phase, RoomOrchestrator};
use room_feed::{Artist, ArtistPools, ArtistSource, FetchError};

use rand::rngs::StdRng;
use rand::SeedableRng;

const DEBOUNCE: Duration = Duration::from_millis(300);

/// Scripted source.  Counts calls; fails everything while `failing` is set.
#[derive(Default)]
struct ScriptedSource {
    similar_calls: Arc<AtomicUsize>,
    random_calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl ArtistSource for ScriptedSource {
    async fn similar_artists(&self, seeds: &[String]) -> Result<Vec<String>, FetchError> {
        self.similar_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Decode("scripted outage".to_string()));
        }
        Ok(seeds.iter().map(|s| format!("{} Twin", s)).collect())
    }

    async fn artist_details(&self, name: &str) -> Result<Artist, FetchError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Decode("scripted outage".to_string()));
        }
        Ok(Artist::named(name))
    }

    async fn random_artists(&self, count: usize) -> Result<Vec<Artist>, FetchError> {
        self.random_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Decode("scripted outage".to_string()));
        }
        Ok((0..count)
            .map(|i| Artist::named(&format!("Random {}", i)))
            .collect())
    }
}

struct Handles {
    similar_calls: Arc<AtomicUsize>,
    random_calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

fn orchestrator() -> (RoomOrchestrator<ScriptedSource, StdRng>, Handles) {
    let source = ScriptedSource::default();
    let handles = Handles {
        similar_calls: Arc::clone(&source.similar_calls),
        random_calls: Arc::clone(&source.random_calls),
        failing: Arc::clone(&source.failing),
    };
    let pools = ArtistPools::new(
        source,
        Duration::from_millis(100),
        Duration::from_millis(1500),
        12,
    );
    let orchestrator = RoomOrchestrator::new(pools, StdRng::seed_from_u64(6), DEBOUNCE, 6);
    (orchestrator, handles)
}

fn seeds(names: &[&str]) -> Vec<Artist> {
    names.iter().map(|n| Artist::named(n)).collect()
}

#[tokio::test(start_paused = true)]
async fn initial_load_reaches_ready_with_rooms() {
    let (mut orch, _handles) = orchestrator();
    assert_eq!(orch.phase(), Phase::Idle);

    orch.select_artists(seeds(&["Ottoline", "Sable Coast"])).await;

    assert_eq!(orch.phase(), Phase::Ready);
    assert!(!orch.is_loading());
    assert!(!orch.loading().initial_load);
    assert!((orch.loading().progress - 1.0).abs() < f32::EPSILON);
    assert!(orch.error().is_none());
    assert!(!orch.rooms().is_empty());
    assert!(orch.rooms()[0].is_target_room);
}

#[tokio::test(start_paused = true)]
async fn reordered_selection_does_not_refetch() {
    let (mut orch, handles) = orchestrator();
    orch.select_artists(seeds(&["A", "B", "C"])).await;
    let calls = handles.similar_calls.load(Ordering::SeqCst);

    orch.select_artists(seeds(&["C", "A", "B"])).await;
    assert_eq!(handles.similar_calls.load(Ordering::SeqCst), calls);
    assert_eq!(orch.phase(), Phase::Ready);
}

#[tokio::test(start_paused = true)]
async fn changed_selection_refetches() {
    let (mut orch, handles) = orchestrator();
    orch.select_artists(seeds(&["A", "B"])).await;
    let calls = handles.similar_calls.load(Ordering::SeqCst);

    orch.select_artists(seeds(&["A", "D"])).await;
    assert!(handles.similar_calls.load(Ordering::SeqCst) > calls);
    assert_eq!(orch.phase(), Phase::Ready);
}

#[tokio::test(start_paused = true)]
async fn random_pool_fetched_once_across_selections() {
    let (mut orch, handles) = orchestrator();
    orch.select_artists(seeds(&["A"])).await;
    orch.select_artists(seeds(&["B"])).await;
    assert_eq!(handles.random_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn debounced_regeneration_uses_latest_value() {
    let (mut orch, _handles) = orchestrator();
    orch.select_artists(seeds(&["A"])).await;

    let t0 = Instant::now();
    orch.handle_volume_change(400, None, false, t0);
    orch.handle_volume_change(900, None, false, t0 + Duration::from_millis(100));
    orch.handle_volume_change(1326, Some(80), true, t0 + Duration::from_millis(200));

    // Quiet window counts from the last change.
    assert!(!orch.poll(t0 + Duration::from_millis(450)));
    assert!(orch.poll(t0 + Duration::from_millis(200) + DEBOUNCE));

    let target = &orch.rooms()[0];
    assert!(target.is_target_room);
    assert_eq!(target.volume, 1326);
    assert_eq!(target.similarity, 80);
    assert_eq!(orch.current_volume(), 1326);
}

#[tokio::test(start_paused = true)]
async fn parameter_changes_never_revisit_initial_load() {
    let (mut orch, _handles) = orchestrator();
    orch.select_artists(seeds(&["A"])).await;

    let t0 = Instant::now();
    for (i, v) in [100, 900, 2000, 3100].iter().enumerate() {
        orch.handle_volume_change(*v, None, false, t0 + Duration::from_millis(i as u64 * 50));
        assert_eq!(orch.phase(), Phase::Ready);
        assert!(!orch.loading().initial_load);
    }
    orch.poll(t0 + Duration::from_secs(2));
    assert_eq!(orch.phase(), Phase::Ready);
}

#[tokio::test(start_paused = true)]
async fn negative_similarity_draws_from_random_pool_only() {
    let (mut orch, _handles) = orchestrator();
    orch.select_artists(seeds(&["A", "B"])).await;

    let t0 = Instant::now();
    orch.handle_similarity_change(-1, Some(1500), true, t0);
    assert!(orch.poll(t0 + DEBOUNCE));

    assert!(!orch.rooms().is_empty());
    for room in orch.rooms() {
        for artist in &room.artists {
            assert!(
                artist.name.starts_with("Random"),
                "personalized artist in negative range: {}",
                artist.name
            );
        }
    }
    assert_eq!(orch.current_similarity(), -1);
    assert!(orch.get_similarity_range_info(-1).random_pool);
}

#[tokio::test(start_paused = true)]
async fn total_outage_surfaces_error_and_retry_recovers() {
    let (mut orch, handles) = orchestrator();
    handles.failing.store(true, Ordering::SeqCst);

    orch.select_artists(seeds(&["A"])).await;
    assert_eq!(orch.phase(), Phase::Ready);
    assert!(orch.error().is_some());
    assert!(orch.rooms().is_empty());

    // While the error stands, parameter changes keep the list empty — no
    // seed-only rooms behind an error banner.
    let t0 = Instant::now();
    orch.handle_volume_change(900, None, true, t0);
    assert!(orch.poll(t0 + DEBOUNCE));
    assert!(orch.rooms().is_empty());
    assert!(orch.error().is_some());

    handles.failing.store(false, Ordering::SeqCst);
    orch.regenerate_rooms().await;
    assert!(orch.error().is_none());
    assert!(!orch.rooms().is_empty());
}

#[tokio::test(start_paused = true)]
async fn pause_mid_drag_rebuilds_without_target_room() {
    let (mut orch, _handles) = orchestrator();
    orch.select_artists(seeds(&["A", "B"])).await;

    let t0 = Instant::now();
    orch.handle_volume_change(700, None, false, t0);
    assert!(orch.poll(t0 + DEBOUNCE));
    assert!(!orch.rooms().is_empty());
    assert!(orch.rooms().iter().all(|r| !r.is_target_room));

    // Landing afterwards restores the anchored room.
    orch.handle_volume_change(700, None, true, t0 + DEBOUNCE);
    assert!(orch.poll(t0 + DEBOUNCE + DEBOUNCE));
    assert!(orch.rooms()[0].is_target_room);
    assert_eq!(orch.rooms()[0].volume, 700);
}

#[tokio::test(start_paused = true)]
async fn oversized_selection_is_truncated() {
    let (mut orch, _handles) = orchestrator();
    orch.select_artists(seeds(&["A", "B", "C", "D", "E", "F", "G"])).await;
    assert_eq!(orch.selected_seeds().len(), 5);
}
