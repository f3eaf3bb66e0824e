//! Room synthesis from cached artist pools.
//!
//! Rooms are recomputed on every (debounced) parameter change and have no
//! lifecycle beyond the current list; only the artist pools persist.

use rand::Rng;
use serde::Serialize;
use tuner_core::params::{band_index, Axis};

use crate::artist::Artist;

const ROOM_NAMES: &[&str] = &[
    "The Hushed Floor",
    "Wavelength",
    "Back Room B",
    "Sundial Lounge",
    "Echo Court",
    "The Long Fade",
    "Blue Hour",
    "Open Circuit",
];

/// Active-axis spread applied to non-target rooms.
const ROOM_VOLUME_JITTER: i32 = 30;
const ROOM_SIMILARITY_JITTER: i32 = 20;

#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub volume: i32,
    pub similarity: i32,
    pub artists: Vec<Artist>,
    pub listeners: u32,
    /// True for the room whose coordinates exactly match the landed tuning
    /// point.
    pub is_target_room: bool,
}

/// Tuned coordinates for one generation pass.
#[derive(Debug, Clone, Copy)]
pub struct RoomParams {
    pub active_axis: Axis,
    pub volume: i32,
    pub similarity: i32,
    /// True when the active-axis value is a landed value (knob released),
    /// in which case room 0 is anchored to the tuning point exactly.
    pub landed: bool,
}

/// Which artist pool a similarity value selects.
pub fn uses_random_pool(active_axis: Axis, similarity: i32) -> bool {
    active_axis == Axis::Similarity && similarity < 0
}

/// Human-facing characterization of a similarity region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimilarityRangeInfo {
    pub band: u32,
    pub label: &'static str,
    pub random_pool: bool,
}

pub fn similarity_range_info(value: i32) -> SimilarityRangeInfo {
    let band = band_index(Axis::Similarity, value);
    let (label, random_pool) = if value < 0 {
        ("away from your taste", true)
    } else if band <= 3 {
        ("loosely related", false)
    } else if band == 4 {
        ("close to your taste", false)
    } else {
        ("right in your lane", false)
    };
    SimilarityRangeInfo {
        band,
        label,
        random_pool,
    }
}

/// Build the room list for the current tuning point.
///
/// Similarity mode with a negative value draws exclusively from the random
/// pool — seed artists are intentionally excluded there.  Volume mode and
/// non-negative similarity draw from seeds + related.  An empty source pool
/// yields an empty list; the orchestrator decides on fallback.
pub fn build_rooms<R: Rng>(
    params: &RoomParams,
    seeds: &[Artist],
    related: &[Artist],
    random_pool: &[Artist],
    count: usize,
    rng: &mut R,
) -> Vec<Room> {
    let pool: Vec<&Artist> = if uses_random_pool(params.active_axis, params.similarity) {
        random_pool.iter().collect()
    } else {
        seeds.iter().chain(related.iter()).collect()
    };
    if pool.is_empty() {
        return Vec::new();
    }

    let active_value = match params.active_axis {
        Axis::Volume => params.volume,
        Axis::Similarity => params.similarity,
    };
    let band = band_index(params.active_axis, active_value);

    let mut rooms = Vec::with_capacity(count);
    for slot in 0..count {
        let anchored = params.landed && slot == 0;
        let (volume, similarity) = if anchored {
            (params.volume, params.similarity)
        } else {
            (
                Axis::Volume.clamp(params.volume + rng.gen_range(-ROOM_VOLUME_JITTER..=ROOM_VOLUME_JITTER)),
                Axis::Similarity
                    .clamp(params.similarity + rng.gen_range(-ROOM_SIMILARITY_JITTER..=ROOM_SIMILARITY_JITTER)),
            )
        };

        let take = rng.gen_range(2..=4usize).min(pool.len());
        let start = rng.gen_range(0..pool.len());
        let artists = (0..take)
            .map(|i| pool[(start + i) % pool.len()].clone())
            .collect();

        rooms.push(Room {
            id: format!("room-{}-{}", band, slot),
            name: ROOM_NAMES[slot % ROOM_NAMES.len()].to_string(),
            volume,
            similarity,
            artists,
            listeners: rng.gen_range(2..120),
            is_target_room: anchored,
        });
    }
    rooms
}
