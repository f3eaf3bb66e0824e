//! Band/station feed generation — "what's tunable near here".
//!
//! The generator synthesises a window of station entries for a band.  The one
//! invariant that matters: when a landed value is supplied, slot 0 carries it
//! on the active axis exactly.  Everything else (names, listener counts,
//! jitter) is cosmetic colour and must not be relied on for correctness.
//!
//! The random source is injected so generation is reproducible in tests.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::params::Axis;

/// Maximum placement attempts per frequency point before giving up.
const MAX_PLACEMENT_ATTEMPTS: usize = 16;

/// Active-axis jitter applied to non-anchored slots.
const VOLUME_JITTER: i32 = 30;
const SIMILARITY_JITTER: i32 = 20;

const STATION_NAMES: &[&str] = &[
    "Night Drift",
    "Low Orbit",
    "Velvet Static",
    "Copper Wire",
    "Afterhours",
    "Cold Signal",
    "Glasshouse",
    "Slow Bloom",
    "Red Antenna",
    "Pale Harbour",
];

const HOUSE_ARTISTS: &[&str] = &[
    "Mirror Choir",
    "Delta Reels",
    "The Quiet Numbers",
    "Fern & Vale",
    "Ottoline",
    "Sable Coast",
];

/// One synthetic station entry in a generated window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub volume: i32,
    pub similarity: i32,
    pub name: String,
    pub listeners: u32,
    pub recommendations: u32,
    pub minutes: u32,
    pub artists: Vec<String>,
}

/// Everything the generator needs for one window.
#[derive(Debug, Clone)]
pub struct WindowRequest<'a> {
    pub active_axis: Axis,
    pub volume: i32,
    pub similarity: i32,
    /// The exact value the user stopped on, if any.  Reproduced verbatim in
    /// slot 0 on the active axis.
    pub landed: Option<i32>,
    /// Candidate secondary-axis values that diversify the window, cycled.
    pub band_frequencies: &'a [i32],
    pub band: u32,
}

pub struct FeedGenerator<R: Rng> {
    rng: R,
    window: usize,
}

impl<R: Rng> FeedGenerator<R> {
    pub fn new(rng: R, window: usize) -> Self {
        Self { rng, window }
    }

    /// Generate a window of stations for a band.
    ///
    /// Slot 0 is anchored to `landed` when present — no jitter, no rounding.
    /// Remaining slots take the active axis from the tuned base value plus
    /// jitter, re-clamped, and the secondary axis from `band_frequencies` in
    /// order, skipping entries that would duplicate the anchored station.
    pub fn generate_window(&mut self, req: &WindowRequest<'_>) -> Vec<Station> {
        let axis = req.active_axis;
        let base = match axis {
            Axis::Volume => req.volume,
            Axis::Similarity => req.similarity,
        };
        let current_secondary = match axis {
            Axis::Volume => req.similarity,
            Axis::Similarity => req.volume,
        };

        let mut stations = Vec::with_capacity(self.window);
        if let Some(landed) = req.landed {
            let st = self.station(axis, landed, current_secondary, req.band, 0);
            stations.push(st);
        }

        let freqs: Vec<i32> = req
            .band_frequencies
            .iter()
            .copied()
            .filter(|f| req.landed.is_none() || *f != current_secondary)
            .collect();
        if freqs.is_empty() {
            return stations;
        }

        let jitter = match axis {
            Axis::Volume => VOLUME_JITTER,
            Axis::Similarity => SIMILARITY_JITTER,
        };
        let mut slot = stations.len();
        for freq in freqs.iter().cycle() {
            if stations.len() >= self.window {
                break;
            }
            let jittered = axis.clamp(base + self.rng.gen_range(-jitter..=jitter));
            stations.push(self.station(axis, jittered, *freq, req.band, slot));
            slot += 1;
        }
        stations
    }

    fn station(
        &mut self,
        axis: Axis,
        active_value: i32,
        secondary_value: i32,
        band: u32,
        slot: usize,
    ) -> Station {
        let (volume, similarity) = match axis {
            Axis::Volume => (active_value, secondary_value),
            Axis::Similarity => (secondary_value, active_value),
        };
        let name = STATION_NAMES[(band as usize + slot) % STATION_NAMES.len()];
        let artist_count = self.rng.gen_range(1..=3);
        let start = self.rng.gen_range(0..HOUSE_ARTISTS.len());
        let artists = (0..artist_count)
            .map(|i| HOUSE_ARTISTS[(start + i) % HOUSE_ARTISTS.len()].to_string())
            .collect();
        Station {
            id: format!("st-{}-{}-{}", axis.label(), band, slot),
            volume,
            similarity,
            name: name.to_string(),
            listeners: self.rng.gen_range(5..800),
            recommendations: self.rng.gen_range(0..60),
            minutes: self.rng.gen_range(5..240),
            artists,
        }
    }
}

/// Collision-avoiding candidate values on an axis, at least `min_separation`
/// apart.  Best effort: each point gets a fixed number of placement attempts
/// and the function may return fewer points than requested; the shortfall is
/// logged, not padded.
pub fn frequency_points<R: Rng>(
    axis: Axis,
    count: usize,
    min_separation: i32,
    rng: &mut R,
) -> Vec<i32> {
    let mut points: Vec<i32> = Vec::with_capacity(count);
    for _ in 0..count {
        let mut placed = false;
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let candidate = rng.gen_range(axis.min()..=axis.max());
            if points
                .iter()
                .all(|p| (p - candidate).abs() >= min_separation)
            {
                points.push(candidate);
                placed = true;
                break;
            }
        }
        if !placed {
            // Keep whatever fit; under-filled windows are accepted behavior.
            warn!(
                "frequency_points: placed {}/{} on {} (min_separation={})",
                points.len(),
                count,
                axis.label(),
                min_separation
            );
            break;
        }
    }
    points
}
