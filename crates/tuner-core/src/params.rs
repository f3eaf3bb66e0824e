//! Tuned-parameter state and band indexing.
//!
//! Pure helpers shared by the feed cache, the generator, and any ruler-style
//! display. Nothing in here has side effects; the only mutable thing is
//! `ParameterState`, which is written exclusively by whoever owns the dial.

use serde::{Deserialize, Serialize};

/// Which of the two tunable parameters is receiving input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Volume,
    Similarity,
}

/// Volume axis range and band width.
pub const VOLUME_MIN: i32 = 0;
pub const VOLUME_MAX: i32 = 3200;
pub const VOLUME_BAND_WIDTH: f64 = 300.0;

/// Similarity axis range and band width.  The non-integer width is the
/// original range/6 approximation; band-edge values are best-effort.
pub const SIMILARITY_MIN: i32 = -1000;
pub const SIMILARITY_MAX: i32 = 1000;
pub const SIMILARITY_BAND_WIDTH: f64 = 333.333;
pub const SIMILARITY_BANDS: u32 = 6;

impl Axis {
    pub fn min(&self) -> i32 {
        match self {
            Self::Volume => VOLUME_MIN,
            Self::Similarity => SIMILARITY_MIN,
        }
    }

    pub fn max(&self) -> i32 {
        match self {
            Self::Volume => VOLUME_MAX,
            Self::Similarity => SIMILARITY_MAX,
        }
    }

    pub fn band_width(&self) -> f64 {
        match self {
            Self::Volume => VOLUME_BAND_WIDTH,
            Self::Similarity => SIMILARITY_BAND_WIDTH,
        }
    }

    /// The axis a value diversifies against in a generated window.
    pub fn secondary(&self) -> Axis {
        match self {
            Self::Volume => Self::Similarity,
            Self::Similarity => Self::Volume,
        }
    }

    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min(), self.max())
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::Similarity => "similarity",
        }
    }
}

/// Band index for a value on an axis.  Monotonic non-decreasing in `value`.
///
/// Volume: `floor(v / 300)` → indices 0..=10 over the 0–3200 range.
/// Similarity: `floor((v + 1000) / 333.333)`, pinned into 0..=5 so the exact
/// top edge cannot address a seventh band.
pub fn band_index(axis: Axis, value: i32) -> u32 {
    let v = axis.clamp(value);
    let raw = ((v - axis.min()) as f64 / axis.band_width()).floor() as u32;
    match axis {
        Axis::Volume => raw,
        Axis::Similarity => raw.min(SIMILARITY_BANDS - 1),
    }
}

/// Inclusive-exclusive `[lo, hi)` boundaries of a band, for display.
pub fn band_bounds(axis: Axis, index: u32) -> (f64, f64) {
    let lo = axis.min() as f64 + index as f64 * axis.band_width();
    (lo, lo + axis.band_width())
}

/// Thousands-grouped integer formatting with the sign in front: `-1,234`.
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    let lead = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Evenly spaced tick values around `center` for a ruler display.
/// Deterministic for the same center; values are not clamped so the caller
/// can decide how to render out-of-range ticks at the ends of the dial.
pub fn tick_window(center: i32, spacing: i32, radius: usize) -> Vec<i32> {
    let r = radius as i32;
    (-r..=r).map(|k| center + k * spacing).collect()
}

/// The full tuned state: one value per axis plus which axis the dial drives.
/// Mutated only by the dial's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterState {
    pub volume: i32,
    pub similarity: i32,
    pub active_axis: Axis,
}

impl Default for ParameterState {
    fn default() -> Self {
        Self {
            volume: 1600,
            similarity: 0,
            active_axis: Axis::Volume,
        }
    }
}

impl ParameterState {
    pub fn value(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Volume => self.volume,
            Axis::Similarity => self.similarity,
        }
    }

    /// Set a value on an axis, clamping into range.
    pub fn set_value(&mut self, axis: Axis, value: i32) {
        let v = axis.clamp(value);
        match axis {
            Axis::Volume => self.volume = v,
            Axis::Similarity => self.similarity = v,
        }
    }

    /// Value currently driven by the dial.
    pub fn active_value(&self) -> i32 {
        self.value(self.active_axis)
    }

    pub fn active_band(&self) -> u32 {
        band_index(self.active_axis, self.active_value())
    }
}
