//! Tuning-to-content engine core.
//!
//! Converts continuous dial input into a stable discrete band, and caches
//! the expensive regeneration of the station window for that band behind an
//! idle debounce.  Pure and synchronous: no network, no runtime.  The
//! network-facing room orchestration lives in the `room-feed` crate.

pub mod cache;
pub mod config;
pub mod dial;
pub mod feed;
pub mod params;
pub mod timer;
