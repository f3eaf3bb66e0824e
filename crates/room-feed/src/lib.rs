//! Room feed — turns a seed-artist selection plus the tuned parameters into
//! the list of joinable rooms, with all network fetches cached and all
//! regeneration debounced.

pub mod artist;
pub mod client;
pub mod orchestrator;
pub mod pool;
pub mod rooms;

pub use artist::Artist;
pub use client::{ArtistSource, AudioScrobblerClient, FetchError};
pub use orchestrator::{LoadingState, Phase, RoomOrchestrator};
pub use pool::ArtistPools;
pub use rooms::{similarity_range_info, Room};
