//! Artist pool caches — fetch once, reuse across every dial movement.
//!
//! Two pools feed room generation: a related-artist pool keyed by the seed
//! selection (order-independent), and one global random-genre pool.  Both
//! are fetched through `ArtistSource` and cached as `Arc` slices; after that,
//! regeneration is pure in-memory work.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::artist::Artist;
use crate::client::{ArtistSource, FetchError};

/// Cache key for a seed selection: the sorted, case-folded name set.
/// `[A, B, C]` and `[C, A, B]` produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionKey(Vec<String>);

impl SelectionKey {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut set: Vec<String> = names.into_iter().map(|n| n.to_lowercase()).collect();
        set.sort();
        set.dedup();
        Self(set)
    }

    pub fn from_artists(artists: &[Artist]) -> Self {
        Self::new(artists.iter().map(|a| a.name.as_str()))
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct ArtistPools<S: ArtistSource> {
    source: S,
    related: HashMap<SelectionKey, Arc<Vec<Artist>>>,
    random: Option<Arc<Vec<Artist>>>,
    throttle_min: Duration,
    throttle_max: Duration,
    random_pool_size: usize,
}

impl<S: ArtistSource> ArtistPools<S> {
    pub fn new(
        source: S,
        throttle_min: Duration,
        throttle_max: Duration,
        random_pool_size: usize,
    ) -> Self {
        Self {
            source,
            related: HashMap::new(),
            random: None,
            throttle_min,
            throttle_max,
            random_pool_size,
        }
    }

    /// Related-artist pool for a seed selection.  Cached per distinct
    /// (order-independent) name set; re-selecting the same artists in a
    /// different order does not refetch.
    ///
    /// Detail resolution is a sequential loop with a randomized delay
    /// between requests, throttling for third-party rate limits.  A failure
    /// for one artist is logged and skipped; the pool degrades to whatever
    /// subset succeeded.
    pub async fn related_for(
        &mut self,
        seeds: &[Artist],
        mut on_progress: impl FnMut(f32),
    ) -> Result<Arc<Vec<Artist>>, FetchError> {
        let key = SelectionKey::from_artists(seeds);
        if let Some(pool) = self.related.get(&key) {
            debug!("related pool cache hit for {:?}", key);
            on_progress(1.0);
            return Ok(Arc::clone(pool));
        }

        let seed_names: Vec<String> = seeds.iter().map(|a| a.name.clone()).collect();
        let names = self.source.similar_artists(&seed_names).await?;
        info!(
            "resolving {} related artists for {} seeds",
            names.len(),
            seeds.len()
        );

        let mut artists = Vec::with_capacity(names.len());
        let total = names.len().max(1);
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.throttle_delay()).await;
            }
            match self.source.artist_details(name).await {
                Ok(artist) => artists.push(artist),
                Err(e) => warn!("detail fetch failed for '{}', skipping: {}", name, e),
            }
            on_progress((i + 1) as f32 / total as f32);
        }
        if artists.len() < names.len() {
            warn!(
                "related pool degraded: {}/{} artists resolved",
                artists.len(),
                names.len()
            );
        }

        let pool = Arc::new(artists);
        self.related.insert(key, Arc::clone(&pool));
        Ok(pool)
    }

    /// Global random-genre pool, fetched once and reused for every
    /// negative-similarity generation.
    pub async fn random_pool(&mut self) -> Result<Arc<Vec<Artist>>, FetchError> {
        if let Some(pool) = &self.random {
            return Ok(Arc::clone(pool));
        }
        let artists = self.source.random_artists(self.random_pool_size).await?;
        info!("random pool fetched: {} artists", artists.len());
        let pool = Arc::new(artists);
        self.random = Some(Arc::clone(&pool));
        Ok(pool)
    }

    pub fn cached_selections(&self) -> usize {
        self.related.len()
    }

    fn throttle_delay(&self) -> Duration {
        let min = self.throttle_min.as_millis() as u64;
        let max = self.throttle_max.as_millis() as u64;
        if max <= min {
            return self.throttle_min;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}
