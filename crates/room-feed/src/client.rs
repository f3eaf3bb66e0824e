//! External artist-source contract and its HTTP implementation.
//!
//! The engine only depends on the `ArtistSource` trait; the concrete client
//! speaks an audioscrobbler-style JSON API.  Response shapes are tolerant:
//! missing or malformed fields degrade to empty values, never to a crash.

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::artist::{usable_image, Artist};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response: {0}")]
    Decode(String),
}

/// The three lookups the room pipeline needs from the outside world.
pub trait ArtistSource {
    /// Names of artists musically similar to the given seeds.
    fn similar_artists(
        &self,
        seeds: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<String>, FetchError>> + Send;

    /// Full metadata (image, genres) for one artist name.
    fn artist_details(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Artist, FetchError>> + Send;

    /// Artists independent of any seed, for the no-personalization path.
    fn random_artists(
        &self,
        count: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Artist>, FetchError>> + Send;
}

// ── HTTP client ───────────────────────────────────────────────────────────────

pub struct AudioScrobblerClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Tags sampled for the random-genre pool.
const RANDOM_TAGS: &[&str] = &[
    "ambient", "techno", "folk", "jazz", "dub", "post-punk", "soul", "drone",
];

impl AudioScrobblerClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        extra: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let mut params = vec![
            ("method", method),
            ("api_key", self.api_key.as_str()),
            ("format", "json"),
        ];
        params.extend_from_slice(extra);

        let response = self
            .http
            .get(&self.base_url)
            .query(&params)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

// Response shapes.  Everything optional or defaulted: the services involved
// omit fields freely.

#[derive(Debug, Deserialize)]
struct SimilarResponse {
    #[serde(rename = "similarartists")]
    similar_artists: Option<SimilarList>,
}

#[derive(Debug, Deserialize)]
struct SimilarList {
    #[serde(default)]
    artist: Vec<NamedEntry>,
}

#[derive(Debug, Deserialize)]
struct NamedEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct InfoResponse {
    artist: Option<InfoArtist>,
}

#[derive(Debug, Deserialize)]
struct InfoArtist {
    name: String,
    #[serde(default)]
    image: Vec<ImageEntry>,
    #[serde(default)]
    tags: Option<TagList>,
}

#[derive(Debug, Deserialize)]
struct ImageEntry {
    #[serde(rename = "#text", default)]
    url: String,
    #[serde(default)]
    size: String,
}

#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    tag: Vec<NamedEntry>,
}

#[derive(Debug, Deserialize)]
struct TopArtistsResponse {
    #[serde(rename = "topartists")]
    top_artists: Option<TopArtistsList>,
}

#[derive(Debug, Deserialize)]
struct TopArtistsList {
    #[serde(default)]
    artist: Vec<NamedEntry>,
}

impl ArtistSource for AudioScrobblerClient {
    /// Union of per-seed similarity lookups, de-duplicated, seed order
    /// preserved.  A failure for one seed is logged and skipped so the other
    /// seeds still contribute.
    async fn similar_artists(&self, seeds: &[String]) -> Result<Vec<String>, FetchError> {
        let mut names: Vec<String> = Vec::new();
        let mut failures = 0usize;
        for seed in seeds {
            let result: Result<SimilarResponse, FetchError> = self
                .get_json("artist.getsimilar", &[("artist", seed.as_str()), ("limit", "20")])
                .await;
            match result {
                Ok(resp) => {
                    for entry in resp.similar_artists.map(|l| l.artist).unwrap_or_default() {
                        if !names.iter().any(|n| n.eq_ignore_ascii_case(&entry.name)) {
                            names.push(entry.name);
                        }
                    }
                }
                Err(e) => {
                    warn!("similar lookup failed for '{}': {}", seed, e);
                    failures += 1;
                }
            }
        }
        if !seeds.is_empty() && failures == seeds.len() {
            return Err(FetchError::Decode(
                "no similarity lookup succeeded".to_string(),
            ));
        }
        Ok(names)
    }

    async fn artist_details(&self, name: &str) -> Result<Artist, FetchError> {
        let resp: InfoResponse = self
            .get_json("artist.getinfo", &[("artist", name)])
            .await?;
        let info = resp
            .artist
            .ok_or_else(|| FetchError::Decode(format!("no artist block for '{}'", name)))?;

        // Prefer a large image, fall back to any; placeholders count as none.
        let image = info
            .image
            .iter()
            .filter(|img| matches!(img.size.as_str(), "large" | "extralarge" | "mega"))
            .chain(info.image.iter().rev())
            .find_map(|img| usable_image(Some(&img.url)))
            .unwrap_or_default();

        let genres = info
            .tags
            .map(|t| t.tag.into_iter().map(|g| g.name).collect())
            .unwrap_or_default();

        Ok(Artist {
            id: info.name.to_lowercase().replace(' ', "-"),
            name: info.name,
            image,
            genres,
        })
    }

    async fn random_artists(&self, count: usize) -> Result<Vec<Artist>, FetchError> {
        use rand::seq::SliceRandom;
        let tag = RANDOM_TAGS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("ambient");
        let limit = count.to_string();
        let resp: TopArtistsResponse = self
            .get_json("tag.gettopartists", &[("tag", tag), ("limit", limit.as_str())])
            .await?;
        let artists = resp
            .top_artists
            .map(|l| l.artist)
            .unwrap_or_default()
            .into_iter()
            .take(count)
            .map(|e| {
                let mut a = Artist::named(&e.name);
                a.genres = vec![tag.to_string()];
                a
            })
            .collect();
        Ok(artists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similar_response_tolerates_missing_block() {
        let resp: SimilarResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.similar_artists.is_none());

        let resp: SimilarResponse =
            serde_json::from_str(r#"{"similarartists":{"artist":[{"name":"Ottoline"}]}}"#)
                .unwrap();
        assert_eq!(resp.similar_artists.unwrap().artist[0].name, "Ottoline");
    }

    #[test]
    fn test_info_response_shape() {
        let raw = r##"{
            "artist": {
                "name": "Sable Coast",
                "image": [
                    {"#text": "https://cdn.example.com/s.jpg", "size": "small"},
                    {"#text": "https://cdn.example.com/l.jpg", "size": "large"}
                ],
                "tags": {"tag": [{"name": "ambient"}]}
            }
        }"##;
        let resp: InfoResponse = serde_json::from_str(raw).unwrap();
        let artist = resp.artist.unwrap();
        assert_eq!(artist.name, "Sable Coast");
        assert_eq!(artist.image.len(), 2);
        assert_eq!(artist.tags.unwrap().tag[0].name, "ambient");
    }
}
