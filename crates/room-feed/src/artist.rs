//! Artist data shared across the room pipeline.

use serde::{Deserialize, Serialize};

/// Seed selections are capped; anything beyond this is ignored.
pub const MAX_SEED_ARTISTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    /// Empty when no usable image was found.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl Artist {
    pub fn named(name: &str) -> Self {
        Self {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            image: String::new(),
            genres: Vec::new(),
        }
    }
}

/// Known fallback/placeholder image URLs served by artist metadata APIs.
/// Entries carrying one of these are treated as having no image at all.
pub fn is_placeholder_image(url: &str) -> bool {
    if url.trim().is_empty() {
        return true;
    }
    // The well-known grey-star placeholder hash, plus generic default paths.
    url.contains("2a96cbd8b46e442fc41c2b86b821562f")
        || url.contains("/noimage/")
        || url.ends_with("default.png")
}

/// Normalise an image URL from a third-party response: placeholders and
/// blanks become None instead of propagating junk into rooms.
pub fn usable_image(url: Option<&str>) -> Option<String> {
    let url = url?.trim();
    if is_placeholder_image(url) {
        None
    } else {
        Some(url.to_string())
    }
}
