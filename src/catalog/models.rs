//! Serde models for upstream catalog responses.
//!
//! Fields the upstream may omit or null out (local-only tracks, removed
//! content) are modeled as `Option` so a partial response never fails
//! deserialization of the whole page.

use serde::Deserialize;

/// One page of a playlist's track listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistPage {
    pub items: Vec<PlaylistItem>,
    /// Cursor URL of the following page; `None` on the last page.
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    /// Missing for entries whose content has been removed from the catalog.
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    /// `None` for local-only tracks, which cannot be enriched.
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

/// Reference to an artist; only ever used as a lookup key into genre data.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistRef {
    pub id: Option<String>,
    pub name: String,
}

/// Envelope of the batched audio-features endpoint. Entries are positional
/// per the requested ids and null for ids the upstream could not resolve.
#[derive(Debug, Deserialize)]
pub struct AudioFeaturesBatch {
    #[serde(default)]
    pub audio_features: Vec<Option<AudioFeatures>>,
}

/// Derived audio attributes, keyed 1:1 by track id.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioFeatures {
    pub danceability: f64,
    pub energy: f64,
    pub key: i64,
    pub loudness: f64,
    pub mode: i64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub uri: String,
    pub track_href: String,
    pub analysis_url: String,
    pub duration_ms: i64,
    pub time_signature: i64,
}

/// Subset of the per-artist lookup response we care about.
#[derive(Debug, Deserialize)]
pub struct ArtistDetail {
    #[serde(default)]
    pub genres: Vec<String>,
}
