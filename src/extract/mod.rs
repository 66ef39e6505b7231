//! Playlist extraction and per-track enrichment.
//!
//! `PlaylistExtractor` walks the playlist's pages to completion;
//! `FeatureEnricher` resolves audio features (batched, 50 ids per call) and
//! genres (per-artist lookups, memoized within the run) for every track.
//!
//! The output is one ordered `TrackRecord` per track rather than parallel
//! arrays, so a track whose features could not be resolved simply carries
//! `features: None` and can never drift out of alignment with its name,
//! artist, or genre data.

pub mod batch;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::client::CatalogApi;
use crate::catalog::models::{AudioFeatures, Track};
use crate::error::PipelineError;

/// Upstream cap on ids per audio-features call.
pub const FEATURE_BATCH_SIZE: usize = 50;

/// One playlist track with everything the feature table needs, in playlist
/// order.
#[derive(Debug, Clone)]
pub struct TrackRecord {
    pub id: Option<String>,
    pub name: String,
    /// Display name of the primary (first-listed) artist.
    pub artist: String,
    /// `None` when the upstream had no well-formed feature object for this
    /// track; such records are excluded at table build time.
    pub features: Option<AudioFeatures>,
    /// Union of the genres of all this track's artists, in artist order,
    /// duplicates kept. Possibly empty, never absent.
    pub genres: Vec<String>,
}

pub struct PlaylistExtractor {
    api: Arc<dyn CatalogApi>,
}

impl PlaylistExtractor {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self { api }
    }

    /// Fetch every page of the playlist's track listing, in order. Any page
    /// failure aborts the run; there is no partial-result fallback.
    pub async fn extract(&self, playlist_id: &str) -> Result<Vec<Track>, PipelineError> {
        let mut tracks = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            let page = self
                .api
                .playlist_page(playlist_id, cursor.as_deref())
                .await
                .map_err(|source| PipelineError::Request {
                    context: format!("playlist page {} of {}", page_count + 1, playlist_id),
                    source,
                })?;
            page_count += 1;

            for item in page.items {
                // Entries whose content was removed from the catalog have no
                // track payload; skip them.
                if let Some(track) = item.track {
                    tracks.push(track);
                }
            }

            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        info!(
            "Extracted {} track(s) from {} page(s) of playlist {}",
            tracks.len(),
            page_count,
            playlist_id
        );
        Ok(tracks)
    }
}

pub struct FeatureEnricher {
    api: Arc<dyn CatalogApi>,
}

impl FeatureEnricher {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self { api }
    }

    /// Resolve audio features and genres for the extracted tracks, producing
    /// one record per track in the original order.
    ///
    /// A failed feature batch is fatal. A null entry within a batch response
    /// and a failed per-artist genre lookup are recovered locally (missing
    /// feature set, empty genre list respectively).
    pub async fn enrich(&self, tracks: &[Track]) -> Result<Vec<TrackRecord>, PipelineError> {
        let ids: Vec<String> = tracks.iter().filter_map(|t| t.id.clone()).collect();

        let mut features: HashMap<String, AudioFeatures> = HashMap::new();
        let mut dropped = 0usize;
        for chunk in batch::batches(&ids, FEATURE_BATCH_SIZE) {
            let resolved = self.api.audio_features(chunk).await.map_err(|source| {
                PipelineError::Request {
                    context: format!("audio-features batch of {} id(s)", chunk.len()),
                    source,
                }
            })?;
            for entry in resolved {
                match entry {
                    Some(f) => {
                        features.insert(f.id.clone(), f);
                    }
                    None => dropped += 1,
                }
            }
        }
        if dropped > 0 {
            warn!(
                "{} track(s) had no well-formed feature object and will be excluded",
                dropped
            );
        }

        // Many tracks share artists; fetch each artist's genres once per run.
        let mut genre_cache: HashMap<String, Vec<String>> = HashMap::new();

        let mut records = Vec::with_capacity(tracks.len());
        for track in tracks {
            let mut genres = Vec::new();
            for artist in &track.artists {
                let Some(artist_id) = &artist.id else {
                    continue;
                };
                let artist_genres = match genre_cache.get(artist_id) {
                    Some(cached) => cached.clone(),
                    None => {
                        let fetched = match self.api.artist_genres(artist_id).await {
                            Ok(g) => g,
                            Err(e) => {
                                warn!("Genre lookup failed for artist {}: {}", artist_id, e);
                                Vec::new()
                            }
                        };
                        genre_cache.insert(artist_id.clone(), fetched.clone());
                        fetched
                    }
                };
                genres.extend(artist_genres);
            }

            let feature_set = track.id.as_ref().and_then(|id| features.get(id).cloned());
            records.push(TrackRecord {
                id: track.id.clone(),
                name: track.name.clone(),
                artist: track
                    .artists
                    .first()
                    .map(|a| a.name.clone())
                    .unwrap_or_default(),
                features: feature_set,
                genres,
            });
        }

        info!(
            "Enriched {} record(s) ({} with a resolved feature set)",
            records.len(),
            records.iter().filter(|r| r.features.is_some()).count()
        );
        Ok(records)
    }
}
