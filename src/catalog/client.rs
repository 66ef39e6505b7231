//! HTTP client for the upstream catalog API.
//!
//! Authentication uses the client-credentials flow; the bearer token is
//! obtained once at connect time so credential problems surface before any
//! pipeline side effects.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::models::{ArtistDetail, AudioFeatures, AudioFeaturesBatch, PlaylistPage};
use crate::config::CatalogSettings;
use crate::error::PipelineError;

const API_BASE: &str = "https://api.spotify.com/v1";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Read access to the upstream catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch one page of a playlist's track listing. `cursor` is the `next`
    /// URL of the previous page; `None` requests the first page.
    async fn playlist_page(
        &self,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> Result<PlaylistPage>;

    /// Batched audio-feature lookup. The upstream accepts at most 50 ids per
    /// call; entries come back in request order, null for unresolvable ids.
    async fn audio_features(&self, ids: &[String]) -> Result<Vec<Option<AudioFeatures>>>;

    /// Genres attributed to a single artist.
    async fn artist_genres(&self, artist_id: &str) -> Result<Vec<String>>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct SpotifyClient {
    client: Client,
    token: String,
}

impl SpotifyClient {
    /// Authenticate and return a ready client.
    pub async fn connect(settings: &CatalogSettings) -> Result<Self, PipelineError> {
        let connect_err = |source: anyhow::Error| PipelineError::Connect {
            service: "catalog",
            source,
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| connect_err(e.into()))?;

        let response = client
            .post(TOKEN_URL)
            .basic_auth(&settings.client_id, Some(&settings.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| connect_err(e.into()))?;

        if !response.status().is_success() {
            return Err(connect_err(anyhow!(
                "token request failed with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| connect_err(e.into()))?;

        Ok(Self {
            client,
            token: token.access_token,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "catalog request failed with status {}",
                response.status()
            ));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CatalogApi for SpotifyClient {
    async fn playlist_page(
        &self,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> Result<PlaylistPage> {
        let url = match cursor {
            Some(next) => next.to_string(),
            None => format!("{}/playlists/{}/tracks", API_BASE, playlist_id),
        };
        self.get_json(&url).await
    }

    async fn audio_features(&self, ids: &[String]) -> Result<Vec<Option<AudioFeatures>>> {
        let url = format!("{}/audio-features?ids={}", API_BASE, ids.join(","));
        let batch: AudioFeaturesBatch = self.get_json(&url).await?;
        Ok(batch.audio_features)
    }

    async fn artist_genres(&self, artist_id: &str) -> Result<Vec<String>> {
        let url = format!("{}/artists/{}", API_BASE, artist_id);
        let artist: ArtistDetail = self.get_json(&url).await?;
        Ok(artist.genres)
    }
}
