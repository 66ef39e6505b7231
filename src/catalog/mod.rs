//! Upstream catalog API: response models and the read-only client used for
//! playlist extraction and track enrichment.

pub mod client;
pub mod models;

pub use client::{CatalogApi, SpotifyClient};
pub use models::{ArtistRef, AudioFeatures, PlaylistPage, Track};
