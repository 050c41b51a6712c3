//! Remote Catalogue Boundary
//!
//! The capability the daemon needs from the remote music service, plus the
//! service's wire shapes and their conversions into the domain model. The
//! protocol engine only ever sees `model::Track` / `model::Album`; the
//! JSON shapes stay inside this module.

use crate::error::CirrusResult;
use crate::model::{Album, Track};
use async_trait::async_trait;
use serde::Deserialize;

pub mod rest;

pub use rest::RestCatalogue;

/// What the daemon asks of the remote catalogue service.
#[async_trait]
pub trait CatalogueClient: Send + Sync {
    /// Free-text track search, at most `limit` results, in service order.
    async fn search_tracks(&self, query: &str, limit: usize) -> CirrusResult<Vec<Track>>;

    /// Free-text album search, at most `limit` results, in service order.
    async fn search_albums(&self, query: &str, limit: usize) -> CirrusResult<Vec<Album>>;

    /// Fetch one track by id.
    async fn track(&self, id: &str) -> CirrusResult<Track>;

    /// Fetch one album by id, optionally with its track listing.
    async fn album(&self, id: &str, include_tracks: bool) -> CirrusResult<Album>;

    /// The user's own library tracks.
    async fn user_tracks(&self) -> CirrusResult<Vec<Track>>;

    /// Resolve a short-lived streaming URL for a track. Never cached.
    async fn stream_url(&self, track_id: &str, device_id: &str) -> CirrusResult<String>;
}

/// Track as the service serializes it. Durations arrive as string millis.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTrack {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub nid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default, rename = "albumId")]
    pub album_id: String,
    #[serde(default, rename = "durationMillis")]
    pub duration_millis: String,
}

impl From<RemoteTrack> for Track {
    fn from(remote: RemoteTrack) -> Self {
        // Unparseable durations become 0 rather than failing the lookup.
        let duration_ms = remote.duration_millis.parse().unwrap_or(0);
        Track {
            id: remote.id,
            nid: remote.nid,
            title: remote.title,
            album: remote.album,
            artist: remote.artist,
            album_id: remote.album_id,
            duration_ms,
        }
    }
}

/// Album as the service serializes it.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteAlbum {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub tracks: Vec<RemoteTrack>,
}

impl From<RemoteAlbum> for Album {
    fn from(remote: RemoteAlbum) -> Self {
        Album {
            id: remote.id,
            name: remote.name,
            artist: remote.artist,
            year: remote.year,
            tracks: remote.tracks.into_iter().map(Track::from).collect(),
        }
    }
}
