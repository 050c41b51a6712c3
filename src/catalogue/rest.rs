//! REST Catalogue Client
//!
//! JSON/HTTP implementation of [`CatalogueClient`]. Transport failures are
//! retried a bounded number of times with a short backoff; anything else is
//! surfaced to the caller untouched.

use super::{CatalogueClient, RemoteAlbum, RemoteTrack};
use crate::error::{CirrusError, CirrusResult};
use crate::model::{Album, Track};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

const MAX_RETRIES: usize = 3;

pub struct RestCatalogue {
    client: Client,
    base_url: String,
    access_token: String,
}

impl RestCatalogue {
    pub fn new(base_url: &str, access_token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> CirrusResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("catalogue request: {} {:?}", url, query);

        for attempt in 0..MAX_RETRIES {
            let request = self
                .client
                .get(&url)
                .bearer_auth(&self.access_token)
                .query(query);

            match request.send().await {
                Ok(resp) => {
                    if resp.status() == reqwest::StatusCode::NOT_FOUND {
                        return Err(CirrusError::NotFound(path.to_string()));
                    }
                    let resp = resp.error_for_status()?;
                    return Ok(resp.json().await?);
                }
                Err(e) if attempt < MAX_RETRIES - 1 => {
                    warn!(
                        "catalogue retry {}/{} for '{}': {}",
                        attempt + 1,
                        MAX_RETRIES,
                        path,
                        e
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(CirrusError::Catalogue(format!(
            "request for '{}' failed after {} retries",
            path, MAX_RETRIES
        )))
    }
}

#[derive(Deserialize)]
struct TracksResponse {
    #[serde(default)]
    tracks: Vec<RemoteTrack>,
}

#[derive(Deserialize)]
struct AlbumsResponse {
    #[serde(default)]
    albums: Vec<RemoteAlbum>,
}

#[derive(Deserialize)]
struct StreamResponse {
    url: String,
}

#[async_trait]
impl CatalogueClient for RestCatalogue {
    async fn search_tracks(&self, query: &str, limit: usize) -> CirrusResult<Vec<Track>> {
        let limit = limit.to_string();
        let resp: TracksResponse = self
            .get_json("tracks/search", &[("q", query), ("limit", &limit)])
            .await?;
        Ok(resp.tracks.into_iter().map(Track::from).collect())
    }

    async fn search_albums(&self, query: &str, limit: usize) -> CirrusResult<Vec<Album>> {
        let limit = limit.to_string();
        let resp: AlbumsResponse = self
            .get_json("albums/search", &[("q", query), ("limit", &limit)])
            .await?;
        Ok(resp.albums.into_iter().map(Album::from).collect())
    }

    async fn track(&self, id: &str) -> CirrusResult<Track> {
        let path = format!("tracks/{}", urlencoding::encode(id));
        let remote: RemoteTrack = self.get_json(&path, &[]).await?;
        Ok(remote.into())
    }

    async fn album(&self, id: &str, include_tracks: bool) -> CirrusResult<Album> {
        let path = format!("albums/{}", urlencoding::encode(id));
        let tracks = if include_tracks { "1" } else { "0" };
        let remote: RemoteAlbum = self.get_json(&path, &[("tracks", tracks)]).await?;
        Ok(remote.into())
    }

    async fn user_tracks(&self) -> CirrusResult<Vec<Track>> {
        let resp: TracksResponse = self.get_json("library/tracks", &[]).await?;
        Ok(resp.tracks.into_iter().map(Track::from).collect())
    }

    async fn stream_url(&self, track_id: &str, device_id: &str) -> CirrusResult<String> {
        let path = format!("tracks/{}/stream", urlencoding::encode(track_id));
        let resp: StreamResponse = self.get_json(&path, &[("device", device_id)]).await?;
        Ok(resp.url)
    }
}
