//! In-memory stand-in for the remote catalogue service.

use async_trait::async_trait;
use cirrus::catalogue::CatalogueClient;
use cirrus::error::{CirrusError, CirrusResult};
use cirrus::model::{Album, Track};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub struct MockCatalogue {
    tracks: Mutex<HashMap<String, Track>>,
    albums: Mutex<HashMap<String, Album>>,
    search_results: Mutex<Vec<Track>>,
    album_search_results: Mutex<Vec<Album>>,
    library: Mutex<Vec<Track>>,
    /// When set, every remote call fails like a network outage.
    offline: AtomicBool,
    pub track_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub stream_calls: AtomicUsize,
}

impl MockCatalogue {
    pub fn new() -> Self {
        Self {
            tracks: Mutex::new(HashMap::new()),
            albums: Mutex::new(HashMap::new()),
            search_results: Mutex::new(Vec::new()),
            album_search_results: Mutex::new(Vec::new()),
            library: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
            track_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
        }
    }

    pub fn add_track(&self, track: Track) {
        self.tracks
            .lock()
            .unwrap()
            .insert(track.file_id().to_string(), track);
    }

    pub fn add_album(&self, album: Album) {
        self.albums
            .lock()
            .unwrap()
            .insert(album.id.clone(), album);
    }

    /// What the next track searches will return.
    pub fn set_search_results(&self, tracks: Vec<Track>) {
        *self.search_results.lock().unwrap() = tracks;
    }

    pub fn set_album_search_results(&self, albums: Vec<Album>) {
        *self.album_search_results.lock().unwrap() = albums;
    }

    pub fn set_library(&self, tracks: Vec<Track>) {
        *self.library.lock().unwrap() = tracks;
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> CirrusResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(CirrusError::Catalogue("mock catalogue offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CatalogueClient for MockCatalogue {
    async fn search_tracks(&self, _query: &str, limit: usize) -> CirrusResult<Vec<Track>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let results = self.search_results.lock().unwrap();
        Ok(results.iter().take(limit).cloned().collect())
    }

    async fn search_albums(&self, _query: &str, limit: usize) -> CirrusResult<Vec<Album>> {
        self.check_online()?;
        let results = self.album_search_results.lock().unwrap();
        Ok(results.iter().take(limit).cloned().collect())
    }

    async fn track(&self, id: &str) -> CirrusResult<Track> {
        self.track_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.tracks
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| CirrusError::NotFound(format!("track {}", id)))
    }

    async fn album(&self, id: &str, include_tracks: bool) -> CirrusResult<Album> {
        self.check_online()?;
        let mut album = self
            .albums
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| CirrusError::NotFound(format!("album {}", id)))?;
        if !include_tracks {
            album.tracks.clear();
        }
        Ok(album)
    }

    async fn user_tracks(&self) -> CirrusResult<Vec<Track>> {
        self.check_online()?;
        Ok(self.library.lock().unwrap().clone())
    }

    async fn stream_url(&self, track_id: &str, device_id: &str) -> CirrusResult<String> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(format!("http://mock/stream/{}?device={}", track_id, device_id))
    }
}

/// Shorthand for building test tracks.
pub fn track(id: &str, title: &str, artist: &str, album: &str, album_id: &str, secs: u64) -> Track {
    Track {
        id: id.to_string(),
        nid: String::new(),
        title: title.to_string(),
        album: album.to_string(),
        artist: artist.to_string(),
        album_id: album_id.to_string(),
        duration_ms: secs * 1000,
    }
}
