//! Content Provider
//!
//! Two-tier lookup layer in front of the remote catalogue: a bounded
//! in-memory LRU keyed by entity id, backed by the persistent SQLite store.
//! Owns every decision about when to hit the network and when to persist.
//!
//! Persistence that rides on a successful remote fetch is fire-and-forget:
//! the data already exists in memory and is returned regardless, so a store
//! failure is logged and swallowed. Store-only lookups are best-effort and
//! answer with an empty result on store errors.

use crate::catalogue::CatalogueClient;
use crate::error::CirrusResult;
use crate::model::{Album, Artist, Track};
use crate::store::Store;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, warn};

/// Result cap for remote searches, matching the reference daemon.
const SEARCH_LIMIT: usize = 200;

enum CacheEntry {
    Track(Track),
    Album(Album),
}

pub struct ContentProvider {
    catalogue: Arc<dyn CatalogueClient>,
    store: Store,
    /// Recency cache over tracks and albums. Pure accelerator: may be
    /// dropped at any time, the store stays the system of record.
    cache: Mutex<LruCache<String, CacheEntry>>,
    /// Album name -> album id, learned from track search results and
    /// consulted by `find album <name>`.
    album_ids: RwLock<HashMap<String, String>>,
    device_id: String,
}

impl ContentProvider {
    pub fn new(catalogue: Arc<dyn CatalogueClient>, store: Store, capacity: usize, device_id: &str) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least 1");
        Self {
            catalogue,
            store,
            cache: Mutex::new(LruCache::new(capacity)),
            album_ids: RwLock::new(HashMap::new()),
            device_id: device_id.to_string(),
        }
    }

    /// Track by id: memory, then store, then the remote catalogue. A store
    /// hit never touches the network; a remote hit is persisted.
    pub async fn find_track(&self, id: &str) -> CirrusResult<Track> {
        if let Some(track) = self.cached_track(id) {
            debug!("track {} served from memory", id);
            return Ok(track);
        }

        match self.store.track(id) {
            Ok(Some(track)) => {
                debug!("track {} served from store", id);
                self.remember_track(&track);
                return Ok(track);
            }
            Ok(None) => {}
            Err(e) => warn!("store lookup for track {} failed: {}", id, e),
        }

        let track = self.catalogue.track(id).await?;
        if let Err(e) = self.store.upsert_track(&track) {
            warn!("could not persist track {}: {}", id, e);
        }
        self.remember_track(&track);
        Ok(track)
    }

    /// Free-text track search. Always remote: results are query-keyed, not
    /// id-keyed, so they are never served from cache. Every returned track
    /// is persisted and remembered as a side effect.
    pub async fn find_tracks(&self, query: &str) -> CirrusResult<Vec<Track>> {
        let tracks = self.catalogue.search_tracks(query, SEARCH_LIMIT).await?;
        for track in &tracks {
            if let Err(e) = self.store.upsert_track(track) {
                warn!("could not persist track {}: {}", track.file_id(), e);
            }
            self.remember_track(track);
            if !track.album.is_empty() && !track.album_id.is_empty() {
                let mut ids = self.album_ids.write().expect("album id map poisoned");
                ids.insert(track.album.clone(), track.album_id.clone());
            }
        }
        Ok(tracks)
    }

    /// Album by id. Remote unless the memory tier still holds it (album
    /// contents may need the optional track expansion, so there is no
    /// store-only path). The album row is persisted; its nested tracks are
    /// not.
    pub async fn find_album(&self, id: &str, include_tracks: bool) -> CirrusResult<Album> {
        if let Some(album) = self.cached_album(id) {
            debug!("album {} served from memory", id);
            return Ok(album);
        }

        let album = self.catalogue.album(id, include_tracks).await?;
        if let Err(e) = self.store.upsert_album(&album) {
            warn!("could not persist album {}: {}", id, e);
        }
        self.remember_album(&album);
        Ok(album)
    }

    /// Free-text album search, remote, with persistence side effect.
    pub async fn find_albums(&self, query: &str) -> CirrusResult<Vec<Album>> {
        let albums = self.catalogue.search_albums(query, SEARCH_LIMIT).await?;
        for album in &albums {
            if let Err(e) = self.store.upsert_album(album) {
                warn!("could not persist album {}: {}", album.id, e);
            }
        }
        Ok(albums)
    }

    /// The user's own library, remote, with persistence side effect.
    pub async fn user_tracks(&self) -> CirrusResult<Vec<Track>> {
        let tracks = self.catalogue.user_tracks().await?;
        for track in &tracks {
            if let Err(e) = self.store.upsert_track(track) {
                warn!("could not persist track {}: {}", track.file_id(), e);
            }
            self.remember_track(track);
        }
        Ok(tracks)
    }

    /// Distinct artist names from the album store; never remote.
    /// Best-effort: a store failure answers with nothing.
    pub fn list_artists(&self, query: &str) -> Vec<Artist> {
        self.store.artists(query).unwrap_or_else(|e| {
            warn!("artist listing failed: {}", e);
            Vec::new()
        })
    }

    /// Albums for an exact artist name, store only, best-effort.
    pub fn find_albums_by_artist_name(&self, artist: &str) -> Vec<Album> {
        self.store.albums_by_artist(artist).unwrap_or_else(|e| {
            warn!("album listing for '{}' failed: {}", artist, e);
            Vec::new()
        })
    }

    /// Tracks for an exact artist name with an album-name substring filter,
    /// store only, best-effort.
    pub fn find_tracks_by_artist(&self, artist: &str, album: &str) -> Vec<Track> {
        self.store.tracks_by_artist(artist, album).unwrap_or_else(|e| {
            warn!("track listing for '{}' failed: {}", artist, e);
            Vec::new()
        })
    }

    /// Streaming URLs are short-lived: always a remote call, never cached
    /// or persisted.
    pub async fn stream_url(&self, track_id: &str) -> CirrusResult<String> {
        self.catalogue.stream_url(track_id, &self.device_id).await
    }

    /// Album id previously learned for an album name, if any.
    pub fn album_id_for_name(&self, name: &str) -> Option<String> {
        let ids = self.album_ids.read().expect("album id map poisoned");
        ids.get(name).cloned()
    }

    fn cached_track(&self, id: &str) -> Option<Track> {
        let mut cache = self.cache.lock().expect("content cache poisoned");
        match cache.get(id) {
            Some(CacheEntry::Track(track)) => Some(track.clone()),
            _ => None,
        }
    }

    fn cached_album(&self, id: &str) -> Option<Album> {
        let mut cache = self.cache.lock().expect("content cache poisoned");
        match cache.get(id) {
            Some(CacheEntry::Album(album)) => Some(album.clone()),
            _ => None,
        }
    }

    fn remember_track(&self, track: &Track) {
        let key = track.file_id().to_string();
        let mut cache = self.cache.lock().expect("content cache poisoned");
        cache.put(key, CacheEntry::Track(track.clone()));
    }

    fn remember_album(&self, album: &Album) {
        if album.id.is_empty() {
            return;
        }
        let mut cache = self.cache.lock().expect("content cache poisoned");
        cache.put(album.id.clone(), CacheEntry::Album(album.clone()));
    }
}
