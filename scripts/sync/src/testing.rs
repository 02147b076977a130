//! In-memory fakes for the two external collaborators, used by the
//! unit tests only.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;

use crate::error::SyncError;
use crate::firestore::{DocumentStore, FieldValue, Fields, StoredDocument};
use crate::models::{Album, Artist, PlaylistStub, TrackArtist};
use crate::paginate::Page;
use crate::spotify::MusicCatalog;

// ---------------------------------------------------------------------------
// Model shorthands
// ---------------------------------------------------------------------------

pub fn artist(id: &str, name: &str) -> Artist {
    Artist {
        spotify_id: id.to_string(),
        name: name.to_string(),
        cover_image_url: None,
        created_at: Utc::now(),
    }
}

pub fn album(id: &str, name: &str, artist_id: &str, artist_name: &str) -> Album {
    Album {
        spotify_id: id.to_string(),
        name: name.to_string(),
        artist: artist_name.to_string(),
        artist_spotify_id: artist_id.to_string(),
        cover_image_url: None,
        created_at: Utc::now(),
    }
}

pub fn track(artists: &[(&str, &str)]) -> Option<Vec<TrackArtist>> {
    Some(
        artists
            .iter()
            .map(|(id, name)| TrackArtist {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Scripted catalog
// ---------------------------------------------------------------------------

type PageScript<T> = Mutex<VecDeque<Result<Page<T>, SyncError>>>;

fn script_pages<T>(pages: Vec<Vec<T>>) -> VecDeque<Result<Page<T>, SyncError>> {
    let n = pages.len();
    pages
        .into_iter()
        .enumerate()
        .map(|(i, items)| {
            Ok(Page {
                items,
                next: if i + 1 < n {
                    Some((i + 1).to_string())
                } else {
                    None
                },
            })
        })
        .collect()
}

fn take_page<T>(script: &PageScript<T>) -> Result<Page<T>, SyncError> {
    script
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| {
            Ok(Page {
                items: Vec::new(),
                next: None,
            })
        })
}

/// A `MusicCatalog` that replays pre-scripted pages in order, ignoring
/// cursors, and records which operations were called.
#[derive(Default)]
pub struct ScriptedCatalog {
    artists: PageScript<Artist>,
    albums: PageScript<Album>,
    playlists: PageScript<PlaylistStub>,
    tracks: Mutex<HashMap<String, VecDeque<Result<Page<Option<Vec<TrackArtist>>>, SyncError>>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedCatalog {
    pub fn set_artists(&self, pages: Vec<Vec<Artist>>) {
        *self.artists.lock().unwrap() = script_pages(pages);
    }

    pub fn set_albums(&self, pages: Vec<Vec<Album>>) {
        *self.albums.lock().unwrap() = script_pages(pages);
    }

    pub fn set_playlists(&self, pages: Vec<Vec<PlaylistStub>>) {
        *self.playlists.lock().unwrap() = script_pages(pages);
    }

    pub fn set_playlist_tracks(&self, playlist_id: &str, pages: Vec<Vec<Option<Vec<TrackArtist>>>>) {
        self.tracks
            .lock()
            .unwrap()
            .insert(playlist_id.to_string(), script_pages(pages));
    }

    /// Full control over a playlist's track pages, failures included.
    pub fn set_playlist_tracks_script(
        &self,
        playlist_id: &str,
        script: Vec<Result<Page<Option<Vec<TrackArtist>>>, SyncError>>,
    ) {
        self.tracks
            .lock()
            .unwrap()
            .insert(playlist_id.to_string(), script.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str) {
        self.calls.lock().unwrap().push(op.to_string());
    }
}

#[async_trait]
impl MusicCatalog for ScriptedCatalog {
    async fn followed_artists_page(
        &self,
        _cursor: Option<String>,
    ) -> Result<Page<Artist>, SyncError> {
        self.record("followed_artists");
        take_page(&self.artists)
    }

    async fn saved_albums_page(&self, _cursor: Option<String>) -> Result<Page<Album>, SyncError> {
        self.record("saved_albums");
        take_page(&self.albums)
    }

    async fn playlists_page(
        &self,
        _cursor: Option<String>,
    ) -> Result<Page<PlaylistStub>, SyncError> {
        self.record("playlists");
        take_page(&self.playlists)
    }

    async fn playlist_tracks_page(
        &self,
        playlist_id: &str,
        _cursor: Option<String>,
    ) -> Result<Page<Option<Vec<TrackArtist>>>, SyncError> {
        self.record("playlist_tracks");
        self.tracks
            .lock()
            .unwrap()
            .get_mut(playlist_id)
            .and_then(|script| script.pop_front())
            .unwrap_or_else(|| {
                Ok(Page {
                    items: Vec::new(),
                    next: None,
                })
            })
    }
}

// ---------------------------------------------------------------------------
// In-memory document store
// ---------------------------------------------------------------------------

fn plain(value: &FieldValue) -> JsonValue {
    match value {
        FieldValue::Str(s) => JsonValue::from(s.clone()),
        FieldValue::OptStr(Some(s)) => JsonValue::from(s.clone()),
        FieldValue::OptStr(None) => JsonValue::Null,
        FieldValue::Int(n) => JsonValue::from(*n),
        FieldValue::Bool(b) => JsonValue::from(*b),
        FieldValue::Timestamp(t) => JsonValue::from(t.to_rfc3339()),
    }
}

/// A document store over a plain map, with the same merge-patch
/// contract as the PATCH + updateMask calls it stands in for: supplied
/// fields overwrite, omitted fields survive.
#[derive(Default)]
pub struct InMemoryStore {
    docs: Mutex<HashMap<String, BTreeMap<String, JsonValue>>>,
    failing_doc_ids: Mutex<HashSet<String>>,
}

impl InMemoryStore {
    /// Makes every upsert for this document id fail.
    pub fn fail_doc(&self, doc_id: &str) {
        self.failing_doc_ids
            .lock()
            .unwrap()
            .insert(doc_id.to_string());
    }

    pub fn document(&self, path: &str) -> Option<BTreeMap<String, JsonValue>> {
        self.docs.lock().unwrap().get(path).cloned()
    }

    pub fn children_of(&self, prefix: &str) -> Vec<String> {
        self.docs
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(&format!("{}/", prefix)))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    fn merge(&self, path: String, doc_id: &str, collection: &str, fields: Fields) -> Result<(), SyncError> {
        if self.failing_doc_ids.lock().unwrap().contains(doc_id) {
            return Err(SyncError::Write {
                collection: collection.to_string(),
                doc_id: doc_id.to_string(),
                reason: "scripted failure".to_string(),
            });
        }

        let mut docs = self.docs.lock().unwrap();
        let doc = docs.entry(path).or_default();
        for (name, value) in &fields {
            doc.insert(name.clone(), plain(value));
        }
        Ok(())
    }

    fn list_prefix(&self, prefix: &str, depth: usize) -> Vec<StoredDocument> {
        let docs = self.docs.lock().unwrap();
        let mut out: Vec<StoredDocument> = docs
            .iter()
            .filter(|(k, _)| {
                k.starts_with(&format!("{}/", prefix)) && k.matches('/').count() == depth
            })
            .map(|(k, fields)| StoredDocument {
                id: k.rsplit('/').next().unwrap_or_default().to_string(),
                fields: fields.clone(),
            })
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn upsert(
        &self,
        collection: &str,
        doc_id: &str,
        fields: Fields,
    ) -> Result<(), SyncError> {
        self.merge(format!("{}/{}", collection, doc_id), doc_id, collection, fields)
    }

    async fn upsert_child(
        &self,
        collection: &str,
        doc_id: &str,
        subcollection: &str,
        child_id: &str,
        fields: Fields,
    ) -> Result<(), SyncError> {
        self.merge(
            format!("{}/{}/{}/{}", collection, doc_id, subcollection, child_id),
            child_id,
            collection,
            fields,
        )
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, SyncError> {
        Ok(self.list_prefix(collection, 1))
    }

    async fn list_children(
        &self,
        collection: &str,
        doc_id: &str,
        subcollection: &str,
    ) -> Result<Vec<StoredDocument>, SyncError> {
        Ok(self.list_prefix(&format!("{}/{}/{}", collection, doc_id, subcollection), 3))
    }
}
