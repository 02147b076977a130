use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::models::{Album, Artist, PlaylistStub, TrackArtist};
use crate::paginate::Page;

const API_BASE: &str = "https://api.spotify.com/v1";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
const SCOPES: &str = "user-library-read playlist-read-private user-follow-read";

const COLLECTION_PAGE_SIZE: u32 = 50;
const TRACK_PAGE_SIZE: u32 = 100;

// ---------------------------------------------------------------------------
// Catalog trait
// ---------------------------------------------------------------------------

/// The four paginated reads the orchestrator needs. The cursor is the
/// API's `next` URL verbatim; `None` asks for the first page.
#[async_trait]
pub trait MusicCatalog {
    async fn followed_artists_page(
        &self,
        cursor: Option<String>,
    ) -> Result<Page<Artist>, SyncError>;

    async fn saved_albums_page(&self, cursor: Option<String>) -> Result<Page<Album>, SyncError>;

    async fn playlists_page(&self, cursor: Option<String>)
        -> Result<Page<PlaylistStub>, SyncError>;

    /// Per-track credit lists; `None` items are tracks whose track
    /// object the API could not resolve (removed or region-locked).
    async fn playlist_tracks_page(
        &self,
        playlist_id: &str,
        cursor: Option<String>,
    ) -> Result<Page<Option<Vec<TrackArtist>>>, SyncError>;
}

// ---------------------------------------------------------------------------
// Web API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageObject {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    id: String,
    name: String,
    #[serde(default)]
    images: Vec<ImageObject>,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CursorPage<T> {
    items: Vec<T>,
    #[serde(default)]
    next: Option<String>,
}

/// `/me/following` nests the page one level down.
#[derive(Debug, Deserialize)]
struct FollowedArtistsEnvelope {
    artists: CursorPage<ArtistObject>,
}

#[derive(Debug, Deserialize)]
struct SavedAlbumItem {
    album: AlbumObject,
}

#[derive(Debug, Deserialize)]
struct AlbumObject {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistRef>,
    #[serde(default)]
    images: Vec<ImageObject>,
}

#[derive(Debug, Deserialize)]
struct PlaylistObject {
    id: String,
    name: String,
    // The API sends `null` here for playlists without a cover.
    #[serde(default)]
    images: Option<Vec<ImageObject>>,
}

#[derive(Debug, Deserialize)]
struct PlaylistTrackItem {
    track: Option<TrackObject>,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    #[serde(default)]
    artists: Vec<ArtistRef>,
}

// ---------------------------------------------------------------------------
// Boundary conversions into typed records
// ---------------------------------------------------------------------------

fn artist_from_object(obj: ArtistObject, now: DateTime<Utc>) -> Artist {
    Artist {
        spotify_id: obj.id,
        name: obj.name,
        cover_image_url: obj.images.into_iter().next().map(|i| i.url),
        created_at: now,
    }
}

/// Albums with an empty credit list are malformed and dropped.
fn album_from_item(item: SavedAlbumItem, now: DateTime<Utc>) -> Option<Album> {
    let AlbumObject {
        id,
        name,
        mut artists,
        images,
    } = item.album;

    if artists.is_empty() {
        return None;
    }
    let lead = artists.remove(0);

    Some(Album {
        spotify_id: id,
        name,
        artist: lead.name,
        artist_spotify_id: lead.id,
        cover_image_url: images.into_iter().next().map(|i| i.url),
        created_at: now,
    })
}

fn stub_from_object(obj: PlaylistObject) -> PlaylistStub {
    PlaylistStub {
        spotify_id: obj.id,
        name: obj.name,
        cover_image_url: obj
            .images
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|i| i.url),
    }
}

fn credits_from_item(item: PlaylistTrackItem) -> Option<Vec<TrackArtist>> {
    item.track.map(|t| {
        t.artists
            .into_iter()
            .map(|a| TrackArtist {
                id: a.id,
                name: a.name,
            })
            .collect()
    })
}

// ---------------------------------------------------------------------------
// Authorization-code flow helpers (one-time setup)
// ---------------------------------------------------------------------------

pub fn authorize_url(config: &SyncConfig) -> String {
    format!(
        "{}?client_id={}&response_type=code&redirect_uri={}&scope={}",
        AUTHORIZE_URL,
        urlencoding::encode(&config.spotify_client_id),
        urlencoding::encode(&config.spotify_redirect_uri),
        urlencoding::encode(SCOPES),
    )
}

/// Swaps an authorization code for the long-lived refresh token the
/// sync job runs on.
pub async fn exchange_code(
    http: &Client,
    config: &SyncConfig,
    code: &str,
) -> Result<String, SyncError> {
    let token = request_token(
        http,
        config,
        &[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &config.spotify_redirect_uri),
        ],
    )
    .await?;

    token
        .refresh_token
        .ok_or_else(|| SyncError::Init("token endpoint returned no refresh token".to_string()))
}

async fn request_token(
    http: &Client,
    config: &SyncConfig,
    params: &[(&str, &str)],
) -> Result<TokenResponse, SyncError> {
    let basic = base64::engine::general_purpose::STANDARD.encode(format!(
        "{}:{}",
        config.spotify_client_id, config.spotify_client_secret
    ));

    let resp = http
        .post(TOKEN_URL)
        .header("Authorization", format!("Basic {}", basic))
        .form(params)
        .send()
        .await
        .map_err(|e| SyncError::Init(format!("token request failed: {}", e)))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(SyncError::Init(format!(
            "token endpoint returned HTTP {}",
            status.as_u16()
        )));
    }

    resp.json()
        .await
        .map_err(|e| SyncError::Init(format!("token parse error: {}", e)))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct SpotifyClient {
    http: Client,
    access_token: String,
}

impl SpotifyClient {
    /// Exchanges the configured refresh token for an access token.
    /// Failing here means the run halts before anything is fetched.
    pub async fn connect(http: &Client, config: &SyncConfig) -> Result<Self, SyncError> {
        let refresh_token = config.spotify_refresh_token.as_deref().ok_or_else(|| {
            SyncError::Init(
                "SPOTIFY_REFRESH_TOKEN not set; run sfm-sync --authorize first".to_string(),
            )
        })?;

        let token = request_token(
            http,
            config,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
        )
        .await?;

        Ok(Self {
            http: http.clone(),
            access_token: token.access_token,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, SyncError> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| SyncError::Fetch(format!("Request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SyncError::Fetch(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| SyncError::Fetch(format!("Parse error: {}", e)))
    }
}

#[async_trait]
impl MusicCatalog for SpotifyClient {
    async fn followed_artists_page(
        &self,
        cursor: Option<String>,
    ) -> Result<Page<Artist>, SyncError> {
        let url = cursor.unwrap_or_else(|| {
            format!(
                "{}/me/following?type=artist&limit={}",
                API_BASE, COLLECTION_PAGE_SIZE
            )
        });
        let envelope: FollowedArtistsEnvelope = self.get_json(&url).await?;
        let now = Utc::now();

        Ok(Page {
            items: envelope
                .artists
                .items
                .into_iter()
                .map(|a| artist_from_object(a, now))
                .collect(),
            next: envelope.artists.next,
        })
    }

    async fn saved_albums_page(&self, cursor: Option<String>) -> Result<Page<Album>, SyncError> {
        let url =
            cursor.unwrap_or_else(|| format!("{}/me/albums?limit={}", API_BASE, COLLECTION_PAGE_SIZE));
        let page: CursorPage<SavedAlbumItem> = self.get_json(&url).await?;
        let now = Utc::now();

        Ok(Page {
            items: page
                .items
                .into_iter()
                .filter_map(|item| album_from_item(item, now))
                .collect(),
            next: page.next,
        })
    }

    async fn playlists_page(
        &self,
        cursor: Option<String>,
    ) -> Result<Page<PlaylistStub>, SyncError> {
        let url = cursor
            .unwrap_or_else(|| format!("{}/me/playlists?limit={}", API_BASE, COLLECTION_PAGE_SIZE));
        let page: CursorPage<PlaylistObject> = self.get_json(&url).await?;

        Ok(Page {
            items: page.items.into_iter().map(stub_from_object).collect(),
            next: page.next,
        })
    }

    async fn playlist_tracks_page(
        &self,
        playlist_id: &str,
        cursor: Option<String>,
    ) -> Result<Page<Option<Vec<TrackArtist>>>, SyncError> {
        let url = cursor.unwrap_or_else(|| {
            format!(
                "{}/playlists/{}/tracks?limit={}&fields={}",
                API_BASE,
                playlist_id,
                TRACK_PAGE_SIZE,
                urlencoding::encode("next,items(track(artists(id,name)))"),
            )
        });
        let page: CursorPage<PlaylistTrackItem> = self.get_json(&url).await?;

        Ok(Page {
            items: page.items.into_iter().map(credits_from_item).collect(),
            next: page.next,
        })
    }
}
