use chrono::{DateTime, Utc};

// Field names mirror the stored document schema: the Spotify id is the
// document key, everything else lives in the document body.

#[derive(Debug, Clone, PartialEq)]
pub struct Artist {
    pub spotify_id: String,
    pub name: String,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Only the first credited artist is retained (lossy by design).
#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    pub spotify_id: String,
    pub name: String,
    pub artist: String,
    pub artist_spotify_id: String,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A playlist page item before its tracks have been drained.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistStub {
    pub spotify_id: String,
    pub name: String,
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    pub spotify_id: String,
    pub name: String,
    pub cover_image_url: Option<String>,
    pub top_artists: Vec<RankedArtist>,
    pub created_at: DateTime<Utc>,
}

/// Denormalized snapshot of an artist's identity plus how often it was
/// credited within one playlist. Not a reference into the `artists`
/// collection; may go stale relative to it.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedArtist {
    pub spotify_id: String,
    pub name: String,
    pub count: u32,
}

/// Ephemeral `(id, name)` credit pair used during aggregation only.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackArtist {
    pub id: String,
    pub name: String,
}
