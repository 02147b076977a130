use std::path::PathBuf;

use crate::error::SyncError;

/// Settings for one sync run, read once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_redirect_uri: String,
    /// Absent until the one-time `--authorize` / `--code` dance is done.
    pub spotify_refresh_token: Option<String>,
    /// Path to the Firebase service account key JSON.
    pub firebase_credentials: String,
}

impl SyncConfig {
    /// Loads `.env` (probing the working directory and the workspace
    /// root) and reads the Spotify and Firebase settings from the
    /// environment.
    pub fn from_env() -> Result<Self, SyncError> {
        let env_paths = [PathBuf::from(".env"), PathBuf::from("../../.env")];
        for p in &env_paths {
            if p.exists() {
                dotenvy::from_path(p).ok();
                break;
            }
        }

        Ok(Self {
            spotify_client_id: require("SPOTIFY_CLIENT_ID")?,
            spotify_client_secret: require("SPOTIFY_CLIENT_SECRET")?,
            spotify_redirect_uri: require("SPOTIFY_REDIRECT_URI")?,
            spotify_refresh_token: std::env::var("SPOTIFY_REFRESH_TOKEN")
                .ok()
                .filter(|s| !s.is_empty()),
            firebase_credentials: require("FIREBASE_CREDENTIALS")?,
        })
    }
}

fn require(name: &str) -> Result<String, SyncError> {
    std::env::var(name).map_err(|_| SyncError::Init(format!("{} not set in .env", name)))
}
