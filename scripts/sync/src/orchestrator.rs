use chrono::Utc;
use colored::*;

use crate::aggregate::rank_playlist_artists;
use crate::firestore::{field, DocumentStore, FieldValue, Fields};
use crate::models::{Album, Artist, Playlist};
use crate::paginate::follow_cursors;
use crate::spotify::MusicCatalog;

pub const ARTISTS_COLLECTION: &str = "artists";
pub const ALBUMS_COLLECTION: &str = "albums";
pub const PLAYLISTS_COLLECTION: &str = "playlists";
pub const PLAYLIST_ARTISTS_SUBCOLLECTION: &str = "playlist_artists";

#[derive(Debug, Default, PartialEq)]
pub struct SyncSummary {
    pub artists_fetched: usize,
    pub albums_fetched: usize,
    pub playlists_fetched: usize,
    pub artists_written: usize,
    pub albums_written: usize,
    pub playlists_written: usize,
    pub write_failures: usize,
}

/// Runs the full fetch → aggregate → write sequence. Both clients are
/// handed in already authenticated; if building either of them failed
/// this is never entered. Empty fetch results are valid and do not
/// short-circuit the later states.
pub async fn run_sync(
    catalog: &impl MusicCatalog,
    store: &impl DocumentStore,
    dry_run: bool,
) -> SyncSummary {
    let mut summary = SyncSummary::default();

    println!("{} Fetching followed artists...", "→".bright_black());
    let artists = fetch_artists(catalog).await;
    println!("  {} Retrieved {} artists", "✓".green(), artists.len());
    summary.artists_fetched = artists.len();

    println!("{} Fetching saved albums...", "→".bright_black());
    let albums = fetch_albums(catalog).await;
    println!("  {} Retrieved {} albums", "✓".green(), albums.len());
    summary.albums_fetched = albums.len();

    println!("{} Fetching playlists...", "→".bright_black());
    let playlists = fetch_playlists(catalog).await;
    println!("  {} Retrieved {} playlists", "✓".green(), playlists.len());
    summary.playlists_fetched = playlists.len();

    if dry_run {
        println!("{} Dry run - skipping all writes", "⚠".yellow());
        return summary;
    }

    println!("{} Writing artists...", "→".bright_black());
    summary.artists_written = write_artists(store, &artists, &mut summary.write_failures).await;

    println!("{} Writing albums...", "→".bright_black());
    summary.albums_written = write_albums(store, &albums, &mut summary.write_failures).await;

    println!("{} Writing playlists...", "→".bright_black());
    summary.playlists_written =
        write_playlists(store, &playlists, &mut summary.write_failures).await;

    summary
}

// ---------------------------------------------------------------------------
// Fetch states
// ---------------------------------------------------------------------------

async fn fetch_artists(catalog: &impl MusicCatalog) -> Vec<Artist> {
    let run = follow_cursors(|cursor| catalog.followed_artists_page(cursor)).await;
    if let Some(e) = run.error {
        eprintln!("  {} {}", "✗".red(), e.to_string().yellow());
    }
    run.items
}

async fn fetch_albums(catalog: &impl MusicCatalog) -> Vec<Album> {
    let run = follow_cursors(|cursor| catalog.saved_albums_page(cursor)).await;
    if let Some(e) = run.error {
        eprintln!("  {} {}", "✗".red(), e.to_string().yellow());
    }
    run.items
}

/// Drains the playlist pages, then each playlist's tracks, aggregating
/// the top credited artists inline. A track-page failure stops that
/// playlist's chain only; whatever was accumulated still counts and the
/// playlist is still mirrored.
async fn fetch_playlists(catalog: &impl MusicCatalog) -> Vec<Playlist> {
    let run = follow_cursors(|cursor| catalog.playlists_page(cursor)).await;
    if let Some(e) = run.error {
        eprintln!("  {} {}", "✗".red(), e.to_string().yellow());
    }

    let mut playlists = Vec::new();
    for stub in run.items {
        let tracks =
            follow_cursors(|cursor| catalog.playlist_tracks_page(&stub.spotify_id, cursor)).await;
        if let Some(e) = tracks.error {
            eprintln!(
                "  {} tracks for playlist {}: {}",
                "✗".red(),
                stub.name.bright_white(),
                e.to_string().yellow()
            );
        }

        let top_artists = rank_playlist_artists(tracks.items);
        playlists.push(Playlist {
            spotify_id: stub.spotify_id,
            name: stub.name,
            cover_image_url: stub.cover_image_url,
            top_artists,
            created_at: Utc::now(),
        });
    }
    playlists
}

// ---------------------------------------------------------------------------
// Write states
// ---------------------------------------------------------------------------

fn artist_fields(artist: &Artist) -> Fields {
    vec![
        field("name", FieldValue::Str(artist.name.clone())),
        field(
            "cover_image_url",
            FieldValue::OptStr(artist.cover_image_url.clone()),
        ),
        field("created_at", FieldValue::Timestamp(artist.created_at)),
    ]
}

fn album_fields(album: &Album) -> Fields {
    vec![
        field("name", FieldValue::Str(album.name.clone())),
        field("artist", FieldValue::Str(album.artist.clone())),
        field(
            "artist_spotify_id",
            FieldValue::Str(album.artist_spotify_id.clone()),
        ),
        field(
            "cover_image_url",
            FieldValue::OptStr(album.cover_image_url.clone()),
        ),
        field("created_at", FieldValue::Timestamp(album.created_at)),
    ]
}

fn playlist_fields(playlist: &Playlist) -> Fields {
    vec![
        field("name", FieldValue::Str(playlist.name.clone())),
        field(
            "cover_image_url",
            FieldValue::OptStr(playlist.cover_image_url.clone()),
        ),
        field("created_at", FieldValue::Timestamp(playlist.created_at)),
    ]
}

async fn write_artists(
    store: &impl DocumentStore,
    artists: &[Artist],
    failures: &mut usize,
) -> usize {
    let mut written = 0;
    for artist in artists {
        match store
            .upsert(ARTISTS_COLLECTION, &artist.spotify_id, artist_fields(artist))
            .await
        {
            Ok(()) => written += 1,
            Err(e) => {
                *failures += 1;
                eprintln!("  {} {}", "✗".red(), e.to_string().yellow());
            }
        }
    }
    println!("  {} Saved {} artists", "✓".green(), written);
    written
}

async fn write_albums(store: &impl DocumentStore, albums: &[Album], failures: &mut usize) -> usize {
    let mut written = 0;
    for album in albums {
        match store
            .upsert(ALBUMS_COLLECTION, &album.spotify_id, album_fields(album))
            .await
        {
            Ok(()) => written += 1,
            Err(e) => {
                *failures += 1;
                eprintln!("  {} {}", "✗".red(), e.to_string().yellow());
            }
        }
    }
    println!("  {} Saved {} albums", "✓".green(), written);
    written
}

/// Upserts each playlist document, then its ranked artists as child
/// documents keyed by artist id. A failed playlist document skips its
/// children; a failed child skips that child only.
async fn write_playlists(
    store: &impl DocumentStore,
    playlists: &[Playlist],
    failures: &mut usize,
) -> usize {
    let mut written = 0;
    for playlist in playlists {
        match store
            .upsert(
                PLAYLISTS_COLLECTION,
                &playlist.spotify_id,
                playlist_fields(playlist),
            )
            .await
        {
            Ok(()) => written += 1,
            Err(e) => {
                *failures += 1;
                eprintln!("  {} {}", "✗".red(), e.to_string().yellow());
                continue;
            }
        }

        for ranked in &playlist.top_artists {
            let fields = vec![
                field("name", FieldValue::Str(ranked.name.clone())),
                field("count", FieldValue::Int(ranked.count as i64)),
            ];
            if let Err(e) = store
                .upsert_child(
                    PLAYLISTS_COLLECTION,
                    &playlist.spotify_id,
                    PLAYLIST_ARTISTS_SUBCOLLECTION,
                    &ranked.spotify_id,
                    fields,
                )
                .await
            {
                *failures += 1;
                eprintln!("  {} {}", "✗".red(), e.to_string().yellow());
            }
        }
    }
    println!("  {} Saved {} playlists", "✓".green(), written);
    written
}

// ---------------------------------------------------------------------------
// Verification pass
// ---------------------------------------------------------------------------

/// Dumps every mirrored collection, then each playlist's ranked
/// artists. Read-only; errors are printed and skipped.
pub async fn show_store_contents(store: &impl DocumentStore) {
    for collection in [ARTISTS_COLLECTION, ALBUMS_COLLECTION, PLAYLISTS_COLLECTION] {
        println!();
        println!("{} {}", "Contents of".white().bold(), collection.bright_cyan());
        match store.list(collection).await {
            Ok(docs) => {
                for doc in docs {
                    println!(
                        "  {} => {}",
                        doc.id.bright_white(),
                        serde_json::to_string(&doc.fields).unwrap_or_default()
                    );
                }
            }
            Err(e) => eprintln!("  {} {}", "✗".red(), e.to_string().yellow()),
        }
    }

    println!();
    println!(
        "{} {}",
        "Contents of".white().bold(),
        PLAYLIST_ARTISTS_SUBCOLLECTION.bright_cyan()
    );
    match store.list(PLAYLISTS_COLLECTION).await {
        Ok(playlists) => {
            for playlist in playlists {
                println!(
                    "  Playlist {} ({})",
                    playlist.id.bright_white(),
                    playlist
                        .fields
                        .get("name")
                        .and_then(|v| v.as_str())
                        .unwrap_or("?")
                );
                match store
                    .list_children(
                        PLAYLISTS_COLLECTION,
                        &playlist.id,
                        PLAYLIST_ARTISTS_SUBCOLLECTION,
                    )
                    .await
                {
                    Ok(children) => {
                        for child in children {
                            println!(
                                "    {} => {}",
                                child.id.bright_black(),
                                serde_json::to_string(&child.fields).unwrap_or_default()
                            );
                        }
                    }
                    Err(e) => eprintln!("    {} {}", "✗".red(), e.to_string().yellow()),
                }
            }
        }
        Err(e) => eprintln!("  {} {}", "✗".red(), e.to_string().yellow()),
    }
}
