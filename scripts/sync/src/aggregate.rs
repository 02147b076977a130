use std::collections::HashMap;

use crate::models::{RankedArtist, TrackArtist};

pub const TOP_ARTISTS_LIMIT: usize = 8;

/// Ranks the artists credited across one playlist's tracks.
///
/// `None` entries are tracks whose track object could not be resolved
/// (removed or regionally unavailable); they contribute nothing and are
/// not an error. Counting is over exact `(id, name)` pairs, so the same
/// id under two spellings counts as two entities. Ties keep
/// first-encountered order.
pub fn rank_playlist_artists<I>(tracks: I) -> Vec<RankedArtist>
where
    I: IntoIterator<Item = Option<Vec<TrackArtist>>>,
{
    let mut counts: HashMap<(String, String), u32> = HashMap::new();
    let mut seen_order: Vec<(String, String)> = Vec::new();

    for credits in tracks.into_iter().flatten() {
        for artist in credits {
            let key = (artist.id, artist.name);
            match counts.get_mut(&key) {
                Some(n) => *n += 1,
                None => {
                    counts.insert(key.clone(), 1);
                    seen_order.push(key);
                }
            }
        }
    }

    let mut ranked: Vec<RankedArtist> = seen_order
        .into_iter()
        .map(|key| {
            let count = counts.remove(&key).unwrap_or(0);
            RankedArtist {
                spotify_id: key.0,
                name: key.1,
                count,
            }
        })
        .collect();

    // Stable sort: equal counts stay in first-seen order.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(TOP_ARTISTS_LIMIT);
    ranked
}
