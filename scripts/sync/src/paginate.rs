use std::future::Future;

use crate::error::SyncError;

/// One page of a paginated remote result set. `next` is the opaque
/// cursor for the following page (for Spotify that is the `next` URL
/// verbatim, for Firestore the `nextPageToken`).
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

/// The result of draining a cursor chain. When `error` is set the
/// chain stopped early and `items` holds whatever was accumulated
/// before the failure.
#[derive(Debug)]
pub struct PageRun<T> {
    pub items: Vec<T>,
    pub error: Option<SyncError>,
}

/// Follows a cursor chain until the remote reports no further page.
///
/// The first call is made with `None`, every subsequent call with the
/// cursor from the previous page. A failed page stops this chain only;
/// the caller gets the accumulated items plus the error and decides
/// what to log. No retries, no checkpointing - restarting means
/// starting over from the first page.
pub async fn follow_cursors<T, F, Fut>(mut fetch: F) -> PageRun<T>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, SyncError>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        match fetch(cursor.take()).await {
            Ok(page) => {
                items.extend(page.items);
                match page.next {
                    Some(next) => cursor = Some(next),
                    None => break,
                }
            }
            Err(e) => {
                return PageRun {
                    items,
                    error: Some(e),
                }
            }
        }
    }

    PageRun { items, error: None }
}
