use thiserror::Error;

/// Everything that can go wrong during a sync run, by blast radius:
/// `Init` halts the whole run, `Fetch` stops one pagination loop,
/// `Write` skips one record, `MalformedItem` skips one item.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("initialization failed: {0}")]
    Init(String),

    #[error("page fetch failed: {0}")]
    Fetch(String),

    #[error("write failed for {collection}/{doc_id}: {reason}")]
    Write {
        collection: String,
        doc_id: String,
        reason: String,
    },

    #[error("malformed item: {0}")]
    MalformedItem(String),
}
