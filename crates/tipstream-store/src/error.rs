use thiserror::Error;

/// All storage-layer errors. Kept separate from the gateway's HTTP mapping
/// so callers decide the status code without coupling layers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The persisted payload column failed to deserialize — indicates a
    /// schema drift or a hand-edited row, never normal operation.
    #[error("Corrupt payload for record {id}: {source}")]
    CorruptPayload {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
