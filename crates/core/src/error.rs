use crate::locks::Collection;

/// Errors surfaced by the record store.
///
/// Missing records are not errors: lookups return `Option`. Unreadable or malformed storage is
/// absorbed on load and never reaches callers. What remains here are the conditions a caller has
/// to act on.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{collection} already contains an entry with id {id}")]
    DuplicateKey { collection: Collection, id: u64 },
    #[error("{collection} has no ids left to assign")]
    IdSpaceExhausted { collection: Collection },
    #[error("failed to create data directory: {0}")]
    DataDirCreation(std::io::Error),
    #[error("failed to write {collection} collection: {source}")]
    Write {
        collection: Collection,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize collection: {0}")]
    Serialization(serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
