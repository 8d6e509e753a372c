/// Failures reported by a [`KeyValueStore`](crate::storage::KeyValueStore) backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage is unavailable")]
    Unavailable,
    #[error("Storage quota exceeded while writing '{0}'")]
    QuotaExceeded(String),
}

#[derive(thiserror::Error, Debug)]
pub enum ReaderError {
    #[error("Speech synthesis is not supported by this host. Playback is disabled.")]
    EngineUnavailable,
    #[error("Malformed persisted state: {0}")]
    MalformedState(String),
    #[error("Invalid reader config: {0}")]
    Config(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
