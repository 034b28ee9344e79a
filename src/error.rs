use thiserror::Error;

/// Local persistence failures. Callers decide between retry and
/// surface-to-user; without a working store the app cannot run offline.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage failure: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Network-boundary failures. `Cancelled` is distinct from failure so a
/// caller can tell an abandoned request apart from an offline/failed one.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request cancelled")]
    Cancelled,
}

impl RemoteError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RemoteError::Cancelled)
    }
}
