use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A unique constraint (game code) rejected the document.
    #[error("game code `{game_code}` is already in use")]
    Conflict { game_code: String },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a conflict error for a game code already taken.
    pub fn conflict(game_code: impl Into<String>) -> Self {
        StorageError::Conflict {
            game_code: game_code.into(),
        }
    }
}

/// Database and collection a game record is written to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageTarget {
    pub database_id: String,
    pub collection_id: String,
}

/// Opaque credential forwarded from the request headers to the store.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreCredential(String);

impl StoreCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for StoreCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StoreCredential(***)")
    }
}
