//! Error types shared by the CouchDB storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`CouchDaoError`] failures.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures that can occur while interacting with CouchDB.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// Required environment variable is missing.
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The configured base URL cannot be extended with path segments.
    #[error("invalid CouchDB base URL `{url}`")]
    InvalidBaseUrl { url: String },
    /// A request to a CouchDB endpoint could not be sent.
    #[error("failed to send CouchDB request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB returned an unexpected status code.
    #[error("unexpected CouchDB response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode CouchDB response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The game code reservation document already exists.
    #[error("game code `{game_code}` already reserved")]
    GameCodeTaken { game_code: String },
}

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        match err {
            CouchDaoError::GameCodeTaken { game_code } => StorageError::conflict(game_code),
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taken_game_code_maps_to_conflict() {
        let err: StorageError = CouchDaoError::GameCodeTaken {
            game_code: "ZZ99".into(),
        }
        .into();
        assert!(matches!(err, StorageError::Conflict { ref game_code } if game_code == "ZZ99"));
    }

    #[test]
    fn other_failures_map_to_unavailable() {
        let err: StorageError = CouchDaoError::RequestStatus {
            path: "bingo/games::1".into(),
            status: StatusCode::NOT_FOUND,
        }
        .into();
        assert!(matches!(err, StorageError::Unavailable { .. }));
        assert!(err.to_string().contains("404"));
    }
}
