#[cfg(feature = "couch-store")]
pub mod couchdb;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{GameRecord, StoredGame};
use crate::dao::storage::{StorageResult, StorageTarget, StoreCredential};
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the document store receiving newly created games.
pub trait GameStore: Send + Sync {
    /// Persist `record` as a new document identified by `document_id`.
    ///
    /// Implementations must reject a record whose game code is already taken
    /// with [`StorageError::Conflict`](crate::dao::storage::StorageError::Conflict).
    fn create_document(
        &self,
        target: StorageTarget,
        document_id: Uuid,
        record: GameRecord,
        credential: Option<StoreCredential>,
    ) -> BoxFuture<'static, StorageResult<StoredGame>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
