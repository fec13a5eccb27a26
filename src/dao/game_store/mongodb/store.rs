use std::{collections::HashSet, sync::Arc};

use futures::future::BoxFuture;
use mongodb::{Client, Collection, IndexModel, bson::doc, options::IndexOptions};
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::{establish_connection, ping},
    error::{MongoDaoError, MongoResult, is_duplicate_key},
    models::MongoGameDocument,
};
use crate::dao::{
    game_store::GameStore,
    models::{GameRecord, StoredGame},
    storage::{StorageResult, StorageTarget, StoreCredential},
};

const GAME_CODE_INDEX: &str = "game_code_unique";

#[derive(Clone)]
pub struct MongoGameStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    client: RwLock<Client>,
    config: MongoConfig,
    /// Targets whose game code index is known to exist.
    indexed: Mutex<HashSet<StorageTarget>>,
}

impl MongoInner {
    async fn client(&self) -> Client {
        self.client.read().await.clone()
    }

    async fn ping(&self) -> MongoResult<()> {
        let client = self.client().await;
        ping(&client)
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let client = establish_connection(&self.config.options).await?;
        let mut guard = self.client.write().await;
        *guard = client;
        Ok(())
    }
}

impl MongoGameStore {
    /// Establish a connection to MongoDB.
    ///
    /// Indexes are created lazily, the first time a target receives a game.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let client = establish_connection(&config.options).await?;

        let inner = Arc::new(MongoInner {
            client: RwLock::new(client),
            config,
            indexed: Mutex::new(HashSet::new()),
        });

        Ok(Self { inner })
    }

    async fn collection(&self, target: &StorageTarget) -> Collection<MongoGameDocument> {
        self.inner
            .client()
            .await
            .database(&target.database_id)
            .collection::<MongoGameDocument>(&target.collection_id)
    }

    async fn ensure_indexes(&self, target: &StorageTarget) -> MongoResult<()> {
        let mut indexed = self.inner.indexed.lock().await;
        if indexed.contains(target) {
            return Ok(());
        }

        let index = IndexModel::builder()
            .keys(doc! { "gameCode": 1 })
            .options(
                IndexOptions::builder()
                    .name(Some(GAME_CODE_INDEX.to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();

        self.collection(target)
            .await
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: target.collection_id.clone(),
                index: GAME_CODE_INDEX,
                source,
            })?;

        info!(
            database = %target.database_id,
            collection = %target.collection_id,
            "ensured unique game code index"
        );
        indexed.insert(target.clone());
        Ok(())
    }

    async fn create_document(
        &self,
        target: StorageTarget,
        id: Uuid,
        record: GameRecord,
    ) -> MongoResult<StoredGame> {
        self.ensure_indexes(&target).await?;

        let document = MongoGameDocument::new(id, record);
        self.collection(&target)
            .await
            .insert_one(&document)
            .await
            .map_err(|source| {
                if is_duplicate_key(&source) {
                    MongoDaoError::GameCodeTaken {
                        game_code: document.game_code().to_owned(),
                    }
                } else {
                    MongoDaoError::CreateGame { id, source }
                }
            })?;

        Ok(document.into())
    }
}

impl GameStore for MongoGameStore {
    // The connection URI carries the credentials; the request credential is not used.
    fn create_document(
        &self,
        target: StorageTarget,
        document_id: Uuid,
        record: GameRecord,
        _credential: Option<StoreCredential>,
    ) -> BoxFuture<'static, StorageResult<StoredGame>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .create_document(target, document_id, record)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
