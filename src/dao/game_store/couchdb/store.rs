use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::dao::{
    game_store::GameStore,
    models::{GameRecord, StoredGame},
    storage::{StorageResult, StorageTarget, StoreCredential},
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{CouchCodeReservation, CouchGameDocument, WriteResponse},
};

const UP_ENDPOINT: &str = "_up";

#[derive(Clone)]
pub struct CouchGameStore {
    client: Client,
    base_url: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchGameStore {
    /// Build the HTTP client and make sure the CouchDB server answers.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        let store = Self {
            client,
            base_url,
            auth,
        };

        store.ping().await?;
        Ok(store)
    }

    fn url(&self, segments: &[&str]) -> CouchResult<Url> {
        let invalid = || CouchDaoError::InvalidBaseUrl {
            url: self.base_url.to_string(),
        };
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// A request credential wins over the configured basic-auth pair.
    fn request(
        &self,
        method: Method,
        url: Url,
        credential: Option<&StoreCredential>,
    ) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match (credential, &self.auth) {
            (Some(credential), _) => builder.bearer_auth(credential.expose()),
            (None, Some((user, pass))) => builder.basic_auth(user.as_ref(), Some(pass.as_ref())),
            (None, None) => builder,
        }
    }

    async fn ping(&self) -> CouchResult<()> {
        let url = self.url(&[UP_ENDPOINT])?;
        let response = self
            .request(Method::GET, url, None)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: UP_ENDPOINT.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::RequestStatus {
                path: UP_ENDPOINT.to_string(),
                status: response.status(),
            })
        }
    }

    async fn put_document<T>(
        &self,
        database: &str,
        doc_id: &str,
        document: &T,
        credential: Option<&StoreCredential>,
    ) -> CouchResult<WriteResponse>
    where
        T: ?Sized + Serialize,
    {
        let path = format!("{database}/{doc_id}");
        let url = self.url(&[database, doc_id])?;
        let response = self
            .request(Method::PUT, url, credential)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: path.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path,
                status: response.status(),
            });
        }

        response
            .json::<WriteResponse>()
            .await
            .map_err(|source| CouchDaoError::DecodeResponse { path, source })
    }

    async fn delete_document(
        &self,
        database: &str,
        doc_id: &str,
        rev: &str,
        credential: Option<&StoreCredential>,
    ) -> CouchResult<()> {
        let path = format!("{database}/{doc_id}");
        let url = self.url(&[database, doc_id])?;
        let response = self
            .request(Method::DELETE, url, credential)
            .query(&[("rev", rev)])
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: path.clone(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::RequestStatus {
                path,
                status: response.status(),
            })
        }
    }

    /// Claim the game code; CouchDB answers 409 when the marker already exists.
    async fn reserve_code(
        &self,
        database: &str,
        reservation: &CouchCodeReservation,
        game_code: &str,
        credential: Option<&StoreCredential>,
    ) -> CouchResult<WriteResponse> {
        match self
            .put_document(database, &reservation.id, reservation, credential)
            .await
        {
            Err(CouchDaoError::RequestStatus {
                status: StatusCode::CONFLICT,
                ..
            }) => Err(CouchDaoError::GameCodeTaken {
                game_code: game_code.to_string(),
            }),
            other => other,
        }
    }

    async fn create_document(
        &self,
        target: StorageTarget,
        id: Uuid,
        record: GameRecord,
        credential: Option<StoreCredential>,
    ) -> CouchResult<StoredGame> {
        let database = target.database_id.as_str();
        let collection = target.collection_id.as_str();
        let credential = credential.as_ref();

        let reservation = CouchCodeReservation::new(collection, &record.game_code, id);
        let reserved = self
            .reserve_code(database, &reservation, &record.game_code, credential)
            .await?;

        let document = CouchGameDocument::new(collection, id, record);
        if let Err(err) = self
            .put_document(database, &document.id, &document, credential)
            .await
        {
            if let Err(release_err) = self
                .delete_document(database, &reservation.id, &reserved.rev, credential)
                .await
            {
                warn!(
                    error = %release_err,
                    game_code = %document.game.game_code,
                    "failed to release game code reservation"
                );
            }
            return Err(err);
        }

        Ok(document.into_stored(id))
    }
}

impl GameStore for CouchGameStore {
    fn create_document(
        &self,
        target: StorageTarget,
        document_id: Uuid,
        record: GameRecord,
        credential: Option<StoreCredential>,
    ) -> BoxFuture<'static, StorageResult<StoredGame>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .create_document(target, document_id, record, credential)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(base_url: &str) -> CouchGameStore {
        CouchGameStore {
            client: Client::new(),
            base_url: Arc::from(base_url),
            auth: None,
        }
    }

    #[test]
    fn url_encodes_document_segments() {
        let url = store("http://localhost:5984")
            .url(&["bingo", "games::code::A/B1"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5984/bingo/games::code::A%2FB1"
        );
    }

    #[test]
    fn url_keeps_base_path_prefix() {
        let url = store("http://localhost:5984/couch")
            .url(&["bingo", "doc"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:5984/couch/bingo/doc");
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let err = store("not a url").url(&["bingo"]).unwrap_err();
        assert!(matches!(err, CouchDaoError::InvalidBaseUrl { .. }));
    }
}
