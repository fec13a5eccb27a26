use mongodb::options::ClientOptions;
use tracing::info;

use super::error::{MongoDaoError, MongoResult};

const MONGO_URI_ENV: &str = "MONGO_URI";
const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";
const APP_NAME: &str = "bingo-back";

/// Client options for the MongoDB deployment holding the games.
///
/// Credentials travel inside the URI; per-request store keys are not used.
#[derive(Clone)]
pub struct MongoConfig {
    pub options: ClientOptions,
}

impl MongoConfig {
    /// Parse `uri`, tagging connections with the application name unless the URI sets one.
    pub async fn from_uri(uri: &str) -> MongoResult<Self> {
        let mut options =
            ClientOptions::parse(uri)
                .await
                .map_err(|source| MongoDaoError::InvalidUri {
                    uri: uri.to_owned(),
                    source,
                })?;
        options.app_name.get_or_insert_with(|| APP_NAME.to_owned());

        Ok(Self { options })
    }

    /// Read `MONGO_URI`, falling back to a local deployment.
    pub async fn from_env() -> MongoResult<Self> {
        let uri = match std::env::var(MONGO_URI_ENV) {
            Ok(uri) if !uri.trim().is_empty() => uri,
            _ => {
                info!(uri = DEFAULT_MONGO_URI, "MONGO_URI not set; using local MongoDB");
                DEFAULT_MONGO_URI.to_owned()
            }
        };
        Self::from_uri(&uri).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn app_name_defaults_but_uri_wins() {
        let config = MongoConfig::from_uri(DEFAULT_MONGO_URI).await.unwrap();
        assert_eq!(config.options.app_name.as_deref(), Some(APP_NAME));

        let config = MongoConfig::from_uri("mongodb://localhost:27017/?appName=other")
            .await
            .unwrap();
        assert_eq!(config.options.app_name.as_deref(), Some("other"));
    }

    #[tokio::test]
    async fn garbage_uri_is_rejected() {
        let err = MongoConfig::from_uri("not-a-uri").await.err().unwrap();
        assert!(matches!(err, MongoDaoError::InvalidUri { .. }));
    }
}
