//! Bingo Back binary entrypoint wiring the REST layer to the configured document store.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use bingo_back::{
    config::{AppConfig, StoreBackend},
    dao::{game_store::GameStore, storage::StorageError},
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let port = config.port();
    let backend = config.store();
    let app_state = AppState::new(config);

    spawn_storage_supervisor(app_state.clone(), backend);
    let app = routes::app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, ?backend, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Keep the selected store connected in the background; requests see degraded mode meanwhile.
fn spawn_storage_supervisor(state: SharedState, backend: StoreBackend) {
    match backend {
        #[cfg(feature = "couch-store")]
        StoreBackend::Couch => {
            tokio::spawn(storage_supervisor::run(state, connect_couch));
        }
        #[cfg(feature = "mongo-store")]
        StoreBackend::Mongo => {
            tokio::spawn(storage_supervisor::run(state, connect_mongo));
        }
        #[allow(unreachable_patterns)]
        other => {
            warn!(backend = ?other, "store backend not compiled in; staying in degraded mode");
        }
    }
}

#[cfg(feature = "couch-store")]
async fn connect_couch() -> Result<Arc<dyn GameStore>, StorageError> {
    use bingo_back::dao::game_store::couchdb::{CouchConfig, CouchGameStore};

    let config = CouchConfig::from_env()?;
    let store = CouchGameStore::connect(config).await?;
    Ok(Arc::new(store))
}

#[cfg(feature = "mongo-store")]
async fn connect_mongo() -> Result<Arc<dyn GameStore>, StorageError> {
    use bingo_back::dao::game_store::mongodb::{MongoConfig, MongoGameStore};

    let config = MongoConfig::from_env().await?;
    let store = MongoGameStore::connect(config).await?;
    Ok(Arc::new(store))
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
